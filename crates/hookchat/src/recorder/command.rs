use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;

use super::wav::PcmFormat;
use super::{Capture, Microphone, PERMISSION_DENIED};
use crate::config::RecorderSettings;
use crate::errors::{ChatError, ChatResult};

const CHUNK_SIZE: usize = 4096;
// A recorder that cannot reach the device exits almost immediately.
const STARTUP_GRACE: Duration = Duration::from_millis(150);

/// Microphone backed by an external capture program writing raw PCM to stdout
pub struct CommandMicrophone {
    command: String,
    args: Vec<String>,
    format: PcmFormat,
}

impl CommandMicrophone {
    pub fn new<S: Into<String>>(command: S, args: Vec<String>, format: PcmFormat) -> Self {
        Self {
            command: command.into(),
            args,
            format,
        }
    }

    pub fn from_settings(settings: &RecorderSettings) -> Self {
        let format = PcmFormat {
            sample_rate: settings.sample_rate,
            channels: settings.channels,
        };
        Self::new(settings.command.clone(), settings.args.clone(), format)
    }

    pub fn format(&self) -> PcmFormat {
        self.format
    }

    /// Arguments passed to the capture program
    pub fn capture_args(&self) -> Vec<String> {
        if !self.args.is_empty() {
            return self.args.clone();
        }
        vec![
            "-q".to_string(),
            "-t".to_string(),
            "raw".to_string(),
            "-f".to_string(),
            "S16_LE".to_string(),
            "-r".to_string(),
            self.format.sample_rate.to_string(),
            "-c".to_string(),
            self.format.channels.to_string(),
        ]
    }
}

fn denied() -> ChatError {
    ChatError::Permission(PERMISSION_DENIED.to_string())
}

#[async_trait]
impl Microphone for CommandMicrophone {
    async fn open(&self) -> ChatResult<Box<dyn Capture>> {
        let mut child = Command::new(&self.command)
            .args(self.capture_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                tracing::warn!("Failed to start {}: {}", self.command, e);
                denied()
            })?;

        let stdout = child.stdout.take().ok_or_else(denied)?;

        if let Ok(status) = tokio::time::timeout(STARTUP_GRACE, child.wait()).await {
            tracing::warn!("{} exited during startup: {:?}", self.command, status);
            return Err(denied());
        }

        Ok(Box::new(CommandCapture {
            child,
            reader: Some(tokio::spawn(buffer_chunks(stdout))),
        }))
    }
}

async fn buffer_chunks(mut stdout: ChildStdout) -> Vec<Vec<u8>> {
    let mut chunks = Vec::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        match stdout.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => chunks.push(buf[..n].to_vec()),
            Err(e) => {
                tracing::warn!("Stopped reading audio: {}", e);
                break;
            }
        }
    }
    chunks
}

/// A running capture process; the child is killed when this is dropped
struct CommandCapture {
    child: Child,
    reader: Option<JoinHandle<Vec<Vec<u8>>>>,
}

#[async_trait]
impl Capture for CommandCapture {
    async fn finish(&mut self) -> ChatResult<Vec<Vec<u8>>> {
        if let Err(e) = self.child.start_kill() {
            tracing::debug!("Capture process already gone: {}", e);
        }
        self.child.wait().await?;

        match self.reader.take() {
            Some(reader) => reader
                .await
                .map_err(|e| ChatError::Io(format!("audio reader failed: {}", e))),
            None => Ok(Vec::new()),
        }
    }
}

impl Drop for CommandCapture {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}
