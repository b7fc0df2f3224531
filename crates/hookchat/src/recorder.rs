//! Voice clip capture.
//!
//! A [`Recorder`] moves between [`RecorderState::Idle`] and [`RecorderState::Recording`].
//! While recording it exclusively owns a [`Capture`], the open microphone. Captures
//! release their device when finished and again when dropped, so an error on any path
//! leaves the microphone free.
pub mod command;
pub mod mock;
pub mod wav;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::RecorderSettings;
use crate::errors::{ChatError, ChatResult};
use crate::models::attachment::Attachment;
use wav::PcmFormat;

pub const PERMISSION_DENIED: &str = "Could not access microphone. Please check permissions.";
pub const RECORDING_NAME: &str = "recording.wav";
pub const RECORDING_MIME: &str = "audio/wav";

/// Source of audio captures
#[async_trait]
pub trait Microphone: Send + Sync {
    /// Acquire the device and start buffering audio
    ///
    /// Fails with [`ChatError::Permission`] when the device cannot be opened.
    async fn open(&self) -> ChatResult<Box<dyn Capture>>;
}

/// An open microphone buffering PCM chunks
#[async_trait]
pub trait Capture: Send {
    /// Stop capturing, release the device and hand back every buffered chunk
    async fn finish(&mut self) -> ChatResult<Vec<Vec<u8>>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
}

pub struct Recorder {
    microphone: Arc<dyn Microphone>,
    format: PcmFormat,
    capture: Option<Box<dyn Capture>>,
}

impl Recorder {
    pub fn new(microphone: Arc<dyn Microphone>, format: PcmFormat) -> Self {
        Recorder {
            microphone,
            format,
            capture: None,
        }
    }

    /// Recorder backed by the capture command from the settings
    pub fn from_settings(settings: &RecorderSettings) -> Self {
        let microphone = command::CommandMicrophone::from_settings(settings);
        let format = microphone.format();
        Recorder::new(Arc::new(microphone), format)
    }

    pub fn state(&self) -> RecorderState {
        if self.capture.is_some() {
            RecorderState::Recording
        } else {
            RecorderState::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        self.state() == RecorderState::Recording
    }

    pub async fn start(&mut self) -> ChatResult<()> {
        if self.is_recording() {
            return Err(ChatError::InvalidState(
                "a recording is already in progress".to_string(),
            ));
        }

        let capture = self.microphone.open().await?;
        tracing::debug!("Recording started");
        self.capture = Some(capture);
        Ok(())
    }

    /// Finish the active recording and package it as a WAV attachment
    pub async fn stop(&mut self) -> ChatResult<Attachment> {
        let mut capture = self
            .capture
            .take()
            .ok_or_else(|| ChatError::InvalidState("no recording in progress".to_string()))?;

        let chunks = capture.finish().await;
        drop(capture);
        let chunks = chunks?;

        let pcm = chunks.concat();
        tracing::debug!("Recording stopped after {} chunks, {} bytes", chunks.len(), pcm.len());

        Ok(Attachment::new(
            RECORDING_NAME,
            RECORDING_MIME,
            wav::encode(&pcm, self.format),
        ))
    }
}
