use std::fs;
use std::path::Path;

use crate::config::LimitSettings;
use crate::errors::{ChatError, ChatResult};
use crate::models::attachment::Attachment;
use crate::recorder::Recorder;

/// Media types a user may attach
pub const ALLOWED_MIME_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/png",
    "application/pdf",
    "audio/wav",
    "audio/mp3",
    "audio/mpeg",
];

/// Filter offered to file pickers
pub const ACCEPTED_EXTENSIONS: &str = ".jpg,.jpeg,.png,.pdf,.mp3,.wav";

pub const FILE_TOO_LARGE: &str = "File size must be less than 5MB";
pub const FILE_TYPE_NOT_ALLOWED: &str = "Only JPG, PNG, PDF, and audio files are allowed";

/// A message ready to be handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub text: String,
    pub attachment: Option<Attachment>,
}

/// Draft state for the next outgoing message
pub struct Composer {
    draft: String,
    attachment: Option<Attachment>,
    recorder: Recorder,
    limits: LimitSettings,
}

impl Composer {
    pub fn new(recorder: Recorder, limits: LimitSettings) -> Self {
        Composer {
            draft: String::new(),
            attachment: None,
            recorder,
            limits,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft<S: Into<String>>(&mut self, text: S) {
        self.draft = text.into();
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn clear_attachment(&mut self) {
        self.attachment = None;
    }

    fn check_size(&self, size: u64) -> ChatResult<()> {
        if size > self.limits.max_attachment_bytes {
            return Err(ChatError::Validation(FILE_TOO_LARGE.to_string()));
        }
        Ok(())
    }

    /// Validate and attach a file, replacing any previous attachment
    ///
    /// A rejected file leaves the draft and the current attachment untouched.
    pub fn attach(&mut self, attachment: Attachment) -> ChatResult<()> {
        self.check_size(attachment.size())?;
        if !ALLOWED_MIME_TYPES.contains(&attachment.mime_type.as_str()) {
            tracing::warn!(
                "Rejected attachment {} of type {}",
                attachment.name,
                attachment.mime_type
            );
            return Err(ChatError::Validation(FILE_TYPE_NOT_ALLOWED.to_string()));
        }

        self.attachment = Some(attachment);
        Ok(())
    }

    /// Attach a file from disk
    ///
    /// Oversized files are rejected from their metadata without being read.
    pub fn select_file(&mut self, path: &Path) -> ChatResult<()> {
        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(ChatError::Validation(format!(
                "{} is not a file",
                path.display()
            )));
        }
        self.check_size(metadata.len())?;

        let attachment = Attachment::from_path(path)?;
        self.attach(attachment)
    }

    /// Take the draft if there is something to send
    ///
    /// Returns `None` and changes nothing when the trimmed text is empty and nothing is
    /// attached. Otherwise both fields are cleared.
    pub fn submit(&mut self) -> Option<Submission> {
        let text = self.draft.trim();
        if text.is_empty() && self.attachment.is_none() {
            return None;
        }

        let submission = Submission {
            text: text.to_string(),
            attachment: self.attachment.take(),
        };
        self.draft.clear();
        Some(submission)
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub async fn start_recording(&mut self) -> ChatResult<()> {
        self.recorder.start().await
    }

    /// Finish the recording and attach the clip in place of any previous attachment
    pub async fn stop_recording(&mut self) -> ChatResult<()> {
        let clip = self.recorder.stop().await?;
        self.attachment = Some(clip);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::mock::MockMicrophone;
    use crate::recorder::wav::PcmFormat;
    use std::sync::Arc;
    use tempfile::TempDir;

    const MIB: usize = 1024 * 1024;

    fn composer() -> Composer {
        composer_with(MockMicrophone::new(vec![vec![1, 0]]))
    }

    fn composer_with(microphone: MockMicrophone) -> Composer {
        let format = PcmFormat {
            sample_rate: 16000,
            channels: 1,
        };
        Composer::new(
            Recorder::new(Arc::new(microphone), format),
            LimitSettings::default(),
        )
    }

    fn png(size: usize) -> Attachment {
        Attachment::new("photo.png", "image/png", vec![0; size])
    }

    #[test]
    fn test_submit_requires_content() {
        let mut composer = composer();
        assert_eq!(composer.submit(), None);

        composer.set_draft("   \n\t");
        assert_eq!(composer.submit(), None);
        assert_eq!(composer.draft(), "   \n\t");
    }

    #[test]
    fn test_submit_trims_and_clears() {
        let mut composer = composer();
        composer.set_draft("  Hello \n");

        let submission = composer.submit().unwrap();
        assert_eq!(submission.text, "Hello");
        assert!(submission.attachment.is_none());
        assert_eq!(composer.draft(), "");
    }

    #[test]
    fn test_submit_attachment_without_text() {
        let mut composer = composer();
        composer.attach(png(10)).unwrap();

        let submission = composer.submit().unwrap();
        assert_eq!(submission.text, "");
        assert_eq!(submission.attachment, Some(png(10)));
        assert!(composer.attachment().is_none());
    }

    #[test]
    fn test_rejects_oversized_file() {
        let mut composer = composer();
        composer.set_draft("look at this");

        let result = composer.attach(png(10 * 1000 * 1000));
        assert_eq!(
            result,
            Err(ChatError::Validation(FILE_TOO_LARGE.to_string()))
        );
        assert!(composer.attachment().is_none());
        assert_eq!(composer.draft(), "look at this");
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let mut composer = composer();
        assert!(composer.attach(png(5 * MIB)).is_ok());
        assert!(composer.attach(png(5 * MIB + 1)).is_err());
    }

    #[test]
    fn test_rejects_disallowed_type() {
        let mut composer = composer();
        let result = composer.attach(Attachment::new("notes.txt", "text/plain", vec![1]));
        assert_eq!(
            result,
            Err(ChatError::Validation(FILE_TYPE_NOT_ALLOWED.to_string()))
        );
        assert!(composer.attachment().is_none());
    }

    #[test]
    fn test_allowed_types() {
        let mut composer = composer();
        for mime in ALLOWED_MIME_TYPES {
            assert!(composer.attach(Attachment::new("f", mime, vec![1])).is_ok());
        }
    }

    #[test]
    fn test_rejection_keeps_previous_attachment() {
        let mut composer = composer();
        composer.attach(png(1)).unwrap();

        assert!(composer
            .attach(Attachment::new("movie.mp4", "video/mp4", vec![1]))
            .is_err());
        assert_eq!(composer.attachment(), Some(&png(1)));
    }

    #[test]
    fn test_new_selection_replaces_previous() {
        let mut composer = composer();
        composer.attach(png(1)).unwrap();
        let pdf = Attachment::new("scan.pdf", "application/pdf", vec![2]);
        composer.attach(pdf.clone()).unwrap();
        assert_eq!(composer.attachment(), Some(&pdf));
    }

    #[test]
    fn test_select_file_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("song.mp3");
        let bad = temp_dir.path().join("script.sh");
        std::fs::write(&good, [0xffu8, 0xfb]).unwrap();
        std::fs::write(&bad, "echo hi").unwrap();

        let mut composer = composer();
        composer.select_file(&good).unwrap();
        assert_eq!(composer.attachment().map(|a| a.mime_type.as_str()), Some("audio/mpeg"));

        assert!(matches!(
            composer.select_file(&bad),
            Err(ChatError::Validation(_))
        ));
        assert!(composer.select_file(temp_dir.path()).is_err());
        assert_eq!(composer.attachment().map(|a| a.name.as_str()), Some("song.mp3"));
    }

    #[tokio::test]
    async fn test_recording_replaces_attachment() {
        let mut composer = composer();
        composer.attach(png(1)).unwrap();

        composer.start_recording().await.unwrap();
        assert!(composer.is_recording());
        composer.stop_recording().await.unwrap();
        assert!(!composer.is_recording());

        let attachment = composer.attachment().unwrap();
        assert_eq!(attachment.name, "recording.wav");
        assert_eq!(attachment.mime_type, "audio/wav");
    }

    #[tokio::test]
    async fn test_denied_recording_changes_nothing() {
        let mut composer = composer_with(MockMicrophone::denied());
        composer.set_draft("draft");

        assert!(matches!(
            composer.start_recording().await,
            Err(ChatError::Permission(_))
        ));
        assert!(!composer.is_recording());
        assert!(composer.attachment().is_none());
        assert_eq!(composer.draft(), "draft");
    }
}
