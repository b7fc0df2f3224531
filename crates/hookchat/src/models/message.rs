use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::attachment::Attachment;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// How the content of a message should be interpreted
pub enum ContentType {
    Text,
    Image,
    Audio,
    File,
}

impl ContentType {
    /// Infer a content type from a declared media type
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            ContentType::Image
        } else if mime_type.starts_with("audio/") {
            ContentType::Audio
        } else {
            ContentType::File
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(ContentType::Text),
            "image" => Some(ContentType::Image),
            "audio" => Some(ContentType::Audio),
            "file" => Some(ContentType::File),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A single entry of the conversation, either typed by the user or received from the webhook
///
/// `content` is literal text for [`ContentType::Text`] and a resource locator for every
/// other content type.
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub content_type: ContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: String, content_type: ContentType) -> Self {
        let timestamp = Utc::now();
        Message {
            id: next_id(&timestamp),
            role,
            content,
            content_type,
            file_name: None,
            timestamp,
        }
    }

    /// A user message carrying plain text
    pub fn user_text<S: Into<String>>(text: S) -> Self {
        Message::new(Role::User, text.into(), ContentType::Text)
    }

    /// A user message pointing at a locally stored copy of an attachment
    pub fn user_attachment<S: Into<String>>(attachment: &Attachment, location: S) -> Self {
        Message::new(Role::User, location.into(), attachment.content_type())
            .with_file_name(attachment.name.clone())
    }

    pub fn bot<S: Into<String>>(content_type: ContentType, content: S) -> Self {
        Message::new(Role::Bot, content.into(), content_type)
    }

    /// A bot text message reporting a failed exchange
    pub fn bot_error<S: AsRef<str>>(text: S) -> Self {
        Message::bot(ContentType::Text, format!("Error: {}", text.as_ref()))
    }

    pub fn with_file_name<S: Into<String>>(mut self, file_name: S) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

// Millisecond timestamps collide easily when a user and an error message are
// created back to back, so a process wide sequence number is appended.
fn next_id(timestamp: &DateTime<Utc>) -> String {
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", timestamp.timestamp_millis(), sequence)
}
