use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::{ContentType, Message};
use crate::errors::{ChatError, ChatResult};

pub const INVALID_FORMAT: &str = "Invalid response format";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// The `{type, content}` envelope describing a bot reply
pub struct RemoteReply {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub content: String,
}

impl RemoteReply {
    pub fn new<S: Into<String>>(content_type: ContentType, content: S) -> Self {
        RemoteReply {
            content_type,
            content: content.into(),
        }
    }

    /// Wrap a body that was not JSON into a text envelope
    pub fn text<S: Into<String>>(raw: S) -> Self {
        RemoteReply::new(ContentType::Text, raw)
    }

    /// Accept a decoded JSON value as an envelope
    ///
    /// Both `type` and `content` must be non-empty strings and `type` must name one of the
    /// known content types.
    pub fn from_value(value: &Value) -> ChatResult<Self> {
        let content_type = value
            .get("type")
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty())
            .and_then(ContentType::parse);

        let content = value
            .get("content")
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty());

        match (content_type, content) {
            (Some(content_type), Some(content)) => Ok(RemoteReply::new(content_type, content)),
            _ => Err(ChatError::Format(INVALID_FORMAT.to_string())),
        }
    }

    /// Validate an envelope that did not come from JSON
    pub fn validate(self) -> ChatResult<Self> {
        if self.content.is_empty() {
            return Err(ChatError::Format(INVALID_FORMAT.to_string()));
        }
        Ok(self)
    }

    pub fn into_message(self) -> Message {
        Message::bot(self.content_type, self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::Role;
    use serde_json::json;

    #[test]
    fn test_from_value() -> ChatResult<()> {
        let reply = RemoteReply::from_value(&json!({
            "type": "image",
            "content": "https://example.com/cat.png"
        }))?;
        assert_eq!(reply.content_type, ContentType::Image);
        assert_eq!(reply.content, "https://example.com/cat.png");
        Ok(())
    }

    #[test]
    fn test_extra_fields_are_ignored() -> ChatResult<()> {
        let reply = RemoteReply::from_value(&json!({
            "type": "text",
            "content": "Hi there",
            "sessionId": 42
        }))?;
        assert_eq!(reply, RemoteReply::text("Hi there"));
        Ok(())
    }

    #[test]
    fn test_rejects_incomplete_envelopes() {
        let cases = [
            json!({"content": "Hi there"}),
            json!({"type": "text"}),
            json!({"type": "text", "content": ""}),
            json!({"type": "", "content": "Hi"}),
            json!({"type": "video", "content": "https://example.com/clip.mp4"}),
            json!({"type": "text", "content": 42}),
            json!("pong"),
            json!([1, 2, 3]),
            json!(null),
        ];

        for case in cases {
            let result = RemoteReply::from_value(&case);
            assert_eq!(
                result,
                Err(ChatError::Format(INVALID_FORMAT.to_string())),
                "expected a format error for {}",
                case
            );
        }
    }

    #[test]
    fn test_empty_text_reply_is_invalid() {
        assert!(RemoteReply::text("").validate().is_err());
        assert!(RemoteReply::text("pong").validate().is_ok());
    }

    #[test]
    fn test_into_message() {
        let message = RemoteReply::new(ContentType::Audio, "https://example.com/a.wav").into_message();
        assert_eq!(message.role, Role::Bot);
        assert_eq!(message.content_type, ContentType::Audio);
        assert_eq!(message.content, "https://example.com/a.wav");
        assert!(message.file_name.is_none());
    }
}
