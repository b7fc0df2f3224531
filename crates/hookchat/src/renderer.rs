use chrono::{DateTime, Local, Utc};

use crate::models::message::{ContentType, Message, Role};

pub const EMPTY_CONVERSATION: &str = "Send a message to start the conversation";
pub const IMAGE_LABEL: &str = "Image";
pub const IMAGE_ALT: &str = "Uploaded content";
pub const AUDIO_LABEL: &str = "Audio Message";
pub const AUDIO_MIME: &str = "audio/wav";
pub const DOWNLOAD_LABEL: &str = "Download file";

#[derive(Debug, Clone, PartialEq, Eq)]
/// What to draw for a message body
pub enum Body {
    Text(String),
    Image {
        label: String,
        src: String,
        alt: String,
    },
    Audio {
        label: String,
        src: String,
        mime: String,
    },
    File {
        label: String,
        href: String,
        download_name: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub role: Role,
    pub body: Body,
    /// Local wall clock time the message was created
    pub time: String,
}

pub fn render(message: &Message) -> RenderedMessage {
    let body = match message.content_type {
        ContentType::Text => Body::Text(message.content.clone()),
        ContentType::Image => Body::Image {
            label: IMAGE_LABEL.to_string(),
            src: message.content.clone(),
            alt: IMAGE_ALT.to_string(),
        },
        ContentType::Audio => Body::Audio {
            label: AUDIO_LABEL.to_string(),
            src: message.content.clone(),
            mime: AUDIO_MIME.to_string(),
        },
        ContentType::File => Body::File {
            label: message
                .file_name
                .clone()
                .unwrap_or_else(|| DOWNLOAD_LABEL.to_string()),
            href: message.content.clone(),
            download_name: message.file_name.clone(),
        },
    };

    RenderedMessage {
        role: message.role,
        body,
        time: format_time(&message.timestamp),
    }
}

pub fn format_time(timestamp: &DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_text() {
        let rendered = render(&Message::user_text("Hello"));
        assert_eq!(rendered.role, Role::User);
        assert_eq!(rendered.body, Body::Text("Hello".to_string()));
    }

    #[test]
    fn test_image_and_audio() {
        let image = render(&Message::bot(ContentType::Image, "https://example.com/cat.png"));
        assert_eq!(
            image.body,
            Body::Image {
                label: "Image".to_string(),
                src: "https://example.com/cat.png".to_string(),
                alt: "Uploaded content".to_string(),
            }
        );

        let audio = render(&Message::bot(ContentType::Audio, "file:///tmp/recording.wav"));
        assert_eq!(
            audio.body,
            Body::Audio {
                label: "Audio Message".to_string(),
                src: "file:///tmp/recording.wav".to_string(),
                mime: "audio/wav".to_string(),
            }
        );
    }

    #[test]
    fn test_file_uses_name_or_fallback() {
        let named = render(
            &Message::bot(ContentType::File, "https://example.com/r.pdf").with_file_name("r.pdf"),
        );
        assert_eq!(
            named.body,
            Body::File {
                label: "r.pdf".to_string(),
                href: "https://example.com/r.pdf".to_string(),
                download_name: Some("r.pdf".to_string()),
            }
        );

        let anonymous = render(&Message::bot(ContentType::File, "https://example.com/r.pdf"));
        match anonymous.body {
            Body::File {
                label,
                download_name,
                ..
            } => {
                assert_eq!(label, "Download file");
                assert_eq!(download_name, None);
            }
            other => panic!("Expected file body, got {:?}", other),
        }
    }

    #[test]
    fn test_time_is_local() {
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        let expected = timestamp.with_timezone(&Local).format("%H:%M:%S").to_string();
        assert_eq!(format_time(&timestamp), expected);
        assert_eq!(format_time(&timestamp).len(), 8);
    }
}
