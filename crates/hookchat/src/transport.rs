use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use tokio::time::timeout;

use crate::blob_store::BlobStore;
use crate::composer::Submission;
use crate::config::Settings;
use crate::conversation::Conversation;
use crate::errors::{ChatError, ChatResult};
use crate::models::message::Message;
use crate::models::reply::RemoteReply;

pub const READ_FAILED: &str = "Error reading response";

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub endpoint: String,
    pub timeout: Duration,
    /// Shown when the request is cancelled
    pub timeout_message: String,
    /// Shown when an error carries no text of its own
    pub generic_error: String,
}

impl TransportConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            endpoint: settings.endpoint.url.clone(),
            timeout: settings.endpoint.timeout(),
            timeout_message: settings.messages.timeout.clone(),
            generic_error: settings.messages.generic_error.clone(),
        }
    }
}

/// Posts submissions to the webhook and records both sides of the exchange
pub struct WebhookClient {
    client: Client,
    config: TransportConfig,
    blobs: BlobStore,
}

impl WebhookClient {
    pub fn new(config: TransportConfig) -> ChatResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ChatError::Network(e.to_string()))?;

        Ok(Self {
            client,
            config,
            blobs: BlobStore::new()?,
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Send a submission and append the user message and the reply to `conversation`
    ///
    /// The user message is appended before any network activity. Exactly one bot message
    /// follows, either built from the reply or describing what went wrong, and is also
    /// returned. Failures never escape this call.
    pub async fn send(&self, conversation: &Conversation, submission: Submission) -> Message {
        let result = match self.user_message(&submission) {
            Ok(message) => {
                conversation.append(message);
                self.exchange(&submission).await
            }
            Err(e) => Err(e),
        };

        let reply = match result {
            Ok(reply) => reply.into_message(),
            Err(e) => {
                tracing::error!("Error sending message: {}", e);
                Message::bot_error(self.describe(&e))
            }
        };

        conversation.append(reply.clone());
        reply
    }

    fn user_message(&self, submission: &Submission) -> ChatResult<Message> {
        match &submission.attachment {
            Some(attachment) => {
                let placeholder = Message::user_attachment(attachment, "");
                let location = self.blobs.store(&placeholder.id, attachment)?;
                Ok(Message {
                    content: location,
                    ..placeholder
                })
            }
            None => Ok(Message::user_text(submission.text.clone())),
        }
    }

    fn describe(&self, err: &ChatError) -> String {
        let text = err.to_string();
        if text.trim().is_empty() {
            self.config.generic_error.clone()
        } else {
            text
        }
    }

    /// Post one submission and decode the reply, without touching any conversation
    pub async fn exchange(&self, submission: &Submission) -> ChatResult<RemoteReply> {
        let form = build_form(submission)?;
        let request = self
            .client
            .post(&self.config.endpoint)
            .header(ACCEPT, "application/json")
            .multipart(form);

        tracing::debug!("Posting message to {}", self.config.endpoint);

        let body = timeout(self.config.timeout, async {
            let response = request
                .send()
                .await
                .map_err(|e| ChatError::Network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ChatError::Http {
                    status: status.as_u16(),
                });
            }

            response.text().await.map_err(|e| {
                tracing::debug!("Failed to read reply body: {}", e);
                ChatError::Network(READ_FAILED.to_string())
            })
        })
        .await
        .map_err(|_| ChatError::Timeout(self.config.timeout_message.clone()))??;

        tracing::debug!("Received reply of {} bytes", body.len());
        decode_reply(&body)
    }
}

/// Build the multipart body: `message` when there is text, `file` when there is an attachment
pub fn build_form(submission: &Submission) -> ChatResult<Form> {
    let mut form = Form::new();

    if !submission.text.is_empty() {
        form = form.text("message", submission.text.clone());
    }

    if let Some(attachment) = &submission.attachment {
        let part = Part::bytes(attachment.bytes.clone())
            .file_name(attachment.name.clone())
            .mime_str(&attachment.mime_type)
            .map_err(|_| {
                ChatError::Validation(format!("Invalid media type {}", attachment.mime_type))
            })?;
        form = form.part("file", part);
    }

    Ok(form)
}

/// Turn a reply body into a validated envelope
///
/// Bodies that are not JSON are wrapped as text replies instead of failing.
pub fn decode_reply(body: &str) -> ChatResult<RemoteReply> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => RemoteReply::from_value(&value),
        Err(_) => {
            tracing::warn!("Reply is not JSON, treating it as text");
            RemoteReply::text(body).validate()
        }
    }
}
