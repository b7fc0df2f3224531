//! These models represent the objects passed between the composer, the webhook and the
//! conversation view.
//!
//! There are two formats we need to interact with:
//! - the multipart request we post to the webhook, built from an [`attachment::Attachment`]
//!   and the draft text
//! - the `{type, content}` envelope the webhook answers with, see [`reply::RemoteReply`]
//!
//! Both are converted right away into [`message::Message`], which is what the conversation
//! stores and the renderer draws.
pub mod attachment;
pub mod message;
pub mod reply;
