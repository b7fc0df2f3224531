use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::models::message::Message;

/// Append-only list of messages, in display order
///
/// Cloning gives another handle to the same conversation. The only mutation is
/// [`Conversation::append`].
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Message>> {
        // A panic while pushing cannot leave the vector half written.
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, message: Message) {
        self.lock().push(message);
    }

    /// Copy of every message appended so far
    pub fn snapshot(&self) -> Vec<Message> {
        self.lock().clone()
    }

    /// Messages appended after the first `from`
    pub fn since(&self, from: usize) -> Vec<Message> {
        self.lock().iter().skip(from).cloned().collect()
    }

    pub fn last(&self) -> Option<Message> {
        self.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
