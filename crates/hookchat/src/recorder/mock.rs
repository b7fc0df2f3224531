use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::{Capture, Microphone, PERMISSION_DENIED};
use crate::errors::{ChatError, ChatResult};

/// A mock microphone that replays pre-configured chunks for testing
pub struct MockMicrophone {
    chunks: Vec<Vec<u8>>,
    deny: bool,
    fail_finish: bool,
    opened: AtomicUsize,
    released: Arc<AtomicUsize>,
}

impl MockMicrophone {
    /// Every capture opened from this microphone yields `chunks`
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks,
            deny: false,
            fail_finish: false,
            opened: AtomicUsize::new(0),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A microphone the user refused access to
    pub fn denied() -> Self {
        Self {
            deny: true,
            ..Self::new(Vec::new())
        }
    }

    /// Captures open fine but fail when finished
    pub fn failing_finish(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            fail_finish: true,
            ..Self::new(chunks)
        }
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// How many captures have given the device back
    pub fn released_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Microphone for MockMicrophone {
    async fn open(&self) -> ChatResult<Box<dyn Capture>> {
        if self.deny {
            return Err(ChatError::Permission(PERMISSION_DENIED.to_string()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockCapture {
            chunks: self.chunks.clone(),
            fail_finish: self.fail_finish,
            released: Some(self.released.clone()),
        }))
    }
}

struct MockCapture {
    chunks: Vec<Vec<u8>>,
    fail_finish: bool,
    released: Option<Arc<AtomicUsize>>,
}

impl MockCapture {
    fn release(&mut self) {
        if let Some(released) = self.released.take() {
            released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl Capture for MockCapture {
    async fn finish(&mut self) -> ChatResult<Vec<Vec<u8>>> {
        self.release();
        if self.fail_finish {
            return Err(ChatError::Io("capture device went away".to_string()));
        }
        Ok(std::mem::take(&mut self.chunks))
    }
}

impl Drop for MockCapture {
    fn drop(&mut self) {
        self.release();
    }
}
