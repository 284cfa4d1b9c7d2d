//! RecordingNotifier - 通知をメモリに記録する Notifier

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{DeletionEvent, NotifyError};
use crate::ports::Notifier;

/// Keeps every event it was handed; can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<DeletionEvent>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::Relaxed);
    }

    pub async fn events(&self) -> Vec<DeletionEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: &DeletionEvent) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(NotifyError::Transport("injected notify failure".to_string()));
        }
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}
