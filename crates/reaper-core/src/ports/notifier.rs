//! Notifier port - 削除通知の送信
//!
//! 呼び出し側は失敗をログに残すだけで、再試行も再キューもしない。

use async_trait::async_trait;

use crate::domain::{DeletionEvent, NotifyError};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &DeletionEvent) -> Result<(), NotifyError>;
}
