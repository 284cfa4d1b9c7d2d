//! Errors - エラー型と分類
//!
//! - InventoryError: tick 全体が失敗（次の tick で最初からやり直す）
//! - StoreError: resource 単位（その resource だけ今回スキップ）
//! - DeleteError: NotFound / AlreadyDeleting は成功扱い、それ以外は記録を残して次回再試行
//! - NotifyError: ログのみ

use thiserror::Error;

#[derive(Debug, Error)]
#[error("inventory query failed: {0}")]
pub struct InventoryError(pub String);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read tracking record id={id}: {message}")]
    Read { id: String, message: String },

    #[error("failed to write tracking record id={id}: {message}")]
    Write { id: String, message: String },

    #[error("failed to delete tracking record id={id}: {message}")]
    Delete { id: String, message: String },
}

#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("resource not found id={0}")]
    NotFound(String),

    #[error("resource already deleting id={0}")]
    AlreadyDeleting(String),

    #[error("provider rejected delete id={id}: {message}")]
    Provider { id: String, message: String },
}

impl DeleteError {
    /// The resource is gone or going; a previous tick may have deleted it.
    pub fn is_idempotent_success(&self) -> bool {
        matches!(self, DeleteError::NotFound(_) | DeleteError::AlreadyDeleting(_))
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification transport failed: {0}")]
    Transport(String),

    #[error("notification rejected status={status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Error)]
pub enum ReapError {
    #[error(transparent)]
    Delete(#[from] DeleteError),
}

#[derive(Debug, Error)]
pub enum TickError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}
