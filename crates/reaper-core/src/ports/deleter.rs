//! ResourceDeleter port - リソースの削除

use async_trait::async_trait;

use crate::domain::DeleteError;

/// Callers treat `DeleteError::NotFound` and `DeleteError::AlreadyDeleting`
/// as success.
#[async_trait]
pub trait ResourceDeleter: Send + Sync {
    async fn delete_resource(&self, id: &str) -> Result<(), DeleteError>;
}
