//! Inventory port - 候補リソースの一覧取得（読み取り専用）

use async_trait::async_trait;

use crate::domain::{IdleFilter, InventoryError, RawResource};

/// Inventory lists resources matching `filter`.
///
/// Implementations must not return resources that fail the filter; the
/// marker tag is what proves a volume was created by the provisioner.
#[async_trait]
pub trait Inventory: Send + Sync {
    async fn list_idle_resources(
        &self,
        filter: &IdleFilter,
    ) -> Result<Vec<RawResource>, InventoryError>;
}
