//! TrackingStore port - resource id をキーにした永続 KV ストア
//!
//! # 設計原則
//! - get/put/delete の point operation のみ
//! - expires_at を過ぎたレコードはストア側で自動的に消える（呼び出し側は関与しない）
//! - get は「存在しない」を None で返す（空文字などの番兵値は使わない）

use async_trait::async_trait;

use crate::domain::{StoreError, TrackingRecord};

#[async_trait]
pub trait TrackingStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<TrackingRecord>, StoreError>;

    /// Insert or overwrite the record for `record.id`.
    async fn put(&self, record: &TrackingRecord) -> Result<(), StoreError>;

    /// Deleting a missing record is not an error.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}
