//! Reaper - 削除と追跡レコードの後始末
//!
//! # フロー
//! 1. ResourceDeleter::delete_resource()（NotFound / AlreadyDeleting は成功扱い）
//! 2. TrackingStore::delete()（best-effort、失敗しても expires_at で自然に消える）
//! 3. DeletionEvent を返す（通知は呼び出し側）
//!
//! 削除が失敗した場合はレコードを残し、次の tick で再試行させる。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::{DeletionEvent, ReapError, Resource};
use crate::ports::{ResourceDeleter, TrackingStore};

pub struct Reaper {
    deleter: Arc<dyn ResourceDeleter>,
    store: Arc<dyn TrackingStore>,
}

impl Reaper {
    pub fn new(deleter: Arc<dyn ResourceDeleter>, store: Arc<dyn TrackingStore>) -> Self {
        Self { deleter, store }
    }

    pub async fn reap(
        &self,
        resource: &Resource,
        now: DateTime<Utc>,
    ) -> Result<DeletionEvent, ReapError> {
        match self.deleter.delete_resource(&resource.id).await {
            Ok(()) => {
                info!(resource_id = %resource.id, "deleted idle resource");
            }
            Err(e) if e.is_idempotent_success() => {
                info!(
                    resource_id = %resource.id,
                    reason = %e,
                    "resource already gone, treating as deleted"
                );
            }
            Err(e) => return Err(ReapError::from(e)),
        }

        if let Err(e) = self.store.delete(&resource.id).await {
            warn!(
                resource_id = %resource.id,
                error = %e,
                "failed to clear tracking record; it will expire on its own"
            );
        }

        Ok(DeletionEvent::from_resource(resource, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resource::tag_keys;
    use crate::domain::{DeleteError, RawResource, Tag, TrackingRecord};
    use crate::impls::{InMemoryTrackingStore, InMemoryVolumes};
    use crate::ports::FixedClock;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 8, 12, 0, 0).unwrap()
    }

    fn resource(id: &str) -> Resource {
        Resource {
            id: id.to_string(),
            region: "ap-northeast-1".to_string(),
            locality: "jp".to_string(),
            cluster_owner: Some("dev-jp".to_string()),
            display_name: Some("pvc-cache".to_string()),
            environment: None,
        }
    }

    fn raw(id: &str) -> RawResource {
        RawResource {
            id: id.to_string(),
            state: "available".to_string(),
            availability_zone: "ap-northeast-1a".to_string(),
            tags: vec![Tag::new(tag_keys::CSI_MANAGED, "true")],
        }
    }

    async fn setup(
        volumes: Vec<RawResource>,
    ) -> (Arc<InMemoryVolumes>, Arc<InMemoryTrackingStore>, Reaper) {
        let volumes = Arc::new(InMemoryVolumes::new(volumes));
        let store = Arc::new(InMemoryTrackingStore::new(Arc::new(FixedClock::new(now()))));
        store
            .put(&TrackingRecord::start("vol-1", now() - chrono::Duration::days(8), 7))
            .await
            .unwrap();
        let reaper = Reaper::new(volumes.clone(), store.clone());
        (volumes, store, reaper)
    }

    #[tokio::test]
    async fn reap_deletes_and_clears_record() {
        let (volumes, store, reaper) = setup(vec![raw("vol-1")]).await;

        let event = reaper.reap(&resource("vol-1"), now()).await.unwrap();

        assert_eq!(event.resource_id, "vol-1");
        assert_eq!(event.cluster_owner.as_deref(), Some("dev-jp"));
        assert_eq!(event.display_name.as_deref(), Some("pvc-cache"));
        assert_eq!(event.locality, "jp");
        assert_eq!(event.deleted_at, now());
        assert!(volumes.ids().await.is_empty());
        assert!(store.get("vol-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reaping_twice_is_idempotent() {
        let (volumes, _store, reaper) = setup(vec![raw("vol-1")]).await;

        assert!(reaper.reap(&resource("vol-1"), now()).await.is_ok());
        assert!(reaper.reap(&resource("vol-1"), now()).await.is_ok());
        assert_eq!(volumes.delete_calls().await, vec!["vol-1", "vol-1"]);
    }

    #[tokio::test]
    async fn already_deleting_counts_as_success() {
        let (volumes, store, reaper) = setup(vec![raw("vol-1")]).await;
        volumes.mark_deleting("vol-1").await;

        assert!(reaper.reap(&resource("vol-1"), now()).await.is_ok());
        assert!(store.get("vol-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn provider_error_keeps_record() {
        let (volumes, store, reaper) = setup(vec![raw("vol-1")]).await;
        volumes.deny("vol-1").await;

        let err = reaper.reap(&resource("vol-1"), now()).await.unwrap_err();
        assert!(matches!(
            err,
            ReapError::Delete(DeleteError::Provider { .. })
        ));
        assert!(store.get("vol-1").await.unwrap().is_some());
        assert_eq!(volumes.ids().await, vec!["vol-1"]);
    }

    #[tokio::test]
    async fn record_cleanup_failure_is_not_fatal() {
        let (volumes, store, reaper) = setup(vec![raw("vol-1")]).await;
        store.fail_deletes(true);

        assert!(reaper.reap(&resource("vol-1"), now()).await.is_ok());
        assert!(volumes.ids().await.is_empty());
    }
}
