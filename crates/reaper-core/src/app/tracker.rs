//! AgingTracker - 初回観測時刻の記録と経過日数の判定
//!
//! # フロー
//! 1. TrackingStore::get() でレコードを取得
//! 2. なければ now で記録して Track
//! 3. あれば経過日数（切り捨て）を retention と比較して Wait / Reap
//!
//! Reap のときもストアは変更しない。レコード削除は削除成功後に Reaper が行う。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::{Decision, Resource, StoreError, TrackingRecord};
use crate::ports::TrackingStore;

pub struct AgingTracker {
    store: Arc<dyn TrackingStore>,
    retention_days: u32,
}

impl AgingTracker {
    /// `retention_days` must be non-zero; with zero the caller skips the
    /// tracker entirely.
    pub fn new(store: Arc<dyn TrackingStore>, retention_days: u32) -> Self {
        Self {
            store,
            retention_days,
        }
    }

    pub async fn evaluate(
        &self,
        resource: &Resource,
        now: DateTime<Utc>,
    ) -> Result<Decision, StoreError> {
        let Some(record) = self.store.get(&resource.id).await? else {
            let record = TrackingRecord::start(&resource.id, now, self.retention_days);
            self.store.put(&record).await?;
            info!(
                resource_id = %resource.id,
                first_observed_at = %record.first_observed_at,
                expires_at = %record.expires_at,
                "started tracking idle resource"
            );
            return Ok(Decision::Track);
        };

        let elapsed_days = record.elapsed_days(now);
        let decision = Decision::from_age(elapsed_days, self.retention_days);
        debug!(
            resource_id = %resource.id,
            first_observed_at = %record.first_observed_at,
            elapsed_days,
            retention_days = self.retention_days,
            ?decision,
            "evaluated idle resource"
        );
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryTrackingStore;
    use crate::ports::FixedClock;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    fn resource(id: &str) -> Resource {
        Resource {
            id: id.to_string(),
            region: "us-west-2".to_string(),
            locality: "us".to_string(),
            cluster_owner: None,
            display_name: None,
            environment: None,
        }
    }

    fn day0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn setup() -> (Arc<InMemoryTrackingStore>, AgingTracker) {
        let clock = Arc::new(FixedClock::new(day0()));
        let store = Arc::new(InMemoryTrackingStore::new(clock));
        let tracker = AgingTracker::new(store.clone(), 7);
        (store, tracker)
    }

    #[tokio::test]
    async fn first_sighting_tracks_and_records() {
        let (store, tracker) = setup();

        let decision = tracker.evaluate(&resource("vol-1"), day0()).await.unwrap();
        assert_eq!(decision, Decision::Track);

        let record = store.get("vol-1").await.unwrap().expect("record written");
        assert_eq!(record.first_observed_at, day0());
        assert_eq!(record.expires_at, day0() + Duration::days(9));
    }

    #[rstest]
    #[case::same_tick(Duration::zero(), Decision::Wait)]
    #[case::three_days(Duration::days(3), Decision::Wait)]
    #[case::one_minute_short(Duration::days(7) - Duration::minutes(1), Decision::Wait)]
    #[case::exactly_retention(Duration::days(7), Decision::Reap)]
    #[case::past_retention(Duration::days(8), Decision::Reap)]
    #[tokio::test]
    async fn later_sightings_age_by_whole_days(#[case] after: Duration, #[case] expected: Decision) {
        let (store, tracker) = setup();
        tracker.evaluate(&resource("vol-1"), day0()).await.unwrap();

        let decision = tracker
            .evaluate(&resource("vol-1"), day0() + after)
            .await
            .unwrap();
        assert_eq!(decision, expected);

        // neither Wait nor Reap touches the record
        let record = store.get("vol-1").await.unwrap().expect("record kept");
        assert_eq!(record.first_observed_at, day0());
        assert_eq!(store.stats().writes, 1);
        assert_eq!(store.stats().deletes, 0);
    }

    #[tokio::test]
    async fn oversized_retention_still_tracks() {
        let clock = Arc::new(FixedClock::new(day0()));
        let store = Arc::new(InMemoryTrackingStore::new(clock));
        let tracker = AgingTracker::new(store.clone(), 100_000_000);

        let decision = tracker.evaluate(&resource("vol-1"), day0()).await.unwrap();
        assert_eq!(decision, Decision::Track);

        let decision = tracker
            .evaluate(&resource("vol-1"), day0() + Duration::days(30))
            .await
            .unwrap();
        assert_eq!(decision, Decision::Wait);
        assert_eq!(store.stats().writes, 1);
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let (store, tracker) = setup();
        store.fail_writes(true);

        let err = tracker
            .evaluate(&resource("vol-1"), day0())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
    }

    #[tokio::test]
    async fn read_failure_does_not_write() {
        let (store, tracker) = setup();
        store.fail_reads(true);

        let err = tracker
            .evaluate(&resource("vol-1"), day0())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
        assert_eq!(store.stats().writes, 0);
    }
}
