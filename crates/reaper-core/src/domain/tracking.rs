//! TrackingRecord - 「最初にアイドルを観測した時刻」の永続レコード

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Extra days a tracking record outlives the retention window.
///
/// Records of resources that stop showing up (reattached, deleted by hand)
/// expire on the store side after this margin, so nothing has to clean them up.
pub const TRACKING_GRACE_PERIOD_DAYS: i64 = 2;

/// At most one record exists per resource id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub id: String,
    pub first_observed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TrackingRecord {
    /// Start the clock for `id` at `now`.
    ///
    /// An expiry past the representable range saturates at `DateTime::<Utc>::MAX_UTC`.
    pub fn start(id: impl Into<String>, now: DateTime<Utc>, retention_days: u32) -> Self {
        let ttl = Duration::days(i64::from(retention_days) + TRACKING_GRACE_PERIOD_DAYS);
        Self {
            id: id.into(),
            first_observed_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Whole days elapsed since the first observation.
    ///
    /// Sub-day remainders are dropped, so `Day0 12:00 -> Day7 11:59` is 6.
    pub fn elapsed_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.first_observed_at).num_days()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn start_sets_expiry_past_retention() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let record = TrackingRecord::start("vol-1", t0, 7);

        assert_eq!(record.first_observed_at, t0);
        assert_eq!(record.expires_at, t0 + Duration::days(9));
        assert!(!record.is_expired(t0 + Duration::days(8)));
        assert!(record.is_expired(t0 + Duration::days(9)));
    }

    #[test]
    fn huge_retention_saturates_expiry() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let record = TrackingRecord::start("vol-1", t0, u32::MAX);

        assert_eq!(record.first_observed_at, t0);
        assert_eq!(record.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(!record.is_expired(t0 + Duration::days(36500)));
        assert_eq!(record.elapsed_days(t0 + Duration::days(3)), 3);
    }

    #[test]
    fn elapsed_days_floors() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let record = TrackingRecord::start("vol-1", t0, 7);

        assert_eq!(record.elapsed_days(t0), 0);
        assert_eq!(record.elapsed_days(t0 + Duration::hours(23)), 0);
        assert_eq!(record.elapsed_days(t0 + Duration::days(7) - Duration::minutes(1)), 6);
        assert_eq!(record.elapsed_days(t0 + Duration::days(7)), 7);
    }

    #[test]
    fn clock_skew_backwards_is_not_aged() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let record = TrackingRecord::start("vol-1", t0, 7);
        assert!(record.elapsed_days(t0 - Duration::hours(2)) <= 0);
    }
}
