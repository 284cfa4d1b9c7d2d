//! Decision - 1 tick における resource ごとの判定結果

use serde::{Deserialize, Serialize};

/// Outcome of evaluating an idle resource against its tracking record.
///
/// - `Track`: first sighting, the clock was started
/// - `Wait`: the clock is running but retention has not elapsed
/// - `Reap`: retention elapsed, the resource should be deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Track,
    Wait,
    Reap,
}

impl Decision {
    /// Decide from elapsed whole days.
    pub fn from_age(elapsed_days: i64, retention_days: u32) -> Self {
        if elapsed_days >= i64::from(retention_days) {
            Decision::Reap
        } else {
            Decision::Wait
        }
    }
}
