//! Status - tick の結果
//!
//! スケジューラのログに残す要約（成功フラグと削除件数など）。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    pub success: bool,
    /// False when `retention_days == 0`.
    pub enabled: bool,
    pub dry_run: bool,
    pub discovered: usize,
    pub tracked: usize,
    pub waiting: usize,
    pub reaped: usize,
    /// Reap candidates left alone because of dry-run.
    pub would_reap: usize,
    /// Resources skipped this tick because of a store or delete failure.
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TickSummary {
    pub fn disabled() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            enabled: true,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_json_omits_missing_error() {
        let json = serde_json::to_value(TickSummary::disabled()).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["enabled"], false);
        assert_eq!(json["reaped"], 0);
        assert!(json.get("error").is_none());

        let json = serde_json::to_value(TickSummary::failed("inventory down")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "inventory down");
    }
}
