//! Resource - インベントリの生データと正規化済みリソース

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Tag keys the reaper understands.
pub mod tag_keys {
    /// Marker set by the EBS CSI driver on every volume it provisions.
    pub const CSI_MANAGED: &str = "ebs.csi.aws.com/cluster";
    pub const PVC_NAMESPACE: &str = "kubernetes.io/created-for/pvc/namespace";
    pub const CLUSTER: &str = "KubernetesCluster";
    pub const NAME: &str = "Name";
    pub const COUNTRY: &str = "Country";
    pub const ENVIRONMENT: &str = "Environment";
}

/// A single key/value tag as reported by the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Inventory query filter.
///
/// Only resources in `status` that carry `marker_key = marker_value` are
/// candidates; nothing else is ever considered for reaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleFilter {
    pub status: String,
    pub marker_key: String,
    pub marker_value: String,
}

impl IdleFilter {
    /// Detached volumes created by the CSI provisioner.
    pub fn csi_available() -> Self {
        Self {
            status: "available".to_string(),
            marker_key: tag_keys::CSI_MANAGED.to_string(),
            marker_value: "true".to_string(),
        }
    }

    pub fn matches(&self, raw: &RawResource) -> bool {
        raw.state == self.status
            && raw
                .tags
                .iter()
                .any(|t| t.key == self.marker_key && t.value == self.marker_value)
    }
}

/// A resource exactly as the inventory returned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResource {
    pub id: String,
    pub state: String,
    pub availability_zone: String,
    pub tags: Vec<Tag>,
}

impl RawResource {
    /// Collapse the tag list into a lookup map.
    ///
    /// Keys are unique per resource on the provider side; if a key repeats,
    /// the last value wins.
    pub fn tag_map(&self) -> HashMap<&str, &str> {
        self.tags
            .iter()
            .map(|t| (t.key.as_str(), t.value.as_str()))
            .collect()
    }
}

/// Normalized idle resource, rebuilt from the inventory every tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub region: String,
    pub locality: String,
    pub cluster_owner: Option<String>,
    pub display_name: Option<String>,
    pub environment: Option<String>,
}

/// Region of an availability zone (`ap-northeast-2a` -> `ap-northeast-2`).
pub fn region_of(availability_zone: &str) -> &str {
    match availability_zone.chars().last() {
        Some(c) if c.is_ascii_alphabetic() => &availability_zone[..availability_zone.len() - 1],
        _ => availability_zone,
    }
}
