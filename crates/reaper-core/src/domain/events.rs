//! Events - 削除イベント
//!
//! DeletionEvent は削除直後に Notifier へ渡され、永続化されない。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Resource;

/// A resource that was just deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionEvent {
    pub resource_id: String,
    pub display_name: Option<String>,
    pub locality: String,
    pub region: String,
    pub cluster_owner: Option<String>,
    pub deleted_at: DateTime<Utc>,
}

/// Where the resource lived, as shown to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement<'a> {
    Cluster(&'a str),
    Region(&'a str),
}

impl<'a> Placement<'a> {
    pub fn title(&self) -> &'static str {
        match self {
            Placement::Cluster(_) => "Cluster",
            Placement::Region(_) => "Region",
        }
    }

    pub fn value(&self) -> &'a str {
        match self {
            Placement::Cluster(v) | Placement::Region(v) => *v,
        }
    }
}

impl DeletionEvent {
    pub fn from_resource(resource: &Resource, deleted_at: DateTime<Utc>) -> Self {
        Self {
            resource_id: resource.id.clone(),
            display_name: resource.display_name.clone(),
            locality: resource.locality.clone(),
            region: resource.region.clone(),
            cluster_owner: resource.cluster_owner.clone(),
            deleted_at,
        }
    }

    /// Cluster identity wins over the raw region when both are known.
    pub fn placement(&self) -> Placement<'_> {
        match &self.cluster_owner {
            Some(cluster) => Placement::Cluster(cluster),
            None => Placement::Region(&self.region),
        }
    }
}
