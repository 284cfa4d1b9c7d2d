//! Discovery - 候補の取得、除外、正規化

use tracing::debug;

use crate::config::RetentionConfig;
use crate::domain::resource::tag_keys;
use crate::domain::{IdleFilter, InventoryError, RawResource, Resource, region_of};
use crate::ports::Inventory;

/// Query the inventory and return the resources eligible for tracking.
///
/// Read-only; an inventory failure fails the whole call.
pub async fn discover(
    inventory: &dyn Inventory,
    config: &RetentionConfig,
) -> Result<Vec<Resource>, InventoryError> {
    let filter = IdleFilter::csi_available();
    let candidates = inventory.list_idle_resources(&filter).await?;

    let resources = candidates
        .iter()
        // the inventory should already have applied the filter; don't trust it
        .filter(|raw| filter.matches(raw))
        .filter(|raw| {
            let excluded = is_excluded(raw, config);
            if excluded {
                debug!(resource_id = %raw.id, "excluded by ownership tag");
            }
            !excluded
        })
        .map(|raw| normalize(raw, config))
        .collect();

    Ok(resources)
}

/// True if any tag names an excluded namespace or cluster.
pub fn is_excluded(raw: &RawResource, config: &RetentionConfig) -> bool {
    raw.tags.iter().any(|tag| {
        (tag.key == tag_keys::PVC_NAMESPACE && config.excluded_namespaces.contains(&tag.value))
            || (tag.key == tag_keys::CLUSTER && config.excluded_clusters.contains(&tag.value))
    })
}

pub fn normalize(raw: &RawResource, config: &RetentionConfig) -> Resource {
    let tags = raw.tag_map();
    let region = region_of(&raw.availability_zone);

    let locality = tags
        .get(tag_keys::COUNTRY)
        .copied()
        .unwrap_or_else(|| config.locality_for_region(region));

    Resource {
        id: raw.id.clone(),
        region: region.to_string(),
        locality: locality.to_string(),
        cluster_owner: tags.get(tag_keys::CLUSTER).map(|v| v.to_string()),
        display_name: tags.get(tag_keys::NAME).map(|v| v.to_string()),
        environment: tags.get(tag_keys::ENVIRONMENT).map(|v| v.to_string()),
    }
}
