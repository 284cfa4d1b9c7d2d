//! EC2 - ボリュームの一覧取得と削除

use async_trait::async_trait;
use aws_sdk_ec2::Client;
use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_ec2::types::{Filter, Volume};
use tracing::debug;

use reaper_core::domain::{DeleteError, IdleFilter, InventoryError, RawResource, Tag};
use reaper_core::ports::{Inventory, ResourceDeleter};

const NOT_FOUND_CODE: &str = "InvalidVolume.NotFound";
const INCORRECT_STATE_CODE: &str = "IncorrectState";

pub struct Ec2Inventory {
    client: Client,
}

impl Ec2Inventory {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Inventory for Ec2Inventory {
    async fn list_idle_resources(
        &self,
        filter: &IdleFilter,
    ) -> Result<Vec<RawResource>, InventoryError> {
        let mut resources = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .describe_volumes()
                .filters(Filter::builder().name("status").values(&filter.status).build())
                .filters(
                    Filter::builder()
                        .name(format!("tag:{}", filter.marker_key))
                        .values(&filter.marker_value)
                        .build(),
                )
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| InventoryError(format!("DescribeVolumes: {}", DisplayErrorContext(&e))))?;

            resources.extend(output.volumes().iter().filter_map(raw_resource));

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(count = resources.len(), "listed idle volumes");
        Ok(resources)
    }
}

/// Volumes without an id or availability zone are skipped.
fn raw_resource(volume: &Volume) -> Option<RawResource> {
    let id = volume.volume_id()?;
    let availability_zone = volume.availability_zone()?;
    let tags = volume
        .tags()
        .iter()
        .filter_map(|t| Some(Tag::new(t.key()?, t.value().unwrap_or_default())))
        .collect();

    Some(RawResource {
        id: id.to_string(),
        state: volume
            .state()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
        availability_zone: availability_zone.to_string(),
        tags,
    })
}

pub struct Ec2VolumeDeleter {
    client: Client,
}

impl Ec2VolumeDeleter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceDeleter for Ec2VolumeDeleter {
    async fn delete_resource(&self, id: &str) -> Result<(), DeleteError> {
        match self.client.delete_volume().volume_id(id).send().await {
            Ok(_) => Ok(()),
            Err(err) => {
                let code = err.as_service_error().and_then(ProvideErrorMetadata::code);
                Err(classify_delete_error(
                    id,
                    code,
                    DisplayErrorContext(&err).to_string(),
                ))
            }
        }
    }
}

fn classify_delete_error(id: &str, code: Option<&str>, message: String) -> DeleteError {
    match code {
        Some(NOT_FOUND_CODE) => DeleteError::NotFound(id.to_string()),
        Some(INCORRECT_STATE_CODE) => DeleteError::AlreadyDeleting(id.to_string()),
        _ => DeleteError::Provider {
            id: id.to_string(),
            message,
        },
    }
}
