//! InMemoryVolumes - 削除も受け付けるインメモリのボリューム一覧

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{DeleteError, IdleFilter, InventoryError, RawResource};
use crate::ports::{Inventory, ResourceDeleter};

#[derive(Default)]
struct VolumesState {
    volumes: Vec<RawResource>,
    denied: HashSet<String>,
    delete_calls: Vec<String>,
}

pub struct InMemoryVolumes {
    state: Mutex<VolumesState>,
    list_calls: AtomicUsize,
    fail_listing: AtomicBool,
}

impl InMemoryVolumes {
    pub fn new(volumes: Vec<RawResource>) -> Self {
        Self {
            state: Mutex::new(VolumesState {
                volumes,
                ..VolumesState::default()
            }),
            list_calls: AtomicUsize::new(0),
            fail_listing: AtomicBool::new(false),
        }
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::Relaxed);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::Relaxed)
    }

    /// Ids of every volume that still exists, sorted.
    pub async fn ids(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut ids: Vec<String> = state.volumes.iter().map(|v| v.id.clone()).collect();
        ids.sort();
        ids
    }

    pub async fn delete_calls(&self) -> Vec<String> {
        self.state.lock().await.delete_calls.clone()
    }

    /// Make deletes of `id` fail like a permission error.
    pub async fn deny(&self, id: &str) {
        self.state.lock().await.denied.insert(id.to_string());
    }

    pub async fn attach(&self, id: &str) {
        self.set_state(id, "in-use").await;
    }

    pub async fn mark_deleting(&self, id: &str) {
        self.set_state(id, "deleting").await;
    }

    async fn set_state(&self, id: &str, to: &str) {
        let mut state = self.state.lock().await;
        if let Some(volume) = state.volumes.iter_mut().find(|v| v.id == id) {
            volume.state = to.to_string();
        }
    }
}

#[async_trait]
impl Inventory for InMemoryVolumes {
    async fn list_idle_resources(
        &self,
        filter: &IdleFilter,
    ) -> Result<Vec<RawResource>, InventoryError> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_listing.load(Ordering::Relaxed) {
            return Err(InventoryError("injected listing failure".to_string()));
        }

        let state = self.state.lock().await;
        Ok(state
            .volumes
            .iter()
            .filter(|v| filter.matches(v))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ResourceDeleter for InMemoryVolumes {
    async fn delete_resource(&self, id: &str) -> Result<(), DeleteError> {
        let mut state = self.state.lock().await;
        state.delete_calls.push(id.to_string());

        if state.denied.contains(id) {
            return Err(DeleteError::Provider {
                id: id.to_string(),
                message: "UnauthorizedOperation".to_string(),
            });
        }

        let Some(pos) = state.volumes.iter().position(|v| v.id == id) else {
            return Err(DeleteError::NotFound(id.to_string()));
        };

        let current = state.volumes[pos].state.clone();
        match current.as_str() {
            "deleting" => Err(DeleteError::AlreadyDeleting(id.to_string())),
            "in-use" => Err(DeleteError::Provider {
                id: id.to_string(),
                message: "VolumeInUse".to_string(),
            }),
            _ => {
                state.volumes.remove(pos);
                Ok(())
            }
        }
    }
}
