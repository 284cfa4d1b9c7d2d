//! InMemoryTrackingStore - インメモリの追跡ストア
//!
//! プロバイダ側の TTL と同じく、`expires_at` を過ぎたレコードは `get` から見えず、
//! アクセス時に削除される。

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{StoreError, TrackingRecord};
use crate::ports::{Clock, TrackingStore};

/// Operation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub reads: usize,
    pub writes: usize,
    pub deletes: usize,
}

pub struct InMemoryTrackingStore {
    records: Mutex<HashMap<String, TrackingRecord>>,
    clock: Arc<dyn Clock>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    deletes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
}

impl InMemoryTrackingStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            clock,
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::Relaxed);
    }

    /// Live (non-expired) record count.
    pub async fn len(&self) -> usize {
        let now = self.clock.now();
        let records = self.records.lock().await;
        records.values().filter(|r| !r.is_expired(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TrackingStore for InMemoryTrackingStore {
    async fn get(&self, id: &str) -> Result<Option<TrackingRecord>, StoreError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(StoreError::Read {
                id: id.to_string(),
                message: "injected read failure".to_string(),
            });
        }

        let now = self.clock.now();
        let mut records = self.records.lock().await;
        if records.get(id).is_some_and(|r| r.is_expired(now)) {
            records.remove(id);
            return Ok(None);
        }
        Ok(records.get(id).cloned())
    }

    async fn put(&self, record: &TrackingRecord) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Write {
                id: record.id.clone(),
                message: "injected write failure".to_string(),
            });
        }

        let mut records = self.records.lock().await;
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.deletes.fetch_add(1, Ordering::Relaxed);
        if self.fail_deletes.load(Ordering::Relaxed) {
            return Err(StoreError::Delete {
                id: id.to_string(),
                message: "injected delete failure".to_string(),
            });
        }

        let mut records = self.records.lock().await;
        records.remove(id);
        Ok(())
    }
}
