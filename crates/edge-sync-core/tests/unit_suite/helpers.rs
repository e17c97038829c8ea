//! Test helper utilities.
//!
//! Fixtures and fakes shared across the unit tests: config builders,
//! record/notification builders, a queue that refuses sends and a
//! destination that fails a configurable number of uploads.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use edge_sync_core::config::{NetStorageCredentials, WorkerOptions};
use edge_sync_core::error::{QueueError, StorageError};
use edge_sync_core::{
    ChangeQueue, ChangeRecord, Error, MemoryBackend, NotificationEvent, NotificationRecord,
    QueueMessage, StorageBackend, SyncConfig,
};

/// Config fixture pointing the worker at a temp staging dir.
///
/// Polling delay is zero so drain loops finish instantly; the visibility
/// timeout is caller-chosen because it decides whether a failed message is
/// redeliverable within the same run.
pub fn test_config(staging_dir: &Path, visibility_timeout_secs: u64) -> SyncConfig {
    SyncConfig {
        region: None,
        queue_url: "memory".to_string(),
        cpcode: "7001".to_string(),
        bucket: "source-bucket".to_string(),
        netstorage: NetStorageCredentials {
            hostname: "example-nsu.akamaihd.net".to_string(),
            user: "keyname".to_string(),
            key: "secret".to_string(),
        },
        worker: WorkerOptions {
            batch_size: 5,
            visibility_timeout_secs,
            poll_delay_secs: 0,
            staging_dir: staging_dir.to_path_buf(),
        },
    }
}

/// Change record for a created/overwritten object
pub fn created_record(key: &str) -> ChangeRecord {
    ChangeRecord {
        event_name: "ObjectCreated:Put".to_string(),
        bucket: "source-bucket".to_string(),
        key: key.to_string(),
        etag: "e1".to_string(),
        sequencer: "0055AED6DCD90281E5".to_string(),
    }
}

/// Change record for a removed object
pub fn removed_record(key: &str) -> ChangeRecord {
    ChangeRecord {
        event_name: "ObjectRemoved:Delete".to_string(),
        bucket: "source-bucket".to_string(),
        key: key.to_string(),
        etag: "e1".to_string(),
        sequencer: "0055AED6DCD90281E5".to_string(),
    }
}

/// Raw notification batch from (event name, key) pairs
pub fn notification_event(entries: &[(&str, &str)]) -> NotificationEvent {
    let records = entries
        .iter()
        .map(|(event_name, key)| {
            serde_json::from_value::<NotificationRecord>(serde_json::json!({
                "eventName": event_name,
                "s3": {
                    "bucket": { "name": "source-bucket" },
                    "object": {
                        "key": key,
                        "eTag": "e1",
                        "sequencer": "0055AED6DCD90281E5"
                    }
                }
            }))
            .expect("notification fixture should deserialize")
        })
        .collect();

    NotificationEvent { records }
}

/// Seed a key into a memory backend
pub async fn seed(backend: &MemoryBackend, key: &str, content: &str) {
    backend
        .put(key, Bytes::from(content.to_string()))
        .await
        .expect("seeding the memory backend should succeed");
}

/// Queue that refuses every send
pub struct FailingQueue;

#[async_trait]
impl ChangeQueue for FailingQueue {
    async fn send(&self, _body: String, _group_id: &str) -> edge_sync_core::Result<()> {
        Err(QueueError::Send("injected send failure".to_string()).into())
    }

    async fn receive(
        &self,
        _max_messages: i32,
        _visibility_timeout: Duration,
    ) -> edge_sync_core::Result<Vec<QueueMessage>> {
        Ok(Vec::new())
    }

    async fn acknowledge(&self, _receipt_handle: &str) -> edge_sync_core::Result<()> {
        Ok(())
    }
}

/// Destination that fails the first `failures` uploads, then delegates
pub struct FlakyDestination {
    inner: Arc<MemoryBackend>,
    remaining_failures: AtomicUsize,
}

impl FlakyDestination {
    pub fn new(inner: Arc<MemoryBackend>, failures: usize) -> Self {
        Self {
            inner,
            remaining_failures: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl StorageBackend for FlakyDestination {
    async fn put(&self, key: &str, data: Bytes) -> edge_sync_core::Result<()> {
        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::Storage(StorageError::Backend(
                "injected upload failure".to_string(),
            )));
        }
        self.inner.put(key, data).await
    }

    async fn get(&self, key: &str) -> edge_sync_core::Result<Bytes> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> edge_sync_core::Result<()> {
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> edge_sync_core::Result<bool> {
        self.inner.exists(key).await
    }
}
