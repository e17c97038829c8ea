//! Sync engine orchestration.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{SyncConfig, WorkerOptions};
use crate::error::StorageError;
use crate::metrics::SyncMetrics;
use crate::queue::{ChangeQueue, QueueMessage};
use crate::record::{decode_batch, ChangeRecord, EventKind};
use crate::staging::StagingArea;
use crate::storage::StorageBackend;
use crate::{Error, Result};

/// Outcome of one sync pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Queue polls issued, including the final empty one
    pub polls: u64,
    /// Messages acknowledged (every record succeeded)
    pub messages_acknowledged: u64,
    /// Messages left on the queue for redelivery
    pub messages_requeued: u64,
    /// Records synced to the destination
    pub records_synced: u64,
    /// Records that failed
    pub records_failed: u64,
}

/// Engine mirroring queued change records to the destination backend
pub struct SyncEngine {
    options: WorkerOptions,
    cpcode: String,
    queue: Arc<dyn ChangeQueue>,
    source: Arc<dyn StorageBackend>,
    destination: Arc<dyn StorageBackend>,
    staging: StagingArea,
    metrics: Arc<SyncMetrics>,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(
        config: &SyncConfig,
        queue: Arc<dyn ChangeQueue>,
        source: Arc<dyn StorageBackend>,
        destination: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            options: config.worker.clone(),
            cpcode: config.cpcode.clone(),
            queue,
            source,
            destination,
            staging: StagingArea::new(config.worker.staging_dir.clone()),
            metrics: Arc::new(SyncMetrics::new()),
        }
    }

    /// Get metrics
    pub fn metrics(&self) -> &SyncMetrics {
        &self.metrics
    }

    /// Drain the queue once.
    ///
    /// Polls until a poll returns no messages, processing every received
    /// message sequentially and sleeping between non-empty polls. Record
    /// failures stay inside their message (the message is simply not
    /// acknowledged); queue-level failures end the pass with an error.
    pub async fn run(&self) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        loop {
            let messages = self
                .queue
                .receive(self.options.batch_size, self.options.visibility_timeout())
                .await?;
            report.polls += 1;

            if messages.is_empty() {
                info!("No messages on the queue");
                break;
            }

            info!("{} messages on the queue", messages.len());
            for message in &messages {
                self.process_message(message, &mut report).await?;
            }

            tokio::time::sleep(self.options.poll_delay()).await;
        }

        Ok(report)
    }

    async fn process_message(&self, message: &QueueMessage, report: &mut SyncReport) -> Result<()> {
        let records = match decode_batch(&message.body) {
            Ok(records) => records,
            Err(e) => {
                warn!("Leaving undecodable message for redelivery: {}", e);
                report.messages_requeued += 1;
                self.metrics.record_requeued();
                return Ok(());
            }
        };

        let mut failures = 0usize;
        for record in &records {
            let outcome = match record.kind() {
                EventKind::Removed => self.sync_delete(record).await,
                EventKind::Created => self.sync_upload(record).await,
            };

            match outcome {
                Ok(()) => {
                    report.records_synced += 1;
                    self.metrics.record_synced();
                }
                Err(e) => {
                    warn!("Failed to sync {}: {}", record.key, e);
                    failures += 1;
                    report.records_failed += 1;
                    self.metrics.record_failed();
                }
            }
        }

        if failures == 0 {
            self.queue.acknowledge(&message.receipt_handle).await?;
            debug!("Message removed from queue: {}", message.receipt_handle);
            report.messages_acknowledged += 1;
            self.metrics.record_acknowledged();
        } else {
            warn!(
                "{}/{} records failed, leaving message for redelivery",
                failures,
                records.len()
            );
            report.messages_requeued += 1;
            self.metrics.record_requeued();
        }

        Ok(())
    }

    async fn sync_delete(&self, record: &ChangeRecord) -> Result<()> {
        let destination_path = self.destination_path(&record.key);

        match self.destination.delete(&destination_path).await {
            Ok(()) => {
                info!("Deleted {} from the destination", destination_path);
                Ok(())
            }
            // Deleting an already-absent object is not an error.
            Err(Error::Storage(StorageError::NotFound(_))) => {
                warn!("File {} was not found on the destination", record.key);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn sync_upload(&self, record: &ChangeRecord) -> Result<()> {
        let data = self.source.get(&record.key).await?;
        let staged = self.staging.write(&record.key, &data).await?;
        debug!("Staged {} ({} bytes)", staged.display(), data.len());

        let body = self.staging.read(&record.key).await?;
        let destination_path = self.destination_path(&record.key);
        self.destination.put(&destination_path, body).await?;
        info!("Uploaded {} to {}", record.key, destination_path);
        self.metrics.record_bytes(data.len() as u64);

        // Staging cleanup never fails the record.
        if let Err(e) = self.staging.remove(&record.key).await {
            warn!("Failed to remove staged copy {}: {}", record.key, e);
        }

        Ok(())
    }

    fn destination_path(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.cpcode.trim_matches('/'),
            key.trim_start_matches('/')
        )
    }
}
