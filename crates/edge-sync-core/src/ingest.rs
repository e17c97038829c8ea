//! Ingest adapter: notification batches in, queue messages out.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::queue::ChangeQueue;
use crate::record::{encode_batch, ChangeRecord, NotificationEvent};

/// Status and summary returned to the invoking trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

/// Adapter turning raw notification batches into queue messages.
///
/// Each invocation produces exactly one queue message regardless of batch
/// size. The adapter never retries; redelivery of the original notification
/// is governed by the invoking trigger.
pub struct IngestAdapter {
    queue: Arc<dyn ChangeQueue>,
}

impl IngestAdapter {
    /// Create an adapter sending to the given queue
    pub fn new(queue: Arc<dyn ChangeQueue>) -> Self {
        Self { queue }
    }

    /// Normalize a notification batch and enqueue it as one message.
    pub async fn handle(&self, event: &NotificationEvent) -> IngestResponse {
        let received = event.records.len();
        info!("{} events received", received);

        let records: Vec<ChangeRecord> = event
            .records
            .iter()
            .map(ChangeRecord::from_notification)
            .collect();

        // Coarse anti-collision group key for the FIFO queue.
        let group_id = chrono::Utc::now().timestamp().to_string();

        let enqueued = match encode_batch(&records) {
            Ok(body) => match self.queue.send(body, &group_id).await {
                Ok(()) => {
                    info!("Batch of {} records added to queue", records.len());
                    true
                }
                Err(e) => {
                    error!("Error adding batch to queue: {}", e);
                    false
                }
            },
            Err(e) => {
                error!("Error encoding batch: {}", e);
                false
            }
        };

        let mut status_code = 200;
        if !enqueued {
            status_code = 500;
        }
        if records.is_empty() {
            status_code = 500;
        }

        let body = if status_code == 200 {
            format!("Success, {}/{} added to queue!", records.len(), received)
        } else {
            format!("Error, {}/{} added to queue!", records.len(), received)
        };

        IngestResponse { status_code, body }
    }
}
