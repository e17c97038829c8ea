//! Change queue abstraction and implementations.
//!
//! The queue is the only durable state in the pipeline: the ingest adapter
//! sends one message per notification batch, and the sync worker receives,
//! processes and acknowledges them. Unacknowledged messages become visible
//! again once their visibility timeout expires.

mod memory;
mod sqs;

pub use memory::MemoryQueue;
pub use sqs::SqsQueue;

use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// A received queue message, one batch of change records plus the receipt
/// token used to acknowledge it.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    /// Raw message body (a JSON array of change records)
    pub body: String,

    /// Receipt token for this delivery of the message
    pub receipt_handle: String,
}

/// Trait for durable change queues
#[async_trait]
pub trait ChangeQueue: Send + Sync {
    /// Send one message with the given group/partition key
    async fn send(&self, body: String, group_id: &str) -> Result<()>;

    /// Receive up to `max_messages` messages, hiding them from other
    /// consumers for `visibility_timeout`
    async fn receive(
        &self,
        max_messages: i32,
        visibility_timeout: Duration,
    ) -> Result<Vec<QueueMessage>>;

    /// Acknowledge (delete) a message by its receipt token
    async fn acknowledge(&self, receipt_handle: &str) -> Result<()>;
}
