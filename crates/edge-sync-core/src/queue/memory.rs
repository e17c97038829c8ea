//! In-memory change queue for testing.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{ChangeQueue, QueueMessage};
use crate::error::QueueError;
use crate::Result;

struct StoredMessage {
    body: String,
    group_id: String,
    visible_at: Instant,
    receipt_handle: Option<String>,
    delivery_count: u32,
}

/// In-memory change queue with visibility-timeout semantics.
///
/// Received messages are hidden until their visibility timeout expires,
/// then become redeliverable with a fresh receipt handle. Useful for tests;
/// nothing is persisted between runs.
pub struct MemoryQueue {
    state: Mutex<State>,
}

struct State {
    messages: Vec<StoredMessage>,
    receipt_counter: u64,
}

impl MemoryQueue {
    /// Create a new empty in-memory queue
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                messages: Vec::new(),
                receipt_counter: 0,
            }),
        }
    }

    /// Number of messages still on the queue, visible or not
    pub fn message_count(&self) -> usize {
        self.state.lock().messages.len()
    }

    /// Bodies of all messages still on the queue, in arrival order
    pub fn bodies(&self) -> Vec<String> {
        self.state
            .lock()
            .messages
            .iter()
            .map(|m| m.body.clone())
            .collect()
    }

    /// Group ids of all messages still on the queue, in arrival order
    pub fn group_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .messages
            .iter()
            .map(|m| m.group_id.clone())
            .collect()
    }

    /// How often the message at `index` has been delivered
    pub fn delivery_count(&self, index: usize) -> u32 {
        self.state.lock().messages[index].delivery_count
    }
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChangeQueue for MemoryQueue {
    async fn send(&self, body: String, group_id: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.messages.push(StoredMessage {
            body,
            group_id: group_id.to_string(),
            visible_at: Instant::now(),
            receipt_handle: None,
            delivery_count: 0,
        });
        Ok(())
    }

    async fn receive(
        &self,
        max_messages: i32,
        visibility_timeout: Duration,
    ) -> Result<Vec<QueueMessage>> {
        let now = Instant::now();
        let mut state = self.state.lock();
        let mut received = Vec::new();

        for index in 0..state.messages.len() {
            if received.len() >= max_messages as usize {
                break;
            }
            if state.messages[index].visible_at > now {
                continue;
            }

            state.receipt_counter += 1;
            let receipt_handle = format!("receipt-{}", state.receipt_counter);

            let message = &mut state.messages[index];
            message.visible_at = now + visibility_timeout;
            message.receipt_handle = Some(receipt_handle.clone());
            message.delivery_count += 1;

            received.push(QueueMessage {
                body: message.body.clone(),
                receipt_handle,
            });
        }

        Ok(received)
    }

    async fn acknowledge(&self, receipt_handle: &str) -> Result<()> {
        let mut state = self.state.lock();
        let position = state
            .messages
            .iter()
            .position(|m| m.receipt_handle.as_deref() == Some(receipt_handle));

        match position {
            Some(index) => {
                state.messages.remove(index);
                Ok(())
            }
            None => Err(QueueError::Acknowledge(format!(
                "unknown receipt handle: {}",
                receipt_handle
            ))
            .into()),
        }
    }
}
