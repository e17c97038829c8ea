//! SQS-backed change queue.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{ChangeQueue, QueueMessage};
use crate::error::QueueError;
use crate::Result;

/// Change queue backed by an SQS FIFO queue
pub struct SqsQueue {
    client: aws_sdk_sqs::Client,
    queue_url: String,
}

impl SqsQueue {
    /// Create a new SQS queue client from the default credential chain.
    pub async fn new(region: Option<String>, queue_url: String) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let shared_config = loader.load().await;

        info!("Created SQS queue client for {}", queue_url);

        Self {
            client: aws_sdk_sqs::Client::new(&shared_config),
            queue_url,
        }
    }

    /// Create a queue client from an existing SQS client.
    pub fn with_client(client: aws_sdk_sqs::Client, queue_url: String) -> Self {
        Self { client, queue_url }
    }
}

#[async_trait]
impl ChangeQueue for SqsQueue {
    async fn send(&self, body: String, group_id: &str) -> Result<()> {
        debug!("SQS SEND: group {}", group_id);

        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .message_group_id(group_id)
            .send()
            .await
            .map_err(|e| QueueError::Send(e.to_string()))?;

        Ok(())
    }

    async fn receive(
        &self,
        max_messages: i32,
        visibility_timeout: Duration,
    ) -> Result<Vec<QueueMessage>> {
        debug!("SQS RECEIVE: up to {} messages", max_messages);

        let response = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages)
            .visibility_timeout(visibility_timeout.as_secs() as i32)
            .wait_time_seconds(0)
            .send()
            .await
            .map_err(|e| QueueError::Receive(e.to_string()))?;

        let mut received = Vec::new();
        for message in response.messages.unwrap_or_default() {
            match (message.body, message.receipt_handle) {
                (Some(body), Some(receipt_handle)) => received.push(QueueMessage {
                    body,
                    receipt_handle,
                }),
                _ => warn!("Dropping SQS message without body or receipt handle"),
            }
        }

        Ok(received)
    }

    async fn acknowledge(&self, receipt_handle: &str) -> Result<()> {
        debug!("SQS DELETE: {}", receipt_handle);

        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| QueueError::Acknowledge(e.to_string()))?;

        Ok(())
    }
}
