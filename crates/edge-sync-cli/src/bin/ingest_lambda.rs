use std::sync::Arc;

use edge_sync_core::{IngestAdapter, NotificationEvent, SqsQueue};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let notification: NotificationEvent = serde_json::from_value(event.payload)
        .map_err(|error| Error::from(format!("invalid notification event: {error}")))?;

    let queue_url =
        std::env::var("QUEUE_URL").map_err(|_| Error::from("QUEUE_URL must be configured"))?;
    let region = std::env::var("REGION").ok();

    let queue = Arc::new(SqsQueue::new(region, queue_url).await);
    let adapter = IngestAdapter::new(queue);

    let response = adapter.handle(&notification).await;
    serde_json::to_value(&response)
        .map_err(|error| Error::from(format!("failed to serialize response: {error}")))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
