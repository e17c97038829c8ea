use std::sync::Arc;

use anyhow::Result;
use edge_sync_core::{IngestAdapter, NotificationEvent, SqsQueue};
use tracing::info;

pub async fn run(config_path: Option<&str>, file: &str) -> Result<()> {
    let config = super::load_config(config_path).await?;

    info!("Loading notification batch from: {}", file);
    let content = tokio::fs::read_to_string(file).await?;
    let event: NotificationEvent = serde_json::from_str(&content)?;

    let queue = Arc::new(SqsQueue::new(config.region.clone(), config.queue_url.clone()).await);
    let adapter = IngestAdapter::new(queue);

    let response = adapter.handle(&event).await;
    println!("{}", serde_json::to_string(&response)?);

    Ok(())
}
