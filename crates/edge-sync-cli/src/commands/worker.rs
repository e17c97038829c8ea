use std::sync::Arc;

use anyhow::Result;
use edge_sync_core::{storage, SqsQueue, SyncEngine};
use tracing::{error, info};

pub async fn run(config_path: Option<&str>) -> Result<()> {
    let config = super::load_config(config_path).await?;

    info!("S3 to NetStorage sync started");

    let queue = Arc::new(SqsQueue::new(config.region.clone(), config.queue_url.clone()).await);
    let source = storage::create_source(&config)?;
    let destination = storage::create_destination(&config)?;

    let engine = SyncEngine::new(&config, queue, source, destination);

    // A failed pass is not fatal: unacknowledged messages become visible
    // again after their visibility timeout and are retried on the next run.
    match engine.run().await {
        Ok(report) => {
            let metrics = engine.metrics().report();
            info!(
                "Sync pass complete: {} records synced, {} failed, {} messages acknowledged, {} left for redelivery",
                report.records_synced,
                report.records_failed,
                report.messages_acknowledged,
                report.messages_requeued
            );
            info!(
                "Uploaded {} bytes in {:.1}s",
                metrics.bytes_uploaded, metrics.elapsed_secs
            );
        }
        Err(e) => error!("Error processing the queue: {}", e),
    }

    info!("Exiting");
    Ok(())
}
