//! Sync worker end-to-end tests over the in-memory queue and backends.

use std::sync::Arc;

use bytes::Bytes;
use tempfile::TempDir;

use edge_sync_core::staging::StagingArea;
use edge_sync_core::{
    encode_batch, ChangeQueue, MemoryBackend, MemoryQueue, StorageBackend, SyncEngine,
};

use super::helpers::{created_record, removed_record, seed, test_config, FlakyDestination};

const HIDDEN: u64 = 3600;
const IMMEDIATE: u64 = 0;

async fn enqueue(queue: &MemoryQueue, records: &[edge_sync_core::ChangeRecord]) {
    queue
        .send(encode_batch(records).unwrap(), "g1")
        .await
        .unwrap();
}

#[tokio::test]
async fn created_record_is_fetched_staged_uploaded_and_acknowledged() {
    let staging_dir = TempDir::new().unwrap();
    let config = test_config(staging_dir.path(), HIDDEN);

    let queue = Arc::new(MemoryQueue::new());
    let source = Arc::new(MemoryBackend::new());
    let destination = Arc::new(MemoryBackend::new());

    seed(&source, "a/f.txt", "object body").await;
    enqueue(&queue, &[created_record("a/f.txt")]).await;

    let engine = SyncEngine::new(&config, queue.clone(), source, destination.clone());
    let report = engine.run().await.unwrap();

    assert_eq!(
        destination.get("7001/a/f.txt").await.unwrap(),
        Bytes::from("object body")
    );
    let staging = StagingArea::new(staging_dir.path().to_path_buf());
    assert!(!staging.contains("a/f.txt").await);
    assert_eq!(queue.message_count(), 0);

    assert_eq!(report.polls, 2);
    assert_eq!(report.messages_acknowledged, 1);
    assert_eq!(report.records_synced, 1);
    assert_eq!(report.records_failed, 0);
    assert_eq!(engine.metrics().report().bytes_uploaded, 11);
}

#[tokio::test]
async fn removed_record_deletes_the_destination_copy() {
    let staging_dir = TempDir::new().unwrap();
    let config = test_config(staging_dir.path(), HIDDEN);

    let queue = Arc::new(MemoryQueue::new());
    let destination = Arc::new(MemoryBackend::new());
    seed(&destination, "7001/a/f.txt", "stale copy").await;
    enqueue(&queue, &[removed_record("a/f.txt")]).await;

    let engine = SyncEngine::new(
        &config,
        queue.clone(),
        Arc::new(MemoryBackend::new()),
        destination.clone(),
    );
    engine.run().await.unwrap();

    assert!(!destination.exists("7001/a/f.txt").await.unwrap());
    assert_eq!(queue.message_count(), 0);
}

#[tokio::test]
async fn deleting_an_absent_destination_object_still_succeeds() {
    let staging_dir = TempDir::new().unwrap();
    let config = test_config(staging_dir.path(), HIDDEN);

    let queue = Arc::new(MemoryQueue::new());
    enqueue(&queue, &[removed_record("a/f.txt")]).await;

    let engine = SyncEngine::new(
        &config,
        queue.clone(),
        Arc::new(MemoryBackend::new()),
        Arc::new(MemoryBackend::new()),
    );
    let report = engine.run().await.unwrap();

    assert_eq!(queue.message_count(), 0);
    assert_eq!(report.messages_acknowledged, 1);
    assert_eq!(report.records_synced, 1);

    let staging = StagingArea::new(staging_dir.path().to_path_buf());
    assert!(!staging.contains("a/f.txt").await);
}

#[tokio::test]
async fn two_messages_then_empty_queue_ends_the_pass() {
    let staging_dir = TempDir::new().unwrap();
    let config = test_config(staging_dir.path(), HIDDEN);

    let queue = Arc::new(MemoryQueue::new());
    let source = Arc::new(MemoryBackend::new());
    let destination = Arc::new(MemoryBackend::new());

    seed(&source, "a/f.txt", "first").await;
    seed(&source, "b/g.txt", "second").await;
    enqueue(&queue, &[created_record("a/f.txt")]).await;
    enqueue(&queue, &[created_record("b/g.txt")]).await;

    let engine = SyncEngine::new(&config, queue.clone(), source, destination.clone());
    let report = engine.run().await.unwrap();

    assert_eq!(report.polls, 2);
    assert_eq!(report.messages_acknowledged, 2);
    assert_eq!(report.records_synced, 2);
    assert!(destination.exists("7001/a/f.txt").await.unwrap());
    assert!(destination.exists("7001/b/g.txt").await.unwrap());
    assert_eq!(queue.message_count(), 0);
}

#[tokio::test]
async fn early_failure_is_not_masked_by_a_later_success() {
    let staging_dir = TempDir::new().unwrap();
    let config = test_config(staging_dir.path(), HIDDEN);

    let queue = Arc::new(MemoryQueue::new());
    let source = Arc::new(MemoryBackend::new());
    let destination = Arc::new(MemoryBackend::new());

    // First record's object is missing from the source, second is present.
    seed(&source, "present.txt", "content").await;
    enqueue(
        &queue,
        &[created_record("missing.txt"), created_record("present.txt")],
    )
    .await;

    let engine = SyncEngine::new(&config, queue.clone(), source, destination.clone());
    let report = engine.run().await.unwrap();

    assert_eq!(queue.message_count(), 1);
    assert_eq!(report.messages_acknowledged, 0);
    assert_eq!(report.messages_requeued, 1);
    assert_eq!(report.records_failed, 1);
    assert_eq!(report.records_synced, 1);
    assert!(destination.exists("7001/present.txt").await.unwrap());
}

#[tokio::test]
async fn failed_message_is_redelivered_and_acknowledged_on_a_later_poll() {
    let staging_dir = TempDir::new().unwrap();
    let config = test_config(staging_dir.path(), IMMEDIATE);

    let queue = Arc::new(MemoryQueue::new());
    let source = Arc::new(MemoryBackend::new());
    let inner_destination = Arc::new(MemoryBackend::new());
    let destination = Arc::new(FlakyDestination::new(inner_destination.clone(), 1));

    seed(&source, "a/f.txt", "content").await;
    enqueue(&queue, &[created_record("a/f.txt")]).await;

    let engine = SyncEngine::new(&config, queue.clone(), source, destination);
    let report = engine.run().await.unwrap();

    assert_eq!(report.messages_requeued, 1);
    assert_eq!(report.messages_acknowledged, 1);
    assert_eq!(queue.message_count(), 0);
    assert!(inner_destination.exists("7001/a/f.txt").await.unwrap());
}

#[tokio::test]
async fn staged_copies_are_removed_for_every_record_of_a_batch() {
    let staging_dir = TempDir::new().unwrap();
    let config = test_config(staging_dir.path(), HIDDEN);

    let queue = Arc::new(MemoryQueue::new());
    let source = Arc::new(MemoryBackend::new());
    let destination = Arc::new(MemoryBackend::new());

    seed(&source, "a/f1.txt", "first").await;
    seed(&source, "a/f2.txt", "second").await;
    enqueue(
        &queue,
        &[created_record("a/f1.txt"), created_record("a/f2.txt")],
    )
    .await;

    let engine = SyncEngine::new(&config, queue.clone(), source, destination.clone());
    engine.run().await.unwrap();

    let staging = StagingArea::new(staging_dir.path().to_path_buf());
    assert!(!staging.contains("a/f1.txt").await);
    assert!(!staging.contains("a/f2.txt").await);
    assert!(destination.exists("7001/a/f1.txt").await.unwrap());
    assert!(destination.exists("7001/a/f2.txt").await.unwrap());
    assert_eq!(queue.message_count(), 0);
}

#[tokio::test]
async fn undecodable_message_is_left_for_redelivery() {
    let staging_dir = TempDir::new().unwrap();
    let config = test_config(staging_dir.path(), HIDDEN);

    let queue = Arc::new(MemoryQueue::new());
    queue.send("not json".to_string(), "g1").await.unwrap();

    let engine = SyncEngine::new(
        &config,
        queue.clone(),
        Arc::new(MemoryBackend::new()),
        Arc::new(MemoryBackend::new()),
    );
    let report = engine.run().await.unwrap();

    assert_eq!(queue.message_count(), 1);
    assert_eq!(report.messages_requeued, 1);
    assert_eq!(report.messages_acknowledged, 0);
}

#[tokio::test]
async fn empty_record_batch_message_is_acknowledged() {
    let staging_dir = TempDir::new().unwrap();
    let config = test_config(staging_dir.path(), HIDDEN);

    let queue = Arc::new(MemoryQueue::new());
    queue.send("[]".to_string(), "g1").await.unwrap();

    let engine = SyncEngine::new(
        &config,
        queue.clone(),
        Arc::new(MemoryBackend::new()),
        Arc::new(MemoryBackend::new()),
    );
    let report = engine.run().await.unwrap();

    assert_eq!(queue.message_count(), 0);
    assert_eq!(report.messages_acknowledged, 1);
    assert_eq!(report.records_synced, 0);
}
