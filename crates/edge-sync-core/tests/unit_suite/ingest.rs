//! Ingest adapter unit tests.

use std::sync::Arc;

use edge_sync_core::{decode_batch, EventKind, IngestAdapter, MemoryQueue};

use super::helpers::{notification_event, FailingQueue};

#[tokio::test]
async fn batch_becomes_exactly_one_message_with_field_fidelity() {
    let queue = Arc::new(MemoryQueue::new());
    let adapter = IngestAdapter::new(queue.clone());

    let event = notification_event(&[
        ("ObjectCreated:Put", "a/f.txt"),
        ("ObjectCreated:Put", "b/g.txt"),
    ]);
    let response = adapter.handle(&event).await;

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, "Success, 2/2 added to queue!");
    assert_eq!(queue.message_count(), 1);

    let records = decode_batch(&queue.bodies()[0]).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].key, "a/f.txt");
    assert_eq!(records[0].bucket, "source-bucket");
    assert_eq!(records[0].etag, "e1");
    assert_eq!(records[0].sequencer, "0055AED6DCD90281E5");
    assert_eq!(records[1].key, "b/g.txt");
}

#[tokio::test]
async fn mixed_event_kinds_survive_normalization() {
    let queue = Arc::new(MemoryQueue::new());
    let adapter = IngestAdapter::new(queue.clone());

    let event = notification_event(&[
        ("ObjectCreated:Put", "a/f.txt"),
        ("ObjectRemoved:Delete", "a/old.txt"),
    ]);
    adapter.handle(&event).await;

    let records = decode_batch(&queue.bodies()[0]).unwrap();
    assert_eq!(records[0].kind(), EventKind::Created);
    assert_eq!(records[1].kind(), EventKind::Removed);
}

#[tokio::test]
async fn empty_batch_still_enqueues_an_empty_array() {
    let queue = Arc::new(MemoryQueue::new());
    let adapter = IngestAdapter::new(queue.clone());

    let response = adapter.handle(&notification_event(&[])).await;

    assert_eq!(response.status_code, 500);
    assert_eq!(response.body, "Error, 0/0 added to queue!");
    assert_eq!(queue.message_count(), 1);
    assert_eq!(queue.bodies()[0], "[]");
}

#[tokio::test]
async fn enqueue_failure_reports_500() {
    let adapter = IngestAdapter::new(Arc::new(FailingQueue));

    let event = notification_event(&[("ObjectCreated:Put", "a/f.txt")]);
    let response = adapter.handle(&event).await;

    assert_eq!(response.status_code, 500);
    assert_eq!(response.body, "Error, 1/1 added to queue!");
}

#[tokio::test]
async fn group_key_is_the_current_wall_clock_second() {
    let queue = Arc::new(MemoryQueue::new());
    let adapter = IngestAdapter::new(queue.clone());

    adapter
        .handle(&notification_event(&[("ObjectCreated:Put", "a/f.txt")]))
        .await;

    let group_id = &queue.group_ids()[0];
    let epoch_secs: i64 = group_id.parse().expect("group id should be epoch seconds");
    assert!(epoch_secs > 1_500_000_000);
}

#[tokio::test]
async fn response_serializes_with_the_trigger_field_names() {
    let queue = Arc::new(MemoryQueue::new());
    let adapter = IngestAdapter::new(queue);

    let response = adapter
        .handle(&notification_event(&[("ObjectCreated:Put", "a/f.txt")]))
        .await;

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["statusCode"], 200);
    assert_eq!(value["body"], "Success, 1/1 added to queue!");
}
