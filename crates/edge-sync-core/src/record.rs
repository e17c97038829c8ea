//! Change records and their wire format.
//!
//! A change record is the normalized form of one S3 event notification. A
//! queue message body is a JSON array of change records; field names on the
//! wire (`eventName`, `eTag`) are carried over from the source notification
//! verbatim.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Kind of object mutation a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Object was created or overwritten
    Created,
    /// Object was removed
    Removed,
}

impl EventKind {
    /// Classify a raw S3 event name.
    ///
    /// Event names look like `ObjectCreated:Put` or `ObjectRemoved:Delete`;
    /// anything that is not a removal is treated as a create/overwrite.
    pub fn from_event_name(name: &str) -> Self {
        if name.contains("ObjectRemoved") {
            EventKind::Removed
        } else {
            EventKind::Created
        }
    }
}

/// Normalized representation of one storage-change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Raw event name from the source notification
    #[serde(rename = "eventName")]
    pub event_name: String,

    /// Source bucket name
    pub bucket: String,

    /// Object key, also used as the relative staging and destination path
    pub key: String,

    /// Opaque integrity token from the source provider
    pub etag: String,

    /// Monotonic-ish ordering hint from the source provider
    pub sequencer: String,
}

impl ChangeRecord {
    /// Kind of mutation this record describes.
    pub fn kind(&self) -> EventKind {
        EventKind::from_event_name(&self.event_name)
    }

    /// Normalize a raw notification into a change record.
    pub fn from_notification(record: &NotificationRecord) -> Self {
        Self {
            event_name: record.event_name.clone(),
            bucket: record.s3.bucket.name.clone(),
            key: record.s3.object.key.clone(),
            etag: record.s3.object.e_tag.clone(),
            sequencer: record.s3.object.sequencer.clone(),
        }
    }
}

/// Serialize a batch of records into a queue message body.
pub fn encode_batch(records: &[ChangeRecord]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}

/// Decode a queue message body into an ordered list of records.
pub fn decode_batch(body: &str) -> Result<Vec<ChangeRecord>> {
    Ok(serde_json::from_str(body)?)
}

/// A batch of raw S3 event notifications, as delivered by the trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<NotificationRecord>,
}

/// One raw S3 event notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    #[serde(rename = "eventName")]
    pub event_name: String,

    pub s3: S3Entity,
}

/// Nested storage identifiers of a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketEntity,
    pub object: ObjectEntity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketEntity {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectEntity {
    pub key: String,

    #[serde(rename = "eTag")]
    pub e_tag: String,

    pub sequencer: String,
}
