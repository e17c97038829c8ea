//! Edge Sync Core Library
//!
//! This crate provides the core functionality for mirroring S3 object
//! mutations (create/delete) to an Akamai NetStorage destination through
//! an SQS queue.

pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod queue;
pub mod record;
pub mod staging;
pub mod storage;
pub mod sync;

pub use config::{NetStorageCredentials, SyncConfig, WorkerOptions};
pub use error::{Error, QueueError, Result, StorageError};
pub use ingest::{IngestAdapter, IngestResponse};
pub use metrics::{MetricsReport, SyncMetrics};
pub use queue::{ChangeQueue, MemoryQueue, QueueMessage, SqsQueue};
pub use record::{
    decode_batch, encode_batch, ChangeRecord, EventKind, NotificationEvent, NotificationRecord,
};
pub use staging::StagingArea;
pub use storage::{
    MemoryBackend, NetStorageBackend, NetStorageConfig, S3Backend, S3Config, StorageBackend,
};
pub use sync::{SyncEngine, SyncReport};
