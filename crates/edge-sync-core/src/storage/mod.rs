//! Storage backend abstraction and implementations.
//!
//! Two storage parties take part in a sync pass:
//!
//! - **S3**: the source bucket, read via object_store
//! - **NetStorage**: the destination, written via the NetStorage usage API
//! - **Memory**: in-memory backend (for testing)

mod backend;
mod memory;
mod netstorage;
mod s3;

pub use backend::StorageBackend;
pub use memory::MemoryBackend;
pub use netstorage::{NetStorageBackend, NetStorageConfig};
pub use s3::{S3Backend, S3Config};

use std::sync::Arc;

use crate::{Result, SyncConfig};

/// Create the source backend for the configured bucket.
pub fn create_source(config: &SyncConfig) -> Result<Arc<dyn StorageBackend>> {
    let s3_config = S3Config {
        bucket: config.bucket.clone(),
        region: config.region.clone(),
        ..Default::default()
    };
    Ok(Arc::new(S3Backend::new(s3_config)?))
}

/// Create the destination backend from the configured credentials.
pub fn create_destination(config: &SyncConfig) -> Result<Arc<dyn StorageBackend>> {
    let ns_config = NetStorageConfig {
        hostname: config.netstorage.hostname.clone(),
        user: config.netstorage.user.clone(),
        key: config.netstorage.key.clone(),
        ssl: false,
    };
    Ok(Arc::new(NetStorageBackend::new(ns_config)?))
}
