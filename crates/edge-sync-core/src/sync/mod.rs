//! Sync worker: drains the change queue into the destination backend.

pub mod engine;

pub use engine::{SyncEngine, SyncReport};
