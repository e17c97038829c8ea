//! Configuration for the sync worker and ingest adapter.
//!
//! Configuration is assembled once at startup, either from the environment
//! (the deployment contract) or from a YAML file, and passed into the
//! components explicitly.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// AWS region for the queue and source bucket
    #[serde(default)]
    pub region: Option<String>,

    /// URL of the change queue
    pub queue_url: String,

    /// NetStorage CP code, the namespace prefix on the destination
    pub cpcode: String,

    /// Source bucket name
    pub bucket: String,

    /// NetStorage credentials bundle
    pub netstorage: NetStorageCredentials,

    /// Worker tuning options
    #[serde(default)]
    pub worker: WorkerOptions,
}

/// NetStorage credentials.
///
/// Deployed as a single JSON-encoded secret with `NS_HOSTNAME`, `NS_USER`
/// and `NS_KEY` sub-fields; the aliases accept that form directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetStorageCredentials {
    /// NetStorage API hostname
    #[serde(alias = "NS_HOSTNAME")]
    pub hostname: String,

    /// Upload account key name
    #[serde(alias = "NS_USER")]
    pub user: String,

    /// Upload account key
    #[serde(alias = "NS_KEY")]
    pub key: String,
}

/// Worker tuning options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerOptions {
    /// Maximum messages fetched per poll (SQS allows 1-10)
    #[serde(default = "default_batch_size")]
    pub batch_size: i32,

    /// Seconds a received message stays hidden from other consumers
    #[serde(default = "default_visibility_timeout_secs")]
    pub visibility_timeout_secs: u64,

    /// Seconds slept between polls of a non-empty queue
    #[serde(default = "default_poll_delay_secs")]
    pub poll_delay_secs: u64,

    /// Directory holding staged copies of fetched objects
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            visibility_timeout_secs: default_visibility_timeout_secs(),
            poll_delay_secs: default_poll_delay_secs(),
            staging_dir: default_staging_dir(),
        }
    }
}

fn default_batch_size() -> i32 {
    5
}

fn default_visibility_timeout_secs() -> u64 {
    30
}

fn default_poll_delay_secs() -> u64 {
    20
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("./staging")
}

impl WorkerOptions {
    /// Visibility timeout as a duration
    pub fn visibility_timeout(&self) -> Duration {
        Duration::from_secs(self.visibility_timeout_secs)
    }

    /// Inter-poll delay as a duration
    pub fn poll_delay(&self) -> Duration {
        Duration::from_secs(self.poll_delay_secs)
    }
}

impl SyncConfig {
    /// Build the configuration from the deployment environment.
    ///
    /// Expects `REGION`, `QUEUE_URL`, `CPCODE`, `BUCKET` and `NS_SECRET`
    /// (a JSON bundle with `NS_HOSTNAME`, `NS_USER` and `NS_KEY`).
    pub fn from_env() -> Result<Self> {
        let config = Self {
            region: Some(require_env("REGION")?),
            queue_url: require_env("QUEUE_URL")?,
            cpcode: require_env("CPCODE")?,
            bucket: require_env("BUCKET")?,
            netstorage: NetStorageCredentials::from_json(&require_env("NS_SECRET")?)?,
            worker: WorkerOptions::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse the configuration from a YAML document.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.queue_url.is_empty() {
            return Err(Error::Config("queue_url must not be empty".to_string()));
        }
        if self.cpcode.is_empty() {
            return Err(Error::Config("cpcode must not be empty".to_string()));
        }
        if self.bucket.is_empty() {
            return Err(Error::Config("bucket must not be empty".to_string()));
        }
        if self.netstorage.hostname.is_empty()
            || self.netstorage.user.is_empty()
            || self.netstorage.key.is_empty()
        {
            return Err(Error::Config(
                "NetStorage credentials must include hostname, user and key".to_string(),
            ));
        }
        if !(1..=10).contains(&self.worker.batch_size) {
            return Err(Error::Config(format!(
                "batch_size must be between 1 and 10, got {}",
                self.worker.batch_size
            )));
        }
        if self.worker.visibility_timeout_secs == 0 {
            return Err(Error::Config(
                "visibility_timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl NetStorageCredentials {
    /// Parse the JSON-encoded credentials bundle.
    pub fn from_json(secret: &str) -> Result<Self> {
        serde_json::from_str(secret)
            .map_err(|e| Error::Config(format!("Invalid NS_SECRET bundle: {}", e)))
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::Config(format!("{} must be set", name)))
}
