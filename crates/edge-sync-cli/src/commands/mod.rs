pub mod ingest;
pub mod worker;

use anyhow::Result;
use edge_sync_core::SyncConfig;

/// Load configuration from a YAML file, or from the environment when no
/// file is given.
pub(crate) async fn load_config(path: Option<&str>) -> Result<SyncConfig> {
    match path {
        Some(path) => {
            let content = tokio::fs::read_to_string(path).await?;
            Ok(SyncConfig::from_yaml(&content)?)
        }
        None => Ok(SyncConfig::from_env()?),
    }
}
