//! Akamai NetStorage destination backend.
//!
//! Speaks the NetStorage usage API over HTTP: one request per operation,
//! authenticated with version-5 request signing (HMAC-SHA256 over the
//! auth-data header, the request path and the action header).

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use hmac::{Hmac, Mac};
use reqwest::{Method, StatusCode};
use sha2::Sha256;
use tracing::{debug, info};

use super::StorageBackend;
use crate::error::StorageError;
use crate::{Error, Result};

const ACTION_UPLOAD: &str = "version=1&action=upload";
const ACTION_DOWNLOAD: &str = "version=1&action=download";
const ACTION_DELETE: &str = "version=1&action=delete";
const ACTION_STAT: &str = "version=1&action=stat&format=xml";

/// NetStorage backend configuration
#[derive(Debug, Clone)]
pub struct NetStorageConfig {
    /// NetStorage API hostname
    pub hostname: String,
    /// Upload account key name
    pub user: String,
    /// Upload account key
    pub key: String,
    /// Use HTTPS for API requests
    pub ssl: bool,
}

/// NetStorage storage backend
pub struct NetStorageBackend {
    client: reqwest::Client,
    config: NetStorageConfig,
}

impl NetStorageBackend {
    /// Create a new NetStorage backend
    pub fn new(config: NetStorageConfig) -> Result<Self> {
        let client = reqwest::Client::builder().build().map_err(|e| {
            Error::Storage(StorageError::Backend(format!(
                "Failed to create NetStorage client: {}",
                e
            )))
        })?;

        info!("Created NetStorage backend for host: {}", config.hostname);

        Ok(Self { client, config })
    }

    fn acs_path(key: &str) -> String {
        format!("/{}", key.trim_start_matches('/'))
    }

    fn url(&self, path: &str) -> String {
        let scheme = if self.config.ssl { "https" } else { "http" };
        format!("{}://{}{}", scheme, self.config.hostname, path)
    }

    fn auth_data(&self) -> String {
        format!(
            "5, 0.0.0.0, 0.0.0.0, {}, {}, {}",
            chrono::Utc::now().timestamp(),
            rand::random::<u32>(),
            self.config.user
        )
    }

    async fn request(
        &self,
        method: Method,
        key: &str,
        action: &str,
        body: Option<Bytes>,
    ) -> Result<reqwest::Response> {
        let path = Self::acs_path(key);
        let auth_data = self.auth_data();
        let auth_sign = sign_request(&self.config.key, &auth_data, &path, action)?;

        let mut request = self
            .client
            .request(method, self.url(&path))
            .header("X-Akamai-ACS-Action", action)
            .header("X-Akamai-ACS-Auth-Data", auth_data)
            .header("X-Akamai-ACS-Auth-Sign", auth_sign);

        if let Some(body) = body {
            request = request.body(body);
        }

        request.send().await.map_err(|e| {
            Error::Storage(StorageError::Backend(format!(
                "NetStorage request failed: {}",
                e
            )))
        })
    }

    fn check_status(key: &str, status: StatusCode) -> Result<()> {
        match status {
            StatusCode::NOT_FOUND => Err(Error::Storage(StorageError::NotFound(key.to_string()))),
            StatusCode::FORBIDDEN => Err(Error::Storage(StorageError::PermissionDenied(
                key.to_string(),
            ))),
            s if s.is_success() => Ok(()),
            s => Err(Error::Storage(StorageError::Backend(format!(
                "NetStorage returned {} for {}",
                s, key
            )))),
        }
    }
}

/// Sign one request: HMAC-SHA256 over the auth-data header, the request
/// path and the action header, base64-encoded.
fn sign_request(key: &str, auth_data: &str, path: &str, action: &str) -> Result<String> {
    let message = format!("{}{}\nx-akamai-acs-action:{}\n", auth_data, path, action);

    let mut mac = Hmac::<Sha256>::new_from_slice(key.as_bytes()).map_err(|_| {
        Error::Storage(StorageError::Backend(
            "Invalid NetStorage signing key".to_string(),
        ))
    })?;
    mac.update(message.as_bytes());

    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

#[async_trait]
impl StorageBackend for NetStorageBackend {
    async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        debug!("NS UPLOAD: {}", key);

        let response = self
            .request(Method::PUT, key, ACTION_UPLOAD, Some(data))
            .await?;
        Self::check_status(key, response.status())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        debug!("NS DOWNLOAD: {}", key);

        let response = self
            .request(Method::GET, key, ACTION_DOWNLOAD, None)
            .await?;
        Self::check_status(key, response.status())?;

        response.bytes().await.map_err(|e| {
            Error::Storage(StorageError::Backend(format!(
                "Failed to read NetStorage response: {}",
                e
            )))
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        debug!("NS DELETE: {}", key);

        let response = self
            .request(Method::POST, key, ACTION_DELETE, None)
            .await?;
        Self::check_status(key, response.status())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        debug!("NS STAT: {}", key);

        let response = self.request(Method::GET, key, ACTION_STAT, None).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                Self::check_status(key, status)?;
                Ok(true)
            }
        }
    }
}
