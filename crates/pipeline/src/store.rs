//! Object store client
//!
//! The store is a black box with its own consistency guarantees: local
//! file in, stable public URL out. Overwrite and invalidation semantics
//! live on the store side.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

use narrator_config::PublishConfig;

use crate::PipelineError;

/// Durable object store seam
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload a local file, returning its stable public URL
    async fn upload(&self, path: &Path) -> Result<String, PipelineError>;
}

/// HTTP object store speaking a Cloudinary-style upload API
pub struct HttpObjectStore {
    client: Client,
    endpoint: String,
    folder: String,
}

impl HttpObjectStore {
    pub fn new(config: &PublishConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            folder: config.folder.clone(),
        })
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn upload(&self, path: &Path) -> Result<String, PipelineError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "track".to_string());
        let bytes = tokio::fs::read(path).await?;

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("folder", self.folder.clone())
            .text("overwrite", "true")
            .text("invalidate", "true");

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::Http(format!("upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(PipelineError::Http(format!(
                "store error ({}): {}",
                status, error_text
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PipelineError::Http(format!("failed to parse store response: {}", e)))?;

        body.get("secure_url")
            .and_then(|v| v.as_str())
            .map(|url| url.to_string())
            .ok_or_else(|| {
                PipelineError::Http("store response is missing secure_url".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_creation() {
        let store = HttpObjectStore::new(&PublishConfig::default()).unwrap();
        assert_eq!(store.folder, "tts_audio");
    }
}
