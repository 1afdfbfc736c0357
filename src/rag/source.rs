//! DocumentSource trait — where collection JSON comes from.
//!
//! Paths are relative to a base: an `http(s)://` URL served by the web app,
//! or a local directory.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::error::RagError;
use crate::core::config::RagSettings;

#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetches the raw text at `path`. A missing document is `RagError::NotFound`.
    async fn fetch_text(&self, path: &str) -> Result<String, RagError>;

    /// Human-readable location, used in logs.
    fn describe(&self) -> String;
}

pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RagError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RagError::Unknown(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch_text(&self, path: &str) -> Result<String, RagError> {
        let url = self.url_for(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RagError::network(&url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RagError::NotFound(url));
        }
        if !status.is_success() {
            return Err(RagError::network(&url, format!("HTTP {}", status)));
        }

        response.text().await.map_err(|e| RagError::network(&url, e))
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentSource for FileSource {
    async fn fetch_text(&self, path: &str) -> Result<String, RagError> {
        let full_path = self.root.join(path.trim_start_matches('/'));
        match tokio::fs::read_to_string(&full_path).await {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(RagError::NotFound(full_path.display().to_string()))
            }
            Err(err) if err.kind() == std::io::ErrorKind::InvalidData => {
                Err(RagError::parse(&full_path.display().to_string(), err))
            }
            Err(err) => Err(RagError::network(&full_path.display().to_string(), err)),
        }
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Picks HTTP or filesystem access from `rag.data_source`.
pub fn source_from_settings(settings: &RagSettings) -> Result<Arc<dyn DocumentSource>, RagError> {
    let base = settings.data_source.trim();
    if base.starts_with("http://") || base.starts_with("https://") {
        let timeout = Duration::from_secs(settings.request_timeout_secs);
        Ok(Arc::new(HttpSource::new(base, timeout)?))
    } else {
        Ok(Arc::new(FileSource::new(base)))
    }
}
