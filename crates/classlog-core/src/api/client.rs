//! Fetchers for the site's static JSON files.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::FetchError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Source of the site's files, addressed by paths relative to the site root
/// (e.g. `data/record/records_index.json`).
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>>;
}

/// Fetch a file and deserialize it as JSON.
pub async fn fetch_json<T: DeserializeOwned>(fetcher: &dyn Fetcher, path: &str) -> Result<T> {
    let bytes = fetcher.fetch(path).await?;
    let value = serde_json::from_slice(&bytes).map_err(|source| FetchError::InvalidJson {
        path: path.to_string(),
        source,
    })?;
    Ok(value)
}

/// Fetches files from a web server.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
}

impl HttpFetcher {
    pub fn new(base_url: &str) -> Result<Self> {
        // Url::join drops the last path segment unless it ends with a slash
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .with_context(|| format!("Invalid base URL: {}", base_url))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(path: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(FetchError::from_status(path, status, &body).into())
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("Invalid data path: {}", path))?;

        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(FetchError::from)
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(path, response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(FetchError::from)
            .with_context(|| format!("Failed to read response body from {}", url))?;

        debug!(%url, bytes = bytes.len(), "Fetched");
        Ok(bytes.to_vec())
    }
}

/// Fetches files from a local copy of the site.
#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Fetcher for DirFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.root.join(path);
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FetchError::NotFound(path.to_string()).into())
            }
            Err(source) => Err(FetchError::Io { path: full, source }.into()),
        }
    }
}

/// In-memory site. Counts fetches and can delay individual paths so that
/// concurrent fetches complete out of order.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    files: HashMap<String, Vec<u8>>,
    delays: HashMap<String, Duration>,
    fetch_count: AtomicUsize,
    fetched: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, path: &str, value: &serde_json::Value) -> Self {
        self.files.insert(path.to_string(), value.to_string().into_bytes());
        self
    }

    pub fn with_raw(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.to_string(), bytes.into());
        self
    }

    pub fn with_delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_string(), delay);
        self
    }

    /// Total number of fetch calls, including failed ones.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Paths in the order their fetches completed.
    pub fn completed(&self) -> Vec<String> {
        self.fetched.lock().map(|f| f.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(path) {
            tokio::time::sleep(*delay).await;
        }
        let bytes = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))?;
        if let Ok(mut fetched) = self.fetched.lock() {
            fetched.push(path.to_string());
        }
        Ok(bytes)
    }
}
