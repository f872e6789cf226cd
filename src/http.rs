//! Upstream collaborators: page/JSON retrieval and file transfer.
//!
//! The core never talks to `reqwest` directly; it goes through the `Fetch`
//! and `Save` traits so tests can substitute in-memory fixtures.

use std::future::Future;
use std::path::Path;

use anyhow::Context;
use futures_util::StreamExt;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP-level failure (4xx/5xx): the document does not exist upstream.
    #[error("{url} not found upstream (HTTP {status})")]
    NotFound { url: String, status: u16 },

    /// Connection-level failure: DNS, TLS, timeout, …
    #[error("transport failure for {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Retrieves a document as text.
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Transfers a stream URL to a local path, returning the byte count.
pub trait Save {
    fn save(&self, url: &str, dest: &Path) -> impl Future<Output = anyhow::Result<u64>> + Send;
}

/// Shared reqwest-backed implementation of both collaborators.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent);

        if let Some(proxy) = &config.proxy {
            if !proxy.is_empty() {
                builder = builder.proxy(reqwest::Proxy::all(proxy)?);
            }
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Fetch for HttpClient {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::NotFound {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }
}

impl Save for HttpClient {
    async fn save(&self, url: &str, dest: &Path) -> anyhow::Result<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("download request for {url}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("download of {url} returned HTTP {status}");
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("create {}", dest.display()))?;

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.with_context(|| format!("read body of {url}"))?;
            file.write_all(&chunk)
                .await
                .with_context(|| format!("write {}", dest.display()))?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::info!("Saved {url} to {} ({written} bytes)", dest.display());
        Ok(written)
    }
}
