use async_trait::async_trait;
use thiserror::Error;

/// A transport-level failure while fetching the reference dataset.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fetches the raw reference-dataset document.
///
/// The trait exists so tests can substitute an in-memory fetcher for the
/// real HTTP client. Timeout and retry policy are left to the transport;
/// the store itself fails once and lets the caller retry.
#[async_trait]
pub trait DatasetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// [`DatasetFetcher`] backed by a shared [`reqwest::Client`].
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatasetFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|err| FetchError::new(err.to_string()))?;

        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError::new(err.to_string()))?;

        Ok(body.to_vec())
    }
}
