//! Client configuration.

use crate::error::{Result, VidJobError};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/videos";

/// Configuration shared by all three pipeline stages.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the job-creation endpoint. Status and content URLs are
    /// derived from it (`{base_url}/{id}`, `{base_url}/{id}/content`).
    pub base_url: String,
    /// Bearer credential sent on every call.
    pub api_key: String,
    /// Fixed sleep between status polls.
    pub poll_interval: Duration,
    /// Wall-clock deadline for the whole polling phase.
    pub max_wait: Duration,
    /// Buffer capacity for the chunked artifact write.
    pub chunk_size: usize,
}

impl ClientConfig {
    /// Creates a new `ClientConfigBuilder`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    base_url: String,
    api_key: Option<String>,
    poll_interval: Duration,
    max_wait: Duration,
    chunk_size: usize,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            poll_interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(600), // generation usually takes minutes
            chunk_size: 8192,
        }
    }
}

impl ClientConfigBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL of the job-creation endpoint.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the API key. Falls back to `OPENAI_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the polling interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the maximum time to wait for the job to finish.
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Sets the write-buffer capacity used while streaming the artifact.
    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes;
        self
    }

    /// Builds the config, resolving the API key.
    pub fn build(self) -> Result<ClientConfig> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                VidJobError::Auth("OPENAI_API_KEY not set and no API key provided".into())
            })?;

        Ok(ClientConfig {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            api_key,
            poll_interval: self.poll_interval,
            max_wait: self.max_wait,
            chunk_size: self.chunk_size,
        })
    }
}
