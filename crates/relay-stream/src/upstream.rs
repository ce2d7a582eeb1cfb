use std::pin::Pin;
use std::time::Duration;

use futures::TryStreamExt as _;
use tracing::debug;

use crate::errors::{RelayError, UpstreamError};

/// Ordered byte chunks read from a live upstream connection.
pub type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, UpstreamError>> + Send + 'static>>;

/// Seam between the relay loop and whatever produces the upstream bytes.
///
/// The production implementation is `HttpUpstream`; tests substitute
/// scripted sources to control fragmentation and failure timing.
#[async_trait::async_trait]
pub trait UpstreamSource: Send + Sync {
    /// Opens one streaming completion for the given prompt.
    async fn open(&self, prompt: &str) -> Result<ByteStream, UpstreamError>;
}

/// Configuration for the streaming chat-completion client.
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    /// API key used for bearer auth.
    pub api_key: String,
    /// Base URL of the OpenAI-compatible completion endpoint.
    pub base_url: String,
    /// Model requested for every completion.
    pub model: String,
    /// HTTP timeout covering the whole streamed response.
    pub timeout: Duration,
}

impl UpstreamConfig {
    /// Creates a config with defaults and a provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.siliconflow.cn".to_string(),
            model: "deepseek-ai/DeepSeek-R1".to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Builds a config from `UPSTREAM_API_KEY`, honoring optional
    /// `UPSTREAM_BASE_URL` and `UPSTREAM_MODEL` overrides.
    pub fn from_env() -> Result<Self, RelayError> {
        let api_key = std::env::var("UPSTREAM_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(RelayError::Config(
                "missing UPSTREAM_API_KEY for the completion client".into(),
            ));
        }
        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("UPSTREAM_BASE_URL")
            && !base_url.trim().is_empty()
        {
            config.base_url = base_url;
        }
        if let Ok(model) = std::env::var("UPSTREAM_MODEL")
            && !model.trim().is_empty()
        {
            config.model = model;
        }
        Ok(config)
    }

    /// Overrides the endpoint base URL (for proxies or test servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the requested model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn completions_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        )
    }
}

/// Upstream source backed by a streaming chat-completion HTTP request.
pub struct HttpUpstream {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl HttpUpstream {
    /// Creates a source from explicit configuration.
    pub fn new(config: UpstreamConfig) -> Result<Self, RelayError> {
        if config.api_key.trim().is_empty() {
            return Err(RelayError::Config(
                "upstream config api_key must not be empty".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build upstream client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Creates a source from environment configuration.
    pub fn from_env() -> Result<Self, RelayError> {
        Self::new(UpstreamConfig::from_env()?)
    }
}

#[async_trait::async_trait]
impl UpstreamSource for HttpUpstream {
    async fn open(&self, prompt: &str) -> Result<ByteStream, UpstreamError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": true,
        });
        debug!(model = %self.config.model, "opening upstream completion stream");

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamError::transport(format!("upstream request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(UpstreamError::unavailable(status.as_u16(), body));
        }

        let stream = response
            .bytes_stream()
            .map_err(|e| UpstreamError::transport(format!("upstream read failed: {e}")));
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completions_url_joins_without_double_slash() {
        let config = UpstreamConfig::new("k").base_url("https://example.test/");
        assert_eq!(
            config.completions_url(),
            "https://example.test/v1/chat/completions"
        );
    }

    #[test]
    fn new_rejects_empty_api_key() {
        let result = HttpUpstream::new(UpstreamConfig::new("  "));
        assert!(matches!(result, Err(RelayError::Config(_))));
    }

    #[test]
    fn builder_overrides_apply() {
        let config = UpstreamConfig::new("k")
            .model("other-model")
            .timeout(Duration::from_secs(5));
        assert_eq!(config.model, "other-model");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
