#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::retry::{DEFAULT_TIMEOUT_SECONDS, RetryPolicy, http_agent};
use super::{EmbeddingError, EmbeddingProvider};
use crate::config::GeminiConfig;

/// Client for the Gemini `embedContent` endpoint
#[derive(Clone)]
pub struct GeminiClient {
    endpoint: Url,
    model: String,
    api_key: String,
    agent: ureq::Agent,
    retry: RetryPolicy,
}

impl fmt::Debug for GeminiClient {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest<'a> {
    model: String,
    content: Content<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

impl GeminiClient {
    /// Create a client, reading the API key from the configured environment variable
    #[inline]
    pub fn new(config: &GeminiConfig) -> Result<Self, EmbeddingError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| EmbeddingError::MissingApiKey(config.api_key_env.clone()))?;
        Ok(Self::with_api_key(config, api_key)?)
    }

    #[inline]
    pub fn with_api_key(config: &GeminiConfig, api_key: String) -> Result<Self> {
        let base_url = config.base_url().context("Invalid Gemini base URL")?;
        let endpoint = base_url
            .join(&format!("models/{}:embedContent", config.model))
            .context("Failed to build Gemini embedding URL")?;

        Ok(Self {
            endpoint,
            model: config.model.clone(),
            api_key,
            agent: http_agent(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)),
            retry: RetryPolicy::default(),
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = http_agent(timeout);
        self
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry.attempts = attempts;
        self
    }

    #[inline]
    pub fn with_retry_delay(mut self, base_delay: Duration) -> Self {
        self.retry.base_delay = base_delay;
        self
    }

    #[inline]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Generate the embedding for a single text input (blocking)
    #[inline]
    pub fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        debug!(
            "Requesting Gemini embedding from {} (length: {})",
            self.model,
            text.len()
        );

        let request = EmbedContentRequest {
            model: format!("models/{}", self.model),
            content: Content {
                parts: [Part { text }],
            },
        };
        let request_json =
            serde_json::to_string(&request).context("Failed to serialize embedding request")?;

        let response_text = self
            .retry
            .run(self.endpoint.as_str(), || {
                self.agent
                    .post(self.endpoint.as_str())
                    .header("Content-Type", "application/json")
                    .header("x-goog-api-key", &self.api_key)
                    .send(&request_json)
                    .and_then(|mut resp| resp.body_mut().read_to_string())
            })
            .context("Failed to generate embedding")?;

        let response: EmbedContentResponse =
            serde_json::from_str(&response_text).context("Failed to parse embedding response")?;

        if response.embedding.values.is_empty() {
            return Err(EmbeddingError::EmptyEmbedding.into());
        }

        debug!(
            "Generated embedding with {} dimensions",
            response.embedding.values.len()
        );
        Ok(response.embedding.values)
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    #[inline]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let client = self.clone();
        let text = text.to_string();

        tokio::task::spawn_blocking(move || client.generate_embedding(&text))
            .await
            .map_err(|e| EmbeddingError::Task(e.to_string()))?
            .map_err(EmbeddingError::from)
    }

    #[inline]
    fn name(&self) -> &str {
        "gemini"
    }
}
