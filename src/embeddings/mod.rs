// Embeddings module
// Provider capability, concrete HTTP backends and vector similarity

pub mod gemini;
pub mod ollama;
pub mod retry;
pub mod similarity;

use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{Config, ProviderKind};

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use similarity::cosine_similarity;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Missing API key: environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("Provider returned an empty embedding")]
    EmptyEmbedding,

    #[error("Embedding task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

/// Turns text into a fixed-length vector.
///
/// Dimension must stay constant for the lifetime of one provider instance.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Short label used in logs
    fn name(&self) -> &str;
}

/// Build the provider selected in configuration
#[inline]
pub fn create_provider(config: &Config) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    match config.embedding.provider {
        ProviderKind::Ollama => {
            let client =
                OllamaClient::new(&config.ollama).context("Failed to initialize Ollama client")?;
            Ok(Arc::new(client))
        }
        ProviderKind::Gemini => {
            let client =
                GeminiClient::new(&config.gemini).context("Failed to initialize Gemini client")?;
            Ok(Arc::new(client))
        }
    }
}
