// Retrieval entry points
// Shared handle over one vector index plus the context and prompt assembly used by the chat path

pub mod context;


use std::sync::Arc;
use tracing::info;

use crate::Result;
use crate::config::Config;
use crate::documents::{DocumentChunk, DocumentSource};
use crate::embeddings::{EmbeddingProvider, create_provider};
use crate::index::{IndexStatus, VectorIndex};
use crate::profile::ProfileSource;

pub use context::{build_context, build_system_prompt, build_system_prompt_on};

/// Chunks selected for a query together with their rendered context block
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedContext {
    pub chunks: Vec<DocumentChunk>,
    pub context: String,
}

/// Cloneable handle to a single shared index.
///
/// Every clone observes the same build, so a `reset` through any clone
/// forces a rebuild for all of them.
#[derive(Clone)]
pub struct Retriever {
    index: Arc<VectorIndex>,
    subject: String,
}

impl Retriever {
    #[inline]
    pub fn new(index: Arc<VectorIndex>, subject: impl Into<String>) -> Self {
        Self {
            index,
            subject: subject.into(),
        }
    }

    /// Assemble a retriever from explicit parts, using the retrieval settings from `config`
    #[inline]
    pub fn with_parts(
        config: &Config,
        source: Arc<dyn DocumentSource>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        let index = VectorIndex::new(source, provider).with_settings(config.retrieval.clone());
        Self::new(Arc::new(index), config.profile.subject.clone())
    }

    /// Wire up the configured provider and profile file.
    ///
    /// Nothing is embedded here; the index builds on first use.
    #[inline]
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = create_provider(config)?;
        let source = Arc::new(ProfileSource::from_config(config));
        Ok(Self::with_parts(config, source, provider))
    }

    #[inline]
    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    #[inline]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[inline]
    pub async fn initialize(&self) -> Result<()> {
        self.index.initialize().await
    }

    /// Relevant chunks for `query` and the numbered context built from them
    #[inline]
    pub async fn retrieve_context(&self, query: &str, top_k: usize) -> Result<RetrievedContext> {
        let chunks = self.index.search(query, top_k).await?;
        info!("Retrieved {} relevant chunks", chunks.len());

        let context = build_context(&chunks);
        Ok(RetrievedContext { chunks, context })
    }

    /// `retrieve_context` with the configured `top_k`
    #[inline]
    pub async fn retrieve(&self, query: &str) -> Result<RetrievedContext> {
        self.retrieve_context(query, self.index.settings().top_k)
            .await
    }

    #[inline]
    pub fn build_system_prompt(&self, context: &str) -> String {
        build_system_prompt(&self.subject, context)
    }

    #[inline]
    pub fn reset(&self) {
        self.index.reset();
    }

    #[inline]
    pub fn status(&self) -> IndexStatus {
        self.index.status()
    }
}
