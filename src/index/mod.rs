// In-memory vector index
// Owns chunk embeddings, builds them lazily once and answers similarity queries


use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::RetrievalConfig;
use crate::documents::{DocumentChunk, DocumentSource};
use crate::embeddings::{EmbeddingProvider, cosine_similarity};
use crate::{RagError, Result};

/// A document chunk paired with its embedding
#[derive(Debug, Clone, PartialEq)]
pub struct VectorEntry {
    pub chunk: DocumentChunk,
    pub embedding: Vec<f32>,
}

/// A search hit with the similarity score that ranked it
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStatus {
    pub initialized: bool,
    pub vector_count: usize,
}

/// One build generation. Concurrent callers share the cell, so at most one
/// build runs per generation; `reset` swaps in a fresh cell.
type Generation = Arc<OnceCell<Arc<Vec<VectorEntry>>>>;

pub struct VectorIndex {
    source: Arc<dyn DocumentSource>,
    provider: Arc<dyn EmbeddingProvider>,
    settings: RetrievalConfig,
    generation: RwLock<Generation>,
}

impl VectorIndex {
    #[inline]
    pub fn new(source: Arc<dyn DocumentSource>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            source,
            provider,
            settings: RetrievalConfig::default(),
            generation: RwLock::new(Arc::new(OnceCell::new())),
        }
    }

    #[inline]
    pub fn with_settings(mut self, settings: RetrievalConfig) -> Self {
        self.settings = settings;
        self
    }

    #[inline]
    pub fn settings(&self) -> &RetrievalConfig {
        &self.settings
    }

    /// Build the index if it has not been built yet.
    ///
    /// Callers arriving while a build is running wait for that build instead of
    /// starting another. Chunks that fail to embed are skipped; only a failure to
    /// load the documents themselves is returned.
    #[inline]
    pub async fn initialize(&self) -> Result<()> {
        self.ensure_built().await.map(|_| ())
    }

    /// Top `top_k` chunks scoring above the similarity threshold, best first
    #[inline]
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<DocumentChunk>> {
        let hits = self.search_scored(query, top_k).await?;
        Ok(hits.into_iter().map(|hit| hit.chunk).collect())
    }

    #[inline]
    pub async fn search_scored(&self, query: &str, top_k: usize) -> Result<Vec<ScoredChunk>> {
        let entries = self.ensure_built().await?;

        if entries.is_empty() {
            debug!("Index is empty, skipping query embedding");
            return Ok(Vec::new());
        }

        let query_embedding = self
            .provider
            .embed(query)
            .await
            .map_err(RagError::QueryEmbedding)?;

        let mut scored = entries
            .iter()
            .map(|entry| Ok((cosine_similarity(&query_embedding, &entry.embedding)?, entry)))
            .collect::<Result<Vec<(f32, &VectorEntry)>>>()?;

        scored.sort_by(|(score_a, entry_a), (score_b, entry_b)| {
            score_b
                .total_cmp(score_a)
                .then_with(|| entry_a.chunk.id.cmp(&entry_b.chunk.id))
        });

        let threshold = self.settings.similarity_threshold;
        let hits: Vec<ScoredChunk> = scored
            .into_iter()
            .filter(|(score, _)| *score > threshold)
            .take(top_k)
            .map(|(score, entry)| ScoredChunk {
                chunk: entry.chunk.clone(),
                score,
            })
            .collect();

        debug!(
            "Query matched {} chunks above threshold {} (top_k {})",
            hits.len(),
            threshold,
            top_k
        );

        Ok(hits)
    }

    /// Drop all entries so the next call rebuilds from a fresh document load
    #[inline]
    pub fn reset(&self) {
        let mut generation = self
            .generation
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *generation = Arc::new(OnceCell::new());
        info!("Vector index reset, will rebuild on next query");
    }

    #[inline]
    pub fn status(&self) -> IndexStatus {
        let generation = self.current_generation();
        IndexStatus {
            initialized: generation.initialized(),
            vector_count: generation.get().map_or(0, |entries| entries.len()),
        }
    }

    /// Entries of the completed build, if any, in document order
    #[inline]
    pub fn snapshot(&self) -> Option<Arc<Vec<VectorEntry>>> {
        self.current_generation().get().map(Arc::clone)
    }

    fn current_generation(&self) -> Generation {
        Arc::clone(
            &self
                .generation
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    async fn ensure_built(&self) -> Result<Arc<Vec<VectorEntry>>> {
        let generation = self.current_generation();
        let entries = generation
            .get_or_try_init(|| self.build_entries())
            .await?;
        Ok(Arc::clone(entries))
    }

    async fn build_entries(&self) -> Result<Arc<Vec<VectorEntry>>> {
        info!(
            "Initializing vector index with {} embeddings",
            self.provider.name()
        );

        let chunks = self.source.load_documents()?;
        let total = chunks.len();
        info!("Preparing {} document chunks", total);

        let mut entries = Vec::with_capacity(total);
        let mut dimension = None;

        for chunk in chunks {
            let embedding = match self.provider.embed(&chunk.content).await {
                Ok(embedding) => embedding,
                Err(e) => {
                    warn!("Failed to embed chunk {}: {}", chunk.id, e);
                    continue;
                }
            };

            let expected = *dimension.get_or_insert(embedding.len());
            if embedding.len() != expected {
                warn!(
                    "Skipping chunk {}: embedding has {} dimensions, index uses {}",
                    chunk.id,
                    embedding.len(),
                    expected
                );
                continue;
            }

            debug!("Embedded chunk {}", chunk.id);
            entries.push(VectorEntry { chunk, embedding });
        }

        info!(
            "Vector index initialized with {} of {} chunks",
            entries.len(),
            total
        );

        Ok(Arc::new(entries))
    }
}
