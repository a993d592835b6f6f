//! The embedding/similarity store.
//!
//! Holds [`ContentItem`]s with their embeddings and answers
//! nearest-neighbour queries under metadata filters. The local provider
//! keeps everything in memory; the external providers only simulate their
//! connection handshake and then use the same in-memory index.
//!
//! All state sits behind a single `tokio::sync::RwLock`, so concurrent
//! searches proceed in parallel and inserts are serialized.
//!
//! Every public operation reports failure as `false` / empty results and
//! logs the reason; nothing here returns an error across the boundary.

use botloom_config::VectorStoreConfig;
use botloom_core::content::{ContentItem, SearchFilters, SimilarityResult};
use botloom_core::error::MemoryError;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::embedding::Embedder;
use crate::vector::cosine_similarity;

/// Backends the store knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorProvider {
    Local,
    Pinecone,
    Weaviate,
    Chroma,
}

impl VectorProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Pinecone => "pinecone",
            Self::Weaviate => "weaviate",
            Self::Chroma => "chroma",
        }
    }

    pub fn is_external(&self) -> bool {
        !matches!(self, Self::Local)
    }
}

impl FromStr for VectorProvider {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "pinecone" => Ok(Self::Pinecone),
            "weaviate" => Ok(Self::Weaviate),
            "chroma" => Ok(Self::Chroma),
            other => Err(MemoryError::UnknownProvider(other.to_string())),
        }
    }
}

/// Items keyed by ID plus their insertion order.
struct StoreState {
    provider: VectorProvider,
    items: HashMap<String, ContentItem>,
    order: Vec<String>,
}

impl StoreState {
    fn new(provider: VectorProvider) -> Self {
        Self {
            provider,
            items: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Insert or replace. A replaced item keeps its original position.
    fn upsert(&mut self, item: ContentItem) {
        if !self.items.contains_key(&item.id) {
            self.order.push(item.id.clone());
        }
        self.items.insert(item.id.clone(), item);
    }
}

/// The embedding store. Cheap to share behind an `Arc`.
pub struct EmbeddingStore {
    config: VectorStoreConfig,
    embedder: Arc<dyn Embedder>,
    state: RwLock<Option<StoreState>>,
}

impl EmbeddingStore {
    pub fn new(config: VectorStoreConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            config,
            embedder,
            state: RwLock::new(None),
        }
    }

    /// Connect to the configured provider.
    ///
    /// Returns `false` only for an unknown provider name. Calling it on an
    /// already initialized store is a no-op that keeps existing items.
    pub async fn initialize(&self) -> bool {
        let provider = match VectorProvider::from_str(&self.config.provider) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Embedding store initialization failed");
                return false;
            }
        };

        if self.embedder.dimensions() != self.config.dimensions {
            warn!(
                embedder = self.embedder.name(),
                embedder_dims = self.embedder.dimensions(),
                store_dims = self.config.dimensions,
                "Embedder dimensionality differs from store; generated embeddings will be rejected"
            );
        }

        if self.state.read().await.is_some() {
            debug!("Embedding store already initialized");
            return true;
        }

        if provider.is_external() {
            // No wire protocol yet: the handshake is simulated.
            info!(
                provider = provider.as_str(),
                endpoint = self.config.endpoint.as_deref().unwrap_or("default"),
                collection = %self.config.collection,
                "Connecting to vector backend"
            );
            tokio::time::sleep(Duration::from_millis(self.config.connect_delay_ms)).await;
        }

        let mut state = self.state.write().await;
        if state.is_none() {
            *state = Some(StoreState::new(provider));
        }

        info!(
            provider = provider.as_str(),
            dimensions = self.config.dimensions,
            embedder = self.embedder.name(),
            "Embedding store initialized"
        );
        true
    }

    pub async fn is_initialized(&self) -> bool {
        self.state.read().await.is_some()
    }

    /// The active provider, if initialized.
    pub async fn provider(&self) -> Option<VectorProvider> {
        self.state.read().await.as_ref().map(|s| s.provider)
    }

    pub fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    /// Generate an embedding for arbitrary text with the store's embedder.
    pub async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        let embedding = self.embedder.embed(text).await?;
        self.check_dimensions(&embedding)?;
        Ok(embedding)
    }

    fn check_dimensions(&self, embedding: &[f32]) -> Result<(), MemoryError> {
        if embedding.len() != self.config.dimensions {
            return Err(MemoryError::DimensionMismatch {
                expected: self.config.dimensions,
                actual: embedding.len(),
            });
        }
        Ok(())
    }

    /// Fill in a missing embedding and validate its length.
    async fn prepare(&self, mut item: ContentItem) -> Result<ContentItem, MemoryError> {
        match &item.embedding {
            Some(embedding) => self.check_dimensions(embedding)?,
            None => item.embedding = Some(self.generate_embedding(&item.content).await?),
        }
        Ok(item)
    }

    /// Insert an item, replacing any item with the same ID.
    pub async fn add_document(&self, item: ContentItem) -> bool {
        let id = item.id.clone();
        match self.try_add_document(item).await {
            Ok(()) => {
                debug!(id = %id, "Document stored");
                true
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Failed to store document");
                false
            }
        }
    }

    async fn try_add_document(&self, item: ContentItem) -> Result<(), MemoryError> {
        if !self.is_initialized().await {
            return Err(MemoryError::NotInitialized);
        }
        let item = self.prepare(item).await?;
        let mut guard = self.state.write().await;
        let state = guard.as_mut().ok_or(MemoryError::NotInitialized)?;
        state.upsert(item);
        Ok(())
    }

    /// Insert a batch atomically: either every item is stored or none is.
    pub async fn add_documents(&self, items: Vec<ContentItem>) -> bool {
        let total = items.len();
        match self.try_add_documents(items).await {
            Ok(()) => {
                debug!(count = total, "Batch stored");
                true
            }
            Err(e) => {
                warn!(count = total, error = %e, "Batch rejected, nothing stored");
                false
            }
        }
    }

    async fn try_add_documents(&self, items: Vec<ContentItem>) -> Result<(), MemoryError> {
        if !self.is_initialized().await {
            return Err(MemoryError::NotInitialized);
        }

        let mut prepared = Vec::with_capacity(items.len());
        for item in items {
            prepared.push(self.prepare(item).await?);
        }

        let mut guard = self.state.write().await;
        let state = guard.as_mut().ok_or(MemoryError::NotInitialized)?;
        for item in prepared {
            state.upsert(item);
        }
        Ok(())
    }

    /// Top `limit` items with similarity ≥ `threshold` that match `filters`.
    ///
    /// Sorted by descending score; equal scores are ordered by ID ascending.
    pub async fn search_similar(
        &self,
        query: &str,
        limit: usize,
        threshold: f32,
        filters: &SearchFilters,
    ) -> Vec<SimilarityResult> {
        match self.try_search_similar(query, limit, threshold, filters).await {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "Similarity search failed");
                Vec::new()
            }
        }
    }

    async fn try_search_similar(
        &self,
        query: &str,
        limit: usize,
        threshold: f32,
        filters: &SearchFilters,
    ) -> Result<Vec<SimilarityResult>, MemoryError> {
        if !self.is_initialized().await {
            return Err(MemoryError::NotInitialized);
        }

        let query_embedding = self.generate_embedding(query).await?;

        let guard = self.state.read().await;
        let state = guard.as_ref().ok_or(MemoryError::NotInitialized)?;

        let mut results: Vec<SimilarityResult> = state
            .items
            .values()
            .filter(|item| filters.matches(&item.metadata))
            .filter_map(|item| {
                let embedding = item.embedding.as_ref()?;
                let score = cosine_similarity(&query_embedding, embedding);
                (score >= threshold).then(|| SimilarityResult::new(item.clone(), score))
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.item.id.cmp(&b.item.id))
        });
        results.truncate(limit);

        debug!(
            hits = results.len(),
            threshold,
            limit,
            "Similarity search complete"
        );
        Ok(results)
    }

    /// Remove an item. Returns whether it existed.
    pub async fn delete_document(&self, id: &str) -> bool {
        let mut guard = self.state.write().await;
        let Some(state) = guard.as_mut() else {
            warn!(id, "Delete on uninitialized store");
            return false;
        };
        if state.items.remove(id).is_none() {
            return false;
        }
        state.order.retain(|existing| existing != id);
        true
    }

    pub async fn get_document(&self, id: &str) -> Option<ContentItem> {
        self.state
            .read()
            .await
            .as_ref()
            .and_then(|s| s.items.get(id).cloned())
    }

    /// A window over the items in insertion order.
    pub async fn list_documents(&self, limit: usize, offset: usize) -> Vec<ContentItem> {
        let guard = self.state.read().await;
        let Some(state) = guard.as_ref() else {
            return Vec::new();
        };
        state
            .order
            .iter()
            .skip(offset)
            .take(limit)
            .filter_map(|id| state.items.get(id).cloned())
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.state.read().await.as_ref().map_or(0, |s| s.items.len())
    }

    /// Drop every item and return to the uninitialized state.
    pub async fn shutdown(&self) {
        let removed = self.count().await;
        *self.state.write().await = None;
        info!(removed, "Embedding store shut down");
    }
}
