//! Shared test helpers for pipeline tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use botloom_config::{
    BusinessConfig, OrchestratorConfig, PromptConfig, RetrievalConfig, VectorStoreConfig,
};
use botloom_core::error::ModelError;
use botloom_core::model::{FinishReason, Generation, GenerationContext, ModelAdapter, TokenUsage};
use botloom_core::error::MemoryError;
use botloom_core::AccountSource;
use botloom_memory::{Embedder, EmbeddingStore, HashingEmbedder};

use crate::business::{BusinessRulesEngine, InMemoryAccountSource};
use crate::orchestrator::Orchestrator;
use crate::prompt::PromptAssembler;
use crate::retrieval::ContextRetriever;

pub const DIMS: usize = 256;

/// A model that always returns the same text and records the last prompt.
pub struct StubModel {
    text: String,
    delay: Duration,
    fail_init: bool,
    last_prompt: Mutex<Option<String>>,
}

impl StubModel {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.into(),
            delay: Duration::ZERO,
            fail_init: false,
            last_prompt: Mutex::new(None),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelAdapter for StubModel {
    fn name(&self) -> &str {
        "stub"
    }

    async fn initialize(&self) -> Result<(), ModelError> {
        if self.fail_init {
            return Err(ModelError::InitializationFailed("stub refused".into()));
        }
        Ok(())
    }

    async fn generate(
        &self,
        prompt: &str,
        _context: &GenerationContext,
    ) -> Result<Generation, ModelError> {
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Generation {
            text: self.text.clone(),
            usage: Some(TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            finish_reason: FinishReason::Stop,
            latency_ms: self.delay.as_millis() as u64,
            model: "stub".into(),
        })
    }
}

/// Hashing embedder that sleeps before every embedding.
pub struct SlowEmbedder {
    inner: HashingEmbedder,
    delay: Duration,
}

impl SlowEmbedder {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: HashingEmbedder::new(DIMS),
            delay,
        }
    }
}

#[async_trait]
impl Embedder for SlowEmbedder {
    fn name(&self) -> &str {
        "slow"
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        tokio::time::sleep(self.delay).await;
        self.inner.embed(text).await
    }
}

pub fn store_with(embedder: Arc<dyn Embedder>) -> Arc<EmbeddingStore> {
    let config = VectorStoreConfig {
        dimensions: DIMS,
        ..VectorStoreConfig::default()
    };
    Arc::new(EmbeddingStore::new(config, embedder))
}

pub fn store() -> Arc<EmbeddingStore> {
    store_with(Arc::new(HashingEmbedder::new(DIMS)))
}

/// Orchestrator over a fresh local store with no chunk delay unless the
/// config says otherwise.
pub fn orchestrator_with(
    config: OrchestratorConfig,
    model: Option<Arc<dyn ModelAdapter>>,
    accounts: Arc<dyn AccountSource>,
) -> Orchestrator {
    orchestrator_over(store(), config, model, accounts)
}

pub fn orchestrator_over(
    store: Arc<EmbeddingStore>,
    config: OrchestratorConfig,
    model: Option<Arc<dyn ModelAdapter>>,
    accounts: Arc<dyn AccountSource>,
) -> Orchestrator {
    let retrieval = RetrievalConfig {
        similarity_threshold: 0.3,
        ..RetrievalConfig::default()
    };
    Orchestrator::new(
        config,
        ContextRetriever::new(store, retrieval),
        BusinessRulesEngine::new(BusinessConfig::default(), accounts),
        PromptAssembler::new(PromptConfig::default()),
        model,
    )
}

pub fn orchestrator(model: Option<Arc<dyn ModelAdapter>>) -> Orchestrator {
    orchestrator_with(
        OrchestratorConfig::default(),
        model,
        Arc::new(InMemoryAccountSource::new()),
    )
}
