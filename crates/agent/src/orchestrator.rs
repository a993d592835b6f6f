//! The request orchestrator.
//!
//! One request flows through: fetch business context → retrieve context →
//! assemble prompt → generate → extract and execute actions. Every stage
//! below this level degrades gracefully; `process_request` is the one place
//! where a failure reaches the caller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use botloom_config::{AppConfig, OrchestratorConfig};
use botloom_core::business::{AccountSource, BusinessAction};
use botloom_core::error::{Error, MemoryError, ModelError, Result};
use botloom_core::model::{FinishReason, Generation, GenerationContext, ModelAdapter};
use botloom_core::pipeline::{AIRequest, AIResponse, AccountHints, RetrievalContext};
use botloom_memory::{create_embedder, EmbeddingStore};
use rand::Rng;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::business::BusinessRulesEngine;
use crate::prompt::{PromptAssembler, PromptContext};
use crate::retrieval::ContextRetriever;
use crate::token;

/// Used when no model adapter is configured.
pub const FALLBACK_RESPONSES: &[&str] = &[
    "Thanks for your message! I'm looking into that for you.",
    "I understand. Let me help you with that.",
    "That's a great question. Here's what I can tell you.",
    "I'm here to help. Could you share a few more details?",
];

/// Sent as the only chunk when a streamed request fails.
pub const STREAM_APOLOGY: &str =
    "I'm sorry, something went wrong while generating a response. Please try again.";

const FALLBACK_MODEL: &str = "fallback";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    Uninitialized,
    Initialized,
    Shutdown,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub state: OrchestratorState,
    pub documents: usize,
    /// `None` when answering from fallback sentences
    pub model: Option<String>,
}

pub struct Orchestrator {
    config: OrchestratorConfig,
    retriever: ContextRetriever,
    business: BusinessRulesEngine,
    prompts: PromptAssembler,
    model: Option<Arc<dyn ModelAdapter>>,
    temperature: f32,
    max_tokens: Option<u32>,
    state: RwLock<OrchestratorState>,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        retriever: ContextRetriever,
        business: BusinessRulesEngine,
        prompts: PromptAssembler,
        model: Option<Arc<dyn ModelAdapter>>,
    ) -> Self {
        Self {
            config,
            retriever,
            business,
            prompts,
            model,
            temperature: 0.7,
            max_tokens: None,
            state: RwLock::new(OrchestratorState::Uninitialized),
        }
    }

    /// Wire every component from configuration.
    pub fn from_config(config: &AppConfig, accounts: Arc<dyn AccountSource>) -> Result<Self> {
        let embedder =
            create_embedder(&config.vector_store.embedder, config.vector_store.dimensions)?;
        let store = Arc::new(EmbeddingStore::new(config.vector_store.clone(), embedder));
        let model = botloom_providers::create_model(&config.model)?;

        Ok(Self::new(
            config.orchestrator.clone(),
            ContextRetriever::new(store, config.retrieval.clone()),
            BusinessRulesEngine::new(config.business.clone(), accounts),
            PromptAssembler::new(config.prompt.clone()),
            model,
        )
        .with_generation_settings(config.model.temperature, Some(config.model.max_tokens)))
    }

    pub fn with_generation_settings(mut self, temperature: f32, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn retriever(&self) -> &ContextRetriever {
        &self.retriever
    }

    pub fn business(&self) -> &BusinessRulesEngine {
        &self.business
    }

    pub async fn state(&self) -> OrchestratorState {
        *self.state.read().await
    }

    /// Initialize the store and, if configured, the model adapter.
    pub async fn initialize(&self) -> Result<()> {
        let mut state = self.state.write().await;
        if *state == OrchestratorState::Initialized {
            return Ok(());
        }

        if !self.retriever.store().initialize().await {
            return Err(MemoryError::Connection("embedding store failed to initialize".into()).into());
        }

        match &self.model {
            Some(model) => {
                model.initialize().await?;
                info!(model = model.name(), "Model adapter initialized");
            }
            None => info!("No model configured, using fallback responses"),
        }

        *state = OrchestratorState::Initialized;
        info!(
            rag = self.config.enable_rag,
            business_logic = self.config.enable_business_logic,
            streaming = self.config.enable_streaming,
            "Orchestrator initialized"
        );
        Ok(())
    }

    async fn ensure_initialized(&self) -> Result<()> {
        match *self.state.read().await {
            OrchestratorState::Initialized => Ok(()),
            OrchestratorState::Uninitialized => {
                Err(Error::NotInitialized("orchestrator has not been initialized".into()))
            }
            OrchestratorState::Shutdown => {
                Err(Error::NotInitialized("orchestrator has been shut down".into()))
            }
        }
    }

    /// Answer one request.
    pub async fn process_request(&self, request: &AIRequest) -> Result<AIResponse> {
        let started = Instant::now();
        self.ensure_initialized().await?;

        let mut hints = request.account_hints();
        let request_context = request.context.clone().unwrap_or_default();

        // 1. Business context; its plan and role also scope retrieval
        let business_context = if self.config.enable_business_logic {
            match self
                .business
                .fetch_context(&request.account_id, Some(&hints))
                .await
            {
                Ok(account) => {
                    hints.plan = Some(account.plan.clone());
                    hints.role = Some(account.role.clone());
                    self.business.render_context(&account)
                }
                Err(e) => {
                    warn!(account_id = %request.account_id, error = %e, "Business context unavailable");
                    String::new()
                }
            }
        } else {
            String::new()
        };

        // 2. Retrieval
        let retrieval = if self.config.enable_rag {
            self.retrieve(request, &hints).await
        } else {
            RetrievalContext::default()
        };

        // 3. Prompt
        let variant = self.prompts.select_prompt_template(&request.message);
        let prompt_context = PromptContext {
            user_message: request.message.clone(),
            retrieved_context: retrieval.text.clone(),
            business_context,
            history: request_context.history,
            persona_name: request_context.persona_name,
            persona_description: request_context.persona_description,
        };
        let prompt = self.prompts.build_request_prompt(
            variant,
            request_context.industry.as_deref(),
            &prompt_context,
        );
        debug!(variant = %variant, prompt_chars = prompt.len(), "Prompt assembled");

        // 4. Generation
        let generation = self.generate(&prompt, &request.account_id).await?;
        let tokens_used = token::tokens_used(&prompt, &generation);

        // 5. Actions
        let actions = if self.config.enable_business_logic {
            self.run_actions(&generation.text, &request.account_id).await
        } else {
            Vec::new()
        };

        let confidence = if retrieval.is_empty() {
            self.config.default_confidence
        } else {
            retrieval.confidence
        };

        if self.config.record_history {
            self.retriever
                .add_conversation_to_history(
                    &request.account_id,
                    &request.message,
                    &generation.text,
                    &request.session_id,
                )
                .await;
        }

        let processing_time_ms = started.elapsed().as_millis() as u64;
        info!(
            account_id = %request.account_id,
            session_id = %request.session_id,
            model = %generation.model,
            actions = actions.len(),
            tokens_used,
            processing_time_ms,
            "Request processed"
        );

        Ok(AIResponse {
            text: generation.text,
            confidence,
            sources: retrieval.sources,
            actions,
            model: generation.model,
            processing_time_ms,
            tokens_used,
        })
    }

    async fn retrieve(&self, request: &AIRequest, hints: &AccountHints) -> RetrievalContext {
        let limit = Duration::from_millis(self.config.search_timeout_ms);
        let search = self
            .retriever
            .retrieve_context(&request.message, &request.account_id, Some(hints));
        match tokio::time::timeout(limit, search).await {
            Ok(context) => context,
            Err(_) => {
                warn!(
                    account_id = %request.account_id,
                    timeout_ms = self.config.search_timeout_ms,
                    "Context retrieval timed out"
                );
                RetrievalContext::default()
            }
        }
    }

    async fn generate(&self, prompt: &str, account_id: &str) -> Result<Generation> {
        let Some(model) = &self.model else {
            return Ok(Self::fallback_generation());
        };

        let context = GenerationContext {
            account_id: Some(account_id.to_string()),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let limit_ms = self.config.generation_timeout_ms;
        let generation = tokio::time::timeout(
            Duration::from_millis(limit_ms),
            model.generate(prompt, &context),
        )
        .await
        .map_err(|_| ModelError::Timeout(limit_ms))??;

        debug!(
            model = %generation.model,
            latency_ms = generation.latency_ms,
            finish_reason = ?generation.finish_reason,
            "Generation complete"
        );
        Ok(generation)
    }

    fn fallback_generation() -> Generation {
        let index = rand::rng().random_range(0..FALLBACK_RESPONSES.len());
        Generation {
            text: FALLBACK_RESPONSES[index].to_string(),
            usage: None,
            finish_reason: FinishReason::Stop,
            latency_ms: 0,
            model: FALLBACK_MODEL.into(),
        }
    }

    /// Extract actions from the response and keep the ones that executed.
    async fn run_actions(&self, text: &str, account_id: &str) -> Vec<BusinessAction> {
        let extracted = self.business.extract_actions(text, account_id);
        if extracted.is_empty() {
            return extracted;
        }
        self.business
            .execute_actions(&extracted, account_id)
            .await
            .into_iter()
            .filter(|outcome| outcome.success)
            .map(|outcome| outcome.action)
            .collect()
    }

    /// Answer a request and deliver the text through `on_chunk`.
    ///
    /// With streaming enabled the finished text is re-chunked one word per
    /// call (`"word "`), with `stream_chunk_delay_ms` between chunks. Text
    /// without any words goes out unchanged as a single chunk. Failures are
    /// reported as a single apology chunk and `None`.
    pub async fn process_streaming_request<F>(
        &self,
        request: &AIRequest,
        mut on_chunk: F,
    ) -> Option<AIResponse>
    where
        F: FnMut(&str) + Send,
    {
        let response = match self.process_request(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(account_id = %request.account_id, error = %e, "Streaming request failed");
                on_chunk(STREAM_APOLOGY);
                return None;
            }
        };

        if !self.config.enable_streaming {
            on_chunk(&response.text);
            return Some(response);
        }

        if response.text.split_whitespace().next().is_none() {
            on_chunk(&response.text);
            return Some(response);
        }

        let delay = Duration::from_millis(self.config.stream_chunk_delay_ms);
        for (i, word) in response.text.split_whitespace().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            on_chunk(&format!("{word} "));
        }
        Some(response)
    }

    /// Clear the store and refuse further requests.
    pub async fn shutdown(&self) {
        let mut state = self.state.write().await;
        self.retriever.store().shutdown().await;
        *state = OrchestratorState::Shutdown;
        info!("Orchestrator shut down");
    }

    pub async fn health(&self) -> HealthReport {
        HealthReport {
            state: self.state().await,
            documents: self.retriever.store().count().await,
            model: self.model.as_ref().map(|m| m.name().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business::{ActionRegistry, InMemoryAccountSource};
    use crate::test_helpers::{
        orchestrator, orchestrator_over, orchestrator_with, store_with, SlowEmbedder, StubModel,
    };
    use botloom_core::business::{ActionType, BusinessContext};
    use botloom_core::pipeline::RequestContext;

    const UPGRADE_REPLY: &str = "Sure, I can help you upgrade your plan today.";

    fn stub(text: &str) -> Arc<StubModel> {
        Arc::new(StubModel::new(text))
    }

    fn upgrade_request() -> AIRequest {
        AIRequest::new("Can you help me upgrade my plan?", "u1", "s1")
    }

    #[tokio::test]
    async fn requests_before_initialize_are_rejected() {
        let orch = orchestrator(Some(stub("hi")));
        let err = orch.process_request(&upgrade_request()).await.unwrap_err();
        assert!(matches!(err, Error::NotInitialized(_)));
    }

    #[tokio::test]
    async fn upgrade_request_surfaces_upgrade_action() {
        let orch = orchestrator(Some(stub(UPGRADE_REPLY)));
        orch.initialize().await.unwrap();

        let response = orch.process_request(&upgrade_request()).await.unwrap();
        assert_eq!(response.text, UPGRADE_REPLY);
        assert_eq!(response.model, "stub");
        assert_eq!(response.tokens_used, 15);

        let upgrade: Vec<_> = response
            .actions
            .iter()
            .filter(|a| a.action_type == ActionType::UpgradePlan)
            .collect();
        assert_eq!(upgrade.len(), 1);
        assert!(upgrade[0].requires_confirmation);
        assert_eq!(upgrade[0].parameters["account_id"], "u1");
    }

    #[tokio::test]
    async fn failed_actions_are_left_out() {
        let accounts: Arc<dyn AccountSource> = Arc::new(InMemoryAccountSource::new());
        let model: Arc<dyn ModelAdapter> = stub(UPGRADE_REPLY);
        let base = orchestrator_with(OrchestratorConfig::default(), Some(model), accounts.clone());
        let orch = Orchestrator {
            business: BusinessRulesEngine::new(Default::default(), accounts)
                .with_registry(ActionRegistry::new()),
            ..base
        };
        orch.initialize().await.unwrap();

        let response = orch.process_request(&upgrade_request()).await.unwrap();
        assert!(response.actions.is_empty());
    }

    #[tokio::test]
    async fn business_logic_can_be_disabled() {
        let model = stub(UPGRADE_REPLY);
        let config = OrchestratorConfig {
            enable_business_logic: false,
            ..OrchestratorConfig::default()
        };
        let orch = orchestrator_with(config, Some(model.clone()), Arc::new(InMemoryAccountSource::new()));
        orch.initialize().await.unwrap();

        let response = orch.process_request(&upgrade_request()).await.unwrap();
        assert!(response.actions.is_empty());
        assert!(!model.last_prompt().unwrap().contains("Account information:"));
    }

    #[tokio::test]
    async fn prompt_carries_business_context_and_variant() {
        let model = stub("ok");
        let accounts = InMemoryAccountSource::new();
        accounts
            .upsert(BusinessContext {
                plan: "pro".into(),
                ..BusinessContext::starter("u1")
            })
            .await;
        let orch = orchestrator_with(OrchestratorConfig::default(), Some(model.clone()), Arc::new(accounts));
        orch.initialize().await.unwrap();

        orch.process_request(&upgrade_request()).await.unwrap();
        let prompt = model.last_prompt().unwrap();
        assert!(prompt.contains("Account information:\nPlan: pro"));
        assert!(prompt.contains("Customer support guidelines:"));
        assert!(prompt.ends_with("user: Can you help me upgrade my plan?\n\nassistant:"));
    }

    #[tokio::test]
    async fn request_context_shapes_prompt() {
        let model = stub("ok");
        let orch = orchestrator(Some(model.clone()));
        orch.initialize().await.unwrap();

        let request = AIRequest::new("hello there", "u1", "s1").with_context(RequestContext {
            history: vec![botloom_core::ConversationTurn::new("earlier question", "earlier answer")],
            industry: Some("finance".into()),
            persona_name: Some("Penny".into()),
            ..RequestContext::default()
        });
        orch.process_request(&request).await.unwrap();

        let prompt = model.last_prompt().unwrap();
        assert!(prompt.starts_with("system: You are Penny"));
        assert!(prompt.contains("Industry guidelines (finance):"));
        assert!(prompt.contains("User: earlier question\nAssistant: earlier answer"));
    }

    #[tokio::test]
    async fn confidence_defaults_without_context() {
        let orch = orchestrator(Some(stub("ok")));
        orch.initialize().await.unwrap();
        let response = orch.process_request(&upgrade_request()).await.unwrap();
        assert_eq!(response.confidence, 0.5);
        assert!(response.sources.is_empty());
    }

    #[tokio::test]
    async fn retrieved_context_sets_confidence_and_sources() {
        let model = stub("ok");
        let orch = orchestrator(Some(model.clone()));
        orch.initialize().await.unwrap();
        orch.retriever()
            .add_knowledge_base_document("how do i reset my password", "faq.md", vec![])
            .await;

        let response = orch
            .process_request(&AIRequest::new("how do i reset my password", "u1", "s1"))
            .await
            .unwrap();
        assert_eq!(response.sources, vec!["faq.md".to_string()]);
        assert!((response.confidence - 1.0).abs() < 1e-4);
        assert!(model.last_prompt().unwrap().contains("Knowledge Base:"));
    }

    #[tokio::test]
    async fn business_data_follows_account_plan_and_owner() {
        let model = stub("ok");
        let accounts = InMemoryAccountSource::new();
        accounts
            .upsert(BusinessContext {
                plan: "pro".into(),
                role: "admin".into(),
                ..BusinessContext::starter("u1")
            })
            .await;
        let orch = orchestrator_with(OrchestratorConfig::default(), Some(model.clone()), Arc::new(accounts));
        orch.initialize().await.unwrap();

        let retriever = orch.retriever();
        retriever
            .add_business_document("u1", "renewal discount for pro admin accounts is 20 percent", "pro", "admin")
            .await;
        retriever
            .add_business_document("u1", "renewal discount for starter user accounts is 5 percent", "starter", "user")
            .await;

        let own = orch
            .process_request(&AIRequest::new("what renewal discount applies", "u1", "s1"))
            .await
            .unwrap();
        assert_eq!(own.sources, vec!["account:u1".to_string()]);
        let prompt = model.last_prompt().unwrap();
        assert!(prompt.contains("is 20 percent"));
        assert!(!prompt.contains("is 5 percent"));

        let other = orch
            .process_request(&AIRequest::new("what renewal discount applies", "u2", "s2"))
            .await
            .unwrap();
        assert!(other.sources.is_empty());
        assert!(!model.last_prompt().unwrap().contains("percent"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_retrieval_falls_back_to_empty_context() {
        let model = stub("ok");
        let config = OrchestratorConfig {
            search_timeout_ms: 100,
            ..OrchestratorConfig::default()
        };
        let store = store_with(Arc::new(SlowEmbedder::new(Duration::from_millis(500))));
        let orch = orchestrator_over(
            store,
            config,
            Some(model.clone()),
            Arc::new(InMemoryAccountSource::new()),
        );
        orch.initialize().await.unwrap();
        assert!(
            orch.retriever()
                .add_knowledge_base_document("how do i reset my password", "faq.md", vec![])
                .await
        );

        let response = orch
            .process_request(&AIRequest::new("how do i reset my password", "u1", "s1"))
            .await
            .unwrap();
        assert_eq!(response.text, "ok");
        assert!(response.sources.is_empty());
        assert_eq!(response.confidence, 0.5);
        assert!(!model.last_prompt().unwrap().contains("Knowledge Base:"));
    }

    #[tokio::test]
    async fn rag_can_be_disabled() {
        let config = OrchestratorConfig {
            enable_rag: false,
            ..OrchestratorConfig::default()
        };
        let orch = orchestrator_with(config, Some(stub("ok")), Arc::new(InMemoryAccountSource::new()));
        orch.initialize().await.unwrap();
        orch.retriever()
            .add_knowledge_base_document("how do i reset my password", "faq.md", vec![])
            .await;

        let response = orch
            .process_request(&AIRequest::new("how do i reset my password", "u1", "s1"))
            .await
            .unwrap();
        assert!(response.sources.is_empty());
        assert_eq!(response.confidence, 0.5);
    }

    #[tokio::test]
    async fn without_model_uses_fallback_sentences() {
        let orch = orchestrator(None);
        orch.initialize().await.unwrap();
        let response = orch.process_request(&upgrade_request()).await.unwrap();
        assert!(FALLBACK_RESPONSES.contains(&response.text.as_str()));
        assert_eq!(response.model, FALLBACK_MODEL);
        assert!(response.tokens_used > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_generation_times_out() {
        let model = Arc::new(StubModel::new("late").with_delay(Duration::from_millis(500)));
        let config = OrchestratorConfig {
            generation_timeout_ms: 100,
            ..OrchestratorConfig::default()
        };
        let orch = orchestrator_with(config, Some(model), Arc::new(InMemoryAccountSource::new()));
        orch.initialize().await.unwrap();

        let err = orch.process_request(&upgrade_request()).await.unwrap_err();
        assert!(matches!(err, Error::Model(ModelError::Timeout(100))));
    }

    #[tokio::test]
    async fn failing_model_init_fails_initialize() {
        let orch = orchestrator(Some(Arc::new(StubModel::new("x").failing_init())));
        assert!(matches!(orch.initialize().await, Err(Error::Model(_))));
        assert_eq!(orch.state().await, OrchestratorState::Uninitialized);
    }

    #[tokio::test]
    async fn history_is_recorded_when_enabled() {
        let config = OrchestratorConfig {
            record_history: true,
            ..OrchestratorConfig::default()
        };
        let orch = orchestrator_with(config, Some(stub("It ships Monday.")), Arc::new(InMemoryAccountSource::new()));
        orch.initialize().await.unwrap();

        orch.process_request(&AIRequest::new("when does it ship", "u1", "s7"))
            .await
            .unwrap();
        let items = orch.retriever().store().list_documents(10, 0).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "User: when does it ship\nAssistant: It ships Monday.");
    }

    #[tokio::test(start_paused = true)]
    async fn streaming_emits_one_word_per_chunk() {
        let orch = orchestrator(Some(stub("Hello world foo")));
        orch.initialize().await.unwrap();

        let started = tokio::time::Instant::now();
        let mut chunks = Vec::new();
        let response = orch
            .process_streaming_request(&upgrade_request(), |chunk| chunks.push(chunk.to_string()))
            .await;

        assert_eq!(chunks, vec!["Hello ", "world ", "foo "]);
        assert_eq!(response.unwrap().text, "Hello world foo");
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn streaming_disabled_sends_whole_text() {
        let config = OrchestratorConfig {
            enable_streaming: false,
            ..OrchestratorConfig::default()
        };
        let orch = orchestrator_with(config, Some(stub("Hello world foo")), Arc::new(InMemoryAccountSource::new()));
        orch.initialize().await.unwrap();

        let mut chunks = Vec::new();
        orch.process_streaming_request(&upgrade_request(), |chunk| chunks.push(chunk.to_string()))
            .await;
        assert_eq!(chunks, vec!["Hello world foo"]);
    }

    #[tokio::test]
    async fn streaming_wordless_text_is_one_chunk() {
        let orch = orchestrator(Some(stub("  ")));
        orch.initialize().await.unwrap();

        let mut chunks = Vec::new();
        let response = orch
            .process_streaming_request(&upgrade_request(), |chunk| chunks.push(chunk.to_string()))
            .await;
        assert_eq!(chunks, vec!["  "]);
        assert_eq!(response.unwrap().text, "  ");
    }

    #[tokio::test]
    async fn streaming_failure_sends_apology() {
        let orch = orchestrator(Some(stub("never")));
        let mut chunks = Vec::new();
        let response = orch
            .process_streaming_request(&upgrade_request(), |chunk| chunks.push(chunk.to_string()))
            .await;
        assert!(response.is_none());
        assert_eq!(chunks, vec![STREAM_APOLOGY]);
    }

    #[tokio::test]
    async fn shutdown_clears_store_and_blocks_requests() {
        let orch = orchestrator(Some(stub("ok")));
        orch.initialize().await.unwrap();
        orch.retriever()
            .add_knowledge_base_document("some article", "a.md", vec![])
            .await;
        assert_eq!(orch.health().await.documents, 1);

        orch.shutdown().await;
        let health = orch.health().await;
        assert_eq!(health.state, OrchestratorState::Shutdown);
        assert_eq!(health.documents, 0);
        assert!(matches!(
            orch.process_request(&upgrade_request()).await,
            Err(Error::NotInitialized(_))
        ));
    }

    #[tokio::test]
    async fn health_reports_model() {
        let orch = orchestrator(Some(stub("ok")));
        orch.initialize().await.unwrap();
        let health = orch.health().await;
        assert_eq!(health.state, OrchestratorState::Initialized);
        assert_eq!(health.model.as_deref(), Some("stub"));
        assert!(orchestrator(None).health().await.model.is_none());
    }

    #[tokio::test]
    async fn from_config_wires_components() {
        let mut config = AppConfig::default();
        config.model.provider = "none".into();
        config.vector_store.dimensions = 64;
        let orch = Orchestrator::from_config(&config, Arc::new(InMemoryAccountSource::new())).unwrap();
        orch.initialize().await.unwrap();
        assert!(orch.health().await.model.is_none());
    }

    #[test]
    fn from_config_rejects_unknown_model_provider() {
        let mut config = AppConfig::default();
        config.model.provider = "mystery".into();
        let result = Orchestrator::from_config(&config, Arc::new(InMemoryAccountSource::new()));
        assert!(matches!(result, Err(Error::Model(ModelError::NotConfigured(_)))));
    }
}
