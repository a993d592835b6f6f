//! Configuration loading, validation, and management for botloom.
//!
//! Loads configuration from `~/.botloom/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.botloom/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Vector store backend and embedding settings
    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    /// Context retrieval settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Text-generation backend
    #[serde(default)]
    pub model: ModelConfig,

    /// Pipeline feature toggles and timeouts
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Prompt persona and history window
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Plan tiers and permission policy
    #[serde(default)]
    pub business: BusinessConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

fn default_true() -> bool {
    true
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("vector_store", &self.vector_store)
            .field("retrieval", &self.retrieval)
            .field("model", &self.model)
            .field("orchestrator", &self.orchestrator)
            .field("prompt", &self.prompt)
            .field("business", &self.business)
            .finish()
    }
}

// ── Vector store ──────────────────────────────────────────────────────────

#[derive(Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// "local", "pinecone", "weaviate" or "chroma"
    #[serde(default = "default_vector_provider")]
    pub provider: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// "random" (placeholder noise) or "hashing" (deterministic bag-of-words)
    #[serde(default = "default_embedder")]
    pub embedder: String,

    /// Simulated handshake latency for external providers
    #[serde(default = "default_connect_delay_ms")]
    pub connect_delay_ms: u64,
}

fn default_vector_provider() -> String {
    "local".into()
}
fn default_collection() -> String {
    "botloom".into()
}
fn default_dimensions() -> usize {
    1536
}
fn default_embedder() -> String {
    "hashing".into()
}
fn default_connect_delay_ms() -> u64 {
    100
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            provider: default_vector_provider(),
            endpoint: None,
            api_key: None,
            collection: default_collection(),
            dimensions: default_dimensions(),
            embedder: default_embedder(),
            connect_delay_ms: default_connect_delay_ms(),
        }
    }
}

impl std::fmt::Debug for VectorStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStoreConfig")
            .field("provider", &self.provider)
            .field("endpoint", &self.endpoint)
            .field("api_key", &redact(&self.api_key))
            .field("collection", &self.collection)
            .field("dimensions", &self.dimensions)
            .field("embedder", &self.embedder)
            .field("connect_delay_ms", &self.connect_delay_ms)
            .finish()
    }
}

// ── Retrieval ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Results per partition
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    #[serde(default = "default_true")]
    pub include_user_history: bool,

    #[serde(default = "default_true")]
    pub include_business_data: bool,

    #[serde(default = "default_true")]
    pub include_knowledge_base: bool,
}

fn default_max_results() -> usize {
    5
}
fn default_similarity_threshold() -> f32 {
    0.7
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            similarity_threshold: default_similarity_threshold(),
            include_user_history: true,
            include_business_data: true,
            include_knowledge_base: true,
        }
    }
}

// ── Model ─────────────────────────────────────────────────────────────────

#[derive(Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// "canned", "openai" or "none"
    #[serde(default = "default_model_provider")]
    pub provider: String,

    #[serde(default = "default_model_name")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Artificial delay of the canned responder
    #[serde(default = "default_simulated_latency_ms")]
    pub simulated_latency_ms: u64,
}

fn default_model_provider() -> String {
    "canned".into()
}
fn default_model_name() -> String {
    "llama-3-8b-instruct".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_simulated_latency_ms() -> u64 {
    200
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_model_provider(),
            name: default_model_name(),
            api_url: None,
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            simulated_latency_ms: default_simulated_latency_ms(),
        }
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("provider", &self.provider)
            .field("name", &self.name)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("simulated_latency_ms", &self.simulated_latency_ms)
            .finish()
    }
}

// ── Orchestrator ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default = "default_true")]
    pub enable_rag: bool,

    #[serde(default = "default_true")]
    pub enable_business_logic: bool,

    #[serde(default = "default_true")]
    pub enable_streaming: bool,

    #[serde(default = "default_stream_chunk_delay_ms")]
    pub stream_chunk_delay_ms: u64,

    #[serde(default = "default_generation_timeout_ms")]
    pub generation_timeout_ms: u64,

    #[serde(default = "default_search_timeout_ms")]
    pub search_timeout_ms: u64,

    /// Append every answered turn to the conversation history partition
    #[serde(default)]
    pub record_history: bool,

    /// Confidence reported when no context was retrieved
    #[serde(default = "default_confidence")]
    pub default_confidence: f32,
}

fn default_stream_chunk_delay_ms() -> u64 {
    50
}
fn default_generation_timeout_ms() -> u64 {
    30_000
}
fn default_search_timeout_ms() -> u64 {
    5_000
}
fn default_confidence() -> f32 {
    0.5
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            enable_rag: true,
            enable_business_logic: true,
            enable_streaming: true,
            stream_chunk_delay_ms: default_stream_chunk_delay_ms(),
            generation_timeout_ms: default_generation_timeout_ms(),
            search_timeout_ms: default_search_timeout_ms(),
            record_history: false,
            default_confidence: default_confidence(),
        }
    }
}

// ── Prompt ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_persona_name")]
    pub persona_name: String,

    #[serde(default = "default_persona_description")]
    pub persona_description: String,

    /// Number of most recent turns rendered into the prompt
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

fn default_persona_name() -> String {
    "AI Assistant".into()
}
fn default_persona_description() -> String {
    "friendly and professional".into()
}
fn default_history_window() -> usize {
    5
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            persona_name: default_persona_name(),
            persona_description: default_persona_description(),
            history_window: default_history_window(),
        }
    }
}

// ── Business ──────────────────────────────────────────────────────────────

/// What `validate_user_action` answers for action names it has no rule for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownActionPolicy {
    #[default]
    Allow,
    Deny,
}

/// Daily usage limits of a plan. `-1` means unlimited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub messages_per_day: i64,
    pub api_calls_per_day: i64,
}

/// Feature set and limits of one plan tier. `-1` means unlimited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRule {
    pub max_conversations: i64,
    pub max_bots: i64,
    #[serde(default)]
    pub features: Vec<String>,
    pub limits: PlanLimits,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessConfig {
    #[serde(default)]
    pub unknown_action_policy: UnknownActionPolicy,

    /// Plan tiers keyed by plan identifier
    #[serde(default = "default_plans")]
    pub plans: BTreeMap<String, PlanRule>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The built-in starter / pro / enterprise tiers.
pub fn default_plans() -> BTreeMap<String, PlanRule> {
    let mut plans = BTreeMap::new();
    plans.insert(
        "starter".into(),
        PlanRule {
            max_conversations: 1_000,
            max_bots: 3,
            features: strings(&["basic_chat", "email_support", "analytics_basic"]),
            limits: PlanLimits {
                messages_per_day: 500,
                api_calls_per_day: 1_000,
            },
        },
    );
    plans.insert(
        "pro".into(),
        PlanRule {
            max_conversations: 10_000,
            max_bots: 10,
            features: strings(&[
                "basic_chat",
                "advanced_ai",
                "priority_support",
                "analytics_advanced",
                "custom_integrations",
            ]),
            limits: PlanLimits {
                messages_per_day: 5_000,
                api_calls_per_day: 10_000,
            },
        },
    );
    plans.insert(
        "enterprise".into(),
        PlanRule {
            max_conversations: -1,
            max_bots: -1,
            features: strings(&[
                "all_features",
                "dedicated_support",
                "custom_models",
                "white_label",
            ]),
            limits: PlanLimits {
                messages_per_day: -1,
                api_calls_per_day: -1,
            },
        },
    );
    plans
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            unknown_action_policy: UnknownActionPolicy::default(),
            plans: default_plans(),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from the default path (~/.botloom/config.toml).
    ///
    /// Also checks environment variables:
    /// - `BOTLOOM_API_KEY` / `OPENAI_API_KEY` for the model key
    /// - `BOTLOOM_MODEL` to override the model name
    /// - `BOTLOOM_VECTOR_PROVIDER` to override the vector backend
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if self.model.api_key.is_none() {
            self.model.api_key = std::env::var("BOTLOOM_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("BOTLOOM_MODEL") {
            self.model.name = model;
        }

        if let Ok(provider) = std::env::var("BOTLOOM_VECTOR_PROVIDER") {
            self.vector_store.provider = provider;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".botloom")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vector_store.dimensions == 0 {
            return Err(ConfigError::ValidationError(
                "vector_store.dimensions must be > 0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.retrieval.similarity_threshold) {
            return Err(ConfigError::ValidationError(
                "retrieval.similarity_threshold must be between 0.0 and 1.0".into(),
            ));
        }

        if self.model.temperature < 0.0 || self.model.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "model.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.prompt.history_window == 0 {
            return Err(ConfigError::ValidationError(
                "prompt.history_window must be > 0".into(),
            ));
        }

        if self.business.plans.is_empty() {
            return Err(ConfigError::ValidationError(
                "business.plans must define at least one plan".into(),
            ));
        }

        Ok(())
    }

    /// Copy with every API key replaced by a placeholder, for printing.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        for key in [&mut config.model.api_key, &mut config.vector_store.api_key] {
            if key.is_some() {
                *key = Some(redact(key).into());
            }
        }
        config
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            vector_store: VectorStoreConfig::default(),
            retrieval: RetrievalConfig::default(),
            model: ModelConfig::default(),
            orchestrator: OrchestratorConfig::default(),
            prompt: PromptConfig::default(),
            business: BusinessConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
