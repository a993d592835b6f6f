//! Model adapter trait, the abstraction over text-generation backends.
//!
//! A [`ModelAdapter`] turns an assembled prompt into generated text plus
//! usage metadata. The orchestrator never knows which backend it talks to.
//!
//! Implementations: canned keyword responder, OpenAI-compatible HTTP.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Per-request generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationContext {
    /// Account the generation is performed for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for GenerationContext {
    fn default() -> Self {
        Self {
            account_id: None,
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Why generation stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    #[default]
    Stop,
    Length,
    ContentFilter,
}

/// A completed generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,

    #[serde(default)]
    pub finish_reason: FinishReason,

    /// Backend-reported or measured latency
    pub latency_ms: u64,

    /// Which model actually responded
    pub model: String,
}

/// The core ModelAdapter trait.
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Model identifier reported in responses (e.g. "llama-3-8b-sim").
    fn name(&self) -> &str;

    /// Prepare the backend. Called once before the first `generate`.
    async fn initialize(&self) -> std::result::Result<(), ModelError> {
        Ok(())
    }

    /// Generate a completion for a fully assembled prompt.
    async fn generate(
        &self,
        prompt: &str,
        context: &GenerationContext,
    ) -> std::result::Result<Generation, ModelError>;

    /// Can we reach the backend?
    async fn health_check(&self) -> std::result::Result<bool, ModelError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoModel;

    #[async_trait]
    impl ModelAdapter for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(
            &self,
            prompt: &str,
            _context: &GenerationContext,
        ) -> Result<Generation, ModelError> {
            Ok(Generation {
                text: prompt.to_string(),
                usage: None,
                finish_reason: FinishReason::Stop,
                latency_ms: 0,
                model: "echo".into(),
            })
        }
    }

    #[test]
    fn generation_context_defaults() {
        let ctx = GenerationContext::default();
        assert!((ctx.temperature - 0.7).abs() < f32::EPSILON);
        assert!(ctx.max_tokens.is_none());
    }

    #[tokio::test]
    async fn default_initialize_and_health_succeed() {
        let model = EchoModel;
        assert!(model.initialize().await.is_ok());
        assert!(model.health_check().await.unwrap());
        let out = model.generate("hi", &GenerationContext::default()).await.unwrap();
        assert_eq!(out.text, "hi");
        assert_eq!(out.finish_reason, FinishReason::Stop);
    }
}
