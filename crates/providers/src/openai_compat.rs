//! OpenAI-compatible model adapter.
//!
//! Works with: OpenAI, OpenRouter, Ollama, vLLM, Together AI and any
//! endpoint exposing `/v1/chat/completions`. The assembled prompt is sent
//! as a single user message; the pipeline has already folded persona,
//! context and history into it.

use async_trait::async_trait;
use botloom_core::error::ModelError;
use botloom_core::model::{FinishReason, Generation, GenerationContext, ModelAdapter, TokenUsage};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// A chat-completions model adapter.
pub struct OpenAiCompatModel {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCompatModel {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }

    /// Create an Ollama adapter (convenience constructor).
    pub fn ollama(base_url: Option<&str>, model: impl Into<String>) -> Self {
        Self::new(
            base_url.unwrap_or("http://localhost:11434/v1"),
            "ollama", // Ollama doesn't need a real key
            model,
        )
    }

    fn request_body(&self, prompt: &str, context: &GenerationContext) -> ApiRequest {
        ApiRequest {
            model: self.model.clone(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: Some(prompt.to_string()),
            }],
            temperature: context.temperature,
            max_tokens: context.max_tokens,
            stream: false,
        }
    }

    fn map_status(status: u16, body: String) -> ModelError {
        match status {
            429 => ModelError::RateLimited { retry_after_secs: 5 },
            401 | 403 => ModelError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ),
            _ => ModelError::ApiError {
                status_code: status,
                message: body,
            },
        }
    }

    fn finish_reason(raw: Option<&str>) -> FinishReason {
        match raw {
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        }
    }
}

#[async_trait]
impl ModelAdapter for OpenAiCompatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn initialize(&self) -> Result<(), ModelError> {
        if self.api_key.is_empty() {
            return Err(ModelError::InitializationFailed(
                "empty API key".into(),
            ));
        }
        Ok(())
    }

    async fn generate(
        &self,
        prompt: &str,
        context: &GenerationContext,
    ) -> Result<Generation, ModelError> {
        let url = format!("{}/chat/completions", self.base_url);
        let started = Instant::now();

        debug!(model = %self.model, prompt_chars = prompt.len(), "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.request_body(prompt, context))
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Model backend returned error");
            return Err(Self::map_status(status, error_body));
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| ModelError::ApiError {
            status_code: 200,
            message: format!("Failed to parse response: {e}"),
        })?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        Ok(Generation {
            text: choice.message.content.unwrap_or_default(),
            usage: api_response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: Self::finish_reason(choice.finish_reason.as_deref()),
            latency_ms: started.elapsed().as_millis() as u64,
            model: api_response.model,
        })
    }

    async fn health_check(&self) -> Result<bool, ModelError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;
        Ok(response.status().is_success())
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ApiMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
