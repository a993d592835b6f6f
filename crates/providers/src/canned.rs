//! Canned model: keyword-triggered responses with simulated latency.
//!
//! Stands in for a real inference backend during development and demos.
//! The latest user message in the prompt is matched against an ordered
//! rule table; the first rule with a matching keyword wins.

use async_trait::async_trait;
use botloom_core::error::ModelError;
use botloom_core::model::{FinishReason, Generation, GenerationContext, ModelAdapter, TokenUsage};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Marker the prompt assembler puts in front of the current user message.
const USER_MARKER: &str = "user:";
/// Marker that closes the prompt.
const ASSISTANT_MARKER: &str = "assistant:";

/// One entry of the response table.
#[derive(Debug, Clone)]
pub struct CannedRule {
    /// Any of these (lower-case) substrings triggers the rule
    pub keywords: Vec<String>,
    pub response: String,
}

impl CannedRule {
    pub fn new(keywords: &[&str], response: impl Into<String>) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            response: response.into(),
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

/// A model adapter that answers from a fixed table.
pub struct CannedModel {
    name: String,
    rules: Vec<CannedRule>,
    fallback: String,
    latency: Duration,
}

impl CannedModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Self::default_rules(),
            fallback: "Thanks for reaching out! Could you tell me a bit more about what you need so I can point you in the right direction?".into(),
            latency: Duration::ZERO,
        }
    }

    /// Replace the response table.
    pub fn with_rules(mut self, rules: Vec<CannedRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Artificial delay applied to every generation.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// The built-in support/sales table.
    pub fn default_rules() -> Vec<CannedRule> {
        vec![
            CannedRule::new(
                &["upgrade"],
                "I can help you upgrade your plan. The Pro plan adds advanced AI, priority support and up to 10 bots.",
            ),
            CannedRule::new(
                &["appointment", "book"],
                "I'd be happy to schedule an appointment for you. What day and time work best?",
            ),
            CannedRule::new(
                &["meeting", "demo"],
                "Let's schedule a meeting with our team. I'll send over a few available slots.",
            ),
            CannedRule::new(
                &["price", "pricing", "cost"],
                "Our plans start with Starter for small teams, Pro for growing businesses, and Enterprise with unlimited usage.",
            ),
            CannedRule::new(
                &["bug", "error", "broken", "problem"],
                "Sorry about the trouble. I can create a ticket for our support team so they can look into the problem.",
            ),
            CannedRule::new(
                &["api", "webhook", "integration"],
                "Our REST API and webhooks let you connect bots to your own systems. You can find your API key under Settings.",
            ),
            CannedRule::new(
                &["hello", "hi ", "hey"],
                "Hello! How can I help you today?",
            ),
        ]
    }

    /// The current user message: the text between the last user marker and
    /// the trailing assistant marker. Falls back to the whole prompt.
    fn last_user_message(prompt: &str) -> String {
        let lower = prompt.to_lowercase();
        let start = lower
            .rfind(USER_MARKER)
            .map(|i| i + USER_MARKER.len())
            .unwrap_or(0);
        let end = lower[start..]
            .rfind(ASSISTANT_MARKER)
            .map(|i| start + i)
            .unwrap_or(lower.len());
        lower[start..end].trim().to_string()
    }

    fn respond(&self, user_message: &str) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.matches(user_message))
            .map(|rule| rule.response.as_str())
            .unwrap_or(self.fallback.as_str())
    }

    fn estimate_tokens(text: &str) -> u32 {
        text.len().div_ceil(4) as u32
    }
}

#[async_trait]
impl ModelAdapter for CannedModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn initialize(&self) -> Result<(), ModelError> {
        info!(model = %self.name, rules = self.rules.len(), "Canned model ready");
        Ok(())
    }

    async fn generate(
        &self,
        prompt: &str,
        _context: &GenerationContext,
    ) -> Result<Generation, ModelError> {
        let started = Instant::now();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let user_message = Self::last_user_message(prompt);
        let text = self.respond(&user_message).to_string();
        debug!(model = %self.name, chars = text.len(), "Canned response selected");

        let prompt_tokens = Self::estimate_tokens(prompt);
        let completion_tokens = Self::estimate_tokens(&text);

        Ok(Generation {
            text,
            usage: Some(TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }),
            finish_reason: FinishReason::Stop,
            latency_ms: started.elapsed().as_millis() as u64,
            model: self.name.clone(),
        })
    }
}
