//! Prompt assembly.
//!
//! Section order: system, (variant/industry guidance), context, business,
//! history, user, then a trailing `assistant:` marker. Sections whose
//! input is empty are left out entirely.
//!
//! # Determinism
//!
//! Identical inputs always produce byte-identical prompts. No random or
//! time-dependent logic is used during assembly.

use botloom_config::PromptConfig;
use botloom_core::error::PromptError;
use botloom_core::pipeline::ConversationTurn;
use tracing::warn;

use super::templates::{render, PromptTemplates};
use super::variants::{industry_instructions, PromptVariant};

/// Marker closing every prompt.
pub const ASSISTANT_MARKER: &str = "assistant:";

/// Everything the assembler needs for one prompt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptContext {
    pub user_message: String,
    /// Labelled retrieval block; empty when nothing was retrieved
    pub retrieved_context: String,
    /// Rendered account block; empty when unavailable
    pub business_context: String,
    /// Prior turns, oldest first
    pub history: Vec<ConversationTurn>,
    pub persona_name: Option<String>,
    pub persona_description: Option<String>,
}

impl PromptContext {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            ..Self::default()
        }
    }

    pub fn with_retrieved_context(mut self, text: impl Into<String>) -> Self {
        self.retrieved_context = text.into();
        self
    }

    pub fn with_business_context(mut self, text: impl Into<String>) -> Self {
        self.business_context = text.into();
        self
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }
}

pub struct PromptAssembler {
    templates: PromptTemplates,
    config: PromptConfig,
}

impl PromptAssembler {
    pub fn new(config: PromptConfig) -> Self {
        Self::with_templates(config, PromptTemplates::default())
    }

    pub fn with_templates(config: PromptConfig, templates: PromptTemplates) -> Self {
        Self { templates, config }
    }

    /// The base prompt.
    pub fn build_prompt(&self, ctx: &PromptContext) -> String {
        self.build_with(ctx, &[])
    }

    /// Base prompt with the support guidelines placed directly after the
    /// system section. The sales and technical builders place their blocks
    /// the same way.
    pub fn build_customer_support_prompt(&self, ctx: &PromptContext) -> String {
        self.build_for(PromptVariant::CustomerSupport, ctx)
    }

    /// Sales guidelines after the system section.
    pub fn build_sales_prompt(&self, ctx: &PromptContext) -> String {
        self.build_for(PromptVariant::Sales, ctx)
    }

    /// Technical guidelines after the system section.
    pub fn build_technical_prompt(&self, ctx: &PromptContext) -> String {
        self.build_for(PromptVariant::Technical, ctx)
    }

    pub fn select_prompt_template(&self, message: &str) -> PromptVariant {
        PromptVariant::select(message)
    }

    pub fn build_for(&self, variant: PromptVariant, ctx: &PromptContext) -> String {
        let blocks: Vec<&str> = variant.instructions().into_iter().collect();
        self.build_with(ctx, &blocks)
    }

    /// Base prompt with the industry's guidance after the system section.
    /// Unknown industries get the base prompt unchanged.
    pub fn customize_for_industry(&self, industry: &str, ctx: &PromptContext) -> String {
        let blocks: Vec<&str> = industry_instructions(industry).into_iter().collect();
        self.build_with(ctx, &blocks)
    }

    /// Variant and optional industry guidance in one prompt.
    pub fn build_request_prompt(
        &self,
        variant: PromptVariant,
        industry: Option<&str>,
        ctx: &PromptContext,
    ) -> String {
        let blocks: Vec<&str> = variant
            .instructions()
            .into_iter()
            .chain(industry.and_then(industry_instructions))
            .collect();
        self.build_with(ctx, &blocks)
    }

    /// Build with extra guidance blocks after the system section. Never
    /// fails: a broken template degrades to the bare user message.
    fn build_with(&self, ctx: &PromptContext, guidance: &[&str]) -> String {
        match self.try_build(ctx, guidance) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(error = %e, "Prompt assembly failed, using minimal prompt");
                Self::fallback(&ctx.user_message)
            }
        }
    }

    fn try_build(&self, ctx: &PromptContext, guidance: &[&str]) -> Result<String, PromptError> {
        let name = ctx
            .persona_name
            .as_deref()
            .unwrap_or(self.config.persona_name.as_str());
        let persona = ctx
            .persona_description
            .as_deref()
            .unwrap_or(self.config.persona_description.as_str());

        let mut sections = vec![render(
            &self.templates.system,
            &[("name", name), ("persona", persona)],
        )?];
        sections.extend(guidance.iter().map(|g| g.to_string()));

        if !ctx.retrieved_context.trim().is_empty() {
            sections.push(render(
                &self.templates.context,
                &[("context", ctx.retrieved_context.as_str())],
            )?);
        }

        if !ctx.business_context.trim().is_empty() {
            sections.push(render(
                &self.templates.business,
                &[("business", ctx.business_context.as_str())],
            )?);
        }

        let history = self.render_history(&ctx.history);
        if !history.is_empty() {
            sections.push(render(&self.templates.history, &[("history", history.as_str())])?);
        }

        sections.push(render(
            &self.templates.user,
            &[("message", ctx.user_message.as_str())],
        )?);
        sections.push(ASSISTANT_MARKER.to_string());

        Ok(sections.join("\n\n"))
    }

    /// The last `history_window` turns, oldest first.
    fn render_history(&self, history: &[ConversationTurn]) -> String {
        let skip = history.len().saturating_sub(self.config.history_window);
        history[skip..]
            .iter()
            .map(|turn| {
                format!(
                    "User: {}\nAssistant: {}",
                    turn.user_message, turn.assistant_response
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Minimal prompt used when templates fail to render.
    pub fn fallback(message: &str) -> String {
        format!("user: {message}\n{ASSISTANT_MARKER}")
    }
}
