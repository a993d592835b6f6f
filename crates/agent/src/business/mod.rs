//! Business rules engine.
//!
//! Plan-tier lookups, per-request account context, action extraction and
//! dispatch, and usage-limit checks. The plan table, matcher list and
//! handler registry are all handed in at construction; nothing here is
//! global.

pub mod accounts;
pub mod actions;

pub use accounts::InMemoryAccountSource;
pub use actions::{default_matchers, ActionMatcher, ActionRegistry, StubActionHandler};

use std::sync::Arc;

use botloom_config::{BusinessConfig, PlanRule, UnknownActionPolicy};
use botloom_core::business::{AccountSource, ActionOutcome, BusinessAction, BusinessContext};
use botloom_core::error::BusinessError;
use botloom_core::pipeline::AccountHints;
use tracing::{debug, warn};

/// Feature name that grants every feature.
const ALL_FEATURES: &str = "all_features";

pub struct BusinessRulesEngine {
    config: BusinessConfig,
    accounts: Arc<dyn AccountSource>,
    matchers: Vec<ActionMatcher>,
    registry: ActionRegistry,
}

impl BusinessRulesEngine {
    /// Engine with the default matchers and a stub handler for every action.
    pub fn new(config: BusinessConfig, accounts: Arc<dyn AccountSource>) -> Self {
        Self {
            config,
            accounts,
            matchers: default_matchers(),
            registry: ActionRegistry::with_stub_handlers(),
        }
    }

    pub fn with_matchers(mut self, matchers: Vec<ActionMatcher>) -> Self {
        self.matchers = matchers;
        self
    }

    pub fn with_registry(mut self, registry: ActionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Rules for a plan tier, if the tier exists.
    pub fn plan_limits(&self, plan: &str) -> Option<&PlanRule> {
        self.config.plans.get(plan)
    }

    pub fn has_feature(&self, plan: &str, feature: &str) -> bool {
        self.plan_limits(plan).is_some_and(|rule| {
            rule.features
                .iter()
                .any(|f| f == feature || f == ALL_FEATURES)
        })
    }

    /// Fetch an account snapshot with caller hints applied on top.
    pub async fn fetch_context(
        &self,
        account_id: &str,
        hints: Option<&AccountHints>,
    ) -> Result<BusinessContext, BusinessError> {
        let mut context = self.accounts.fetch(account_id).await?;
        if let Some(hints) = hints {
            if let Some(plan) = &hints.plan {
                context.plan = plan.clone();
            }
            if let Some(role) = &hints.role {
                context.role = role.clone();
            }
        }
        Ok(context)
    }

    /// Account context rendered for the prompt. Empty when the account
    /// cannot be fetched.
    pub async fn get_context(&self, account_id: &str, hints: Option<&AccountHints>) -> String {
        match self.fetch_context(account_id, hints).await {
            Ok(context) => self.render_context(&context),
            Err(e) => {
                warn!(account_id, error = %e, source = self.accounts.name(), "Business context unavailable");
                String::new()
            }
        }
    }

    /// Flat text block: plan, features, limits, role, permissions,
    /// subscription status, usage.
    pub fn render_context(&self, context: &BusinessContext) -> String {
        let mut lines = vec![format!("Plan: {}", context.plan)];

        match self.plan_limits(&context.plan) {
            Some(rule) => {
                lines.push(format!("Features: {}", list_or_none(&rule.features)));
                lines.push(format!(
                    "Limits: {} conversations, {} bots, {} messages/day, {} API calls/day",
                    fmt_limit(rule.max_conversations),
                    fmt_limit(rule.max_bots),
                    fmt_limit(rule.limits.messages_per_day),
                    fmt_limit(rule.limits.api_calls_per_day),
                ));
            }
            None => lines.push("Features: none".into()),
        }

        lines.push(format!("Role: {}", context.role));
        lines.push(format!("Permissions: {}", list_or_none(&context.permissions)));
        lines.push(format!("Subscription: {}", context.subscription_status));
        lines.push(format!(
            "Usage: {} conversations, {} bots, {} messages today, {} API calls today",
            context.usage.conversations,
            context.usage.bots,
            context.usage.messages_today,
            context.usage.api_calls_today,
        ));

        lines.join("\n")
    }

    /// Actions implied by generated text.
    pub fn extract_actions(&self, text: &str, account_id: &str) -> Vec<BusinessAction> {
        actions::extract_actions(&self.matchers, text, account_id)
    }

    /// Dispatch actions concurrently; each outcome is independent.
    pub async fn execute_actions(
        &self,
        actions: &[BusinessAction],
        account_id: &str,
    ) -> Vec<ActionOutcome> {
        self.registry.execute_all(actions, account_id).await
    }

    /// Whether the account may perform `action` under its plan limits.
    ///
    /// `create_bot` and `send_message` are checked against usage; other
    /// names follow the configured unknown-action policy.
    pub async fn validate_user_action(&self, account_id: &str, action: &str) -> bool {
        let context = match self.accounts.fetch(account_id).await {
            Ok(c) => c,
            Err(e) => {
                warn!(account_id, action, error = %e, "Cannot validate action");
                return false;
            }
        };

        let allowed = match action {
            "create_bot" | "send_message" => {
                let Some(rule) = self.plan_limits(&context.plan) else {
                    warn!(account_id, plan = %context.plan, "Unknown plan");
                    return false;
                };
                if action == "create_bot" {
                    within_limit(rule.max_bots, context.usage.bots)
                } else {
                    within_limit(rule.limits.messages_per_day, context.usage.messages_today)
                }
            }
            _ => self.config.unknown_action_policy == UnknownActionPolicy::Allow,
        };

        debug!(account_id, action, allowed, "Action validated");
        allowed
    }
}

fn within_limit(limit: i64, used: u64) -> bool {
    limit < 0 || i64::try_from(used).is_ok_and(|used| used < limit)
}

fn fmt_limit(limit: i64) -> String {
    if limit < 0 {
        "unlimited".into()
    } else {
        limit.to_string()
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".into()
    } else {
        items.join(", ")
    }
}
