//! Business domain types: account snapshots and inferred actions.
//!
//! A [`BusinessContext`] is a read-mostly snapshot of one account, fetched
//! from an [`AccountSource`] for every request. A [`BusinessAction`] is an
//! intended side effect inferred from generated text; it is dispatched to
//! an [`ActionHandler`] immediately and never persisted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::BusinessError;

/// Current usage counters for an account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    #[serde(default)]
    pub conversations: u64,
    #[serde(default)]
    pub bots: u64,
    #[serde(default)]
    pub messages_today: u64,
    #[serde(default)]
    pub api_calls_today: u64,
}

/// Per-account snapshot used for prompt context and permission checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessContext {
    pub account_id: String,

    /// Plan tier identifier (e.g. "starter", "pro", "enterprise")
    pub plan: String,

    pub role: String,

    #[serde(default)]
    pub permissions: Vec<String>,

    /// e.g. "active", "trialing", "past_due"
    pub subscription_status: String,

    #[serde(default)]
    pub usage: UsageStats,

    #[serde(default)]
    pub preferences: serde_json::Map<String, serde_json::Value>,
}

impl BusinessContext {
    /// A fresh starter-plan account with no usage.
    pub fn starter(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            plan: "starter".into(),
            role: "user".into(),
            permissions: vec!["read".into(), "write".into()],
            subscription_status: "active".into(),
            usage: UsageStats::default(),
            preferences: serde_json::Map::new(),
        }
    }
}

/// The fixed set of actions the pipeline knows how to infer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    CreateAppointment,
    SendEmail,
    UpdateProfile,
    UpgradePlan,
    ScheduleMeeting,
    CreateTicket,
}

impl ActionType {
    pub const ALL: [ActionType; 6] = [
        Self::CreateAppointment,
        Self::SendEmail,
        Self::UpdateProfile,
        Self::UpgradePlan,
        Self::ScheduleMeeting,
        Self::CreateTicket,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateAppointment => "create_appointment",
            Self::SendEmail => "send_email",
            Self::UpdateProfile => "update_profile",
            Self::UpgradePlan => "upgrade_plan",
            Self::ScheduleMeeting => "schedule_meeting",
            Self::CreateTicket => "create_ticket",
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = BusinessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| BusinessError::NoHandler(s.to_string()))
    }
}

/// An intended side effect extracted from generated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessAction {
    #[serde(rename = "type")]
    pub action_type: ActionType,

    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,

    /// Lower runs first when a caller orders actions
    pub priority: u8,

    /// Whether the end user must confirm before the action takes effect
    pub requires_confirmation: bool,
}

/// The result of executing one action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub action: BusinessAction,
    pub success: bool,
    /// Handler message on success, error text on failure
    pub message: String,
}

/// Supplies account snapshots by ID.
///
/// The real implementation sits on top of the platform's account database;
/// it is outside this workspace. Tests and the CLI use an in-memory map.
#[async_trait]
pub trait AccountSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, account_id: &str) -> std::result::Result<BusinessContext, BusinessError>;
}

/// Performs the side effect for one [`ActionType`].
#[async_trait]
pub trait ActionHandler: Send + Sync {
    fn action_type(&self) -> ActionType;

    /// Execute the action for an account and return a short status message.
    async fn handle(
        &self,
        action: &BusinessAction,
        account_id: &str,
    ) -> std::result::Result<String, BusinessError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_type_round_trips_through_str() {
        for action in ActionType::ALL {
            assert_eq!(action.as_str().parse::<ActionType>().unwrap(), action);
        }
        assert!("launch_rocket".parse::<ActionType>().is_err());
    }

    #[test]
    fn action_serializes_type_tag() {
        let action = BusinessAction {
            action_type: ActionType::UpgradePlan,
            parameters: serde_json::Map::new(),
            priority: 1,
            requires_confirmation: true,
        };
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains(r#""type":"upgrade_plan""#));
        assert!(json.contains(r#""requires_confirmation":true"#));
    }

    #[test]
    fn starter_context_defaults() {
        let ctx = BusinessContext::starter("u1");
        assert_eq!(ctx.plan, "starter");
        assert_eq!(ctx.role, "user");
        assert_eq!(ctx.usage.bots, 0);
    }
}
