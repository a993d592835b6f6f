//! Action extraction and dispatch.
//!
//! Extraction is an ordered list of [`ActionMatcher`]s evaluated against the
//! lower-cased response text. Every matcher is checked independently, so one
//! response may yield several actions. Dispatch goes through an
//! [`ActionRegistry`] of [`ActionHandler`]s keyed by [`ActionType`].

use std::collections::HashMap;

use async_trait::async_trait;
use botloom_core::business::{ActionHandler, ActionOutcome, ActionType, BusinessAction};
use botloom_core::error::BusinessError;
use futures::future::join_all;
use tracing::{debug, info, warn};

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// A predicate over response text paired with the action it implies.
pub struct ActionMatcher {
    action_type: ActionType,
    priority: u8,
    requires_confirmation: bool,
    predicate: Predicate,
}

impl ActionMatcher {
    pub fn new(
        action_type: ActionType,
        priority: u8,
        requires_confirmation: bool,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            action_type,
            priority,
            requires_confirmation,
            predicate: Box::new(predicate),
        }
    }

    /// Matches when every keyword occurs in the text.
    pub fn all_of(
        action_type: ActionType,
        priority: u8,
        requires_confirmation: bool,
        keywords: &[&str],
    ) -> Self {
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        Self::new(action_type, priority, requires_confirmation, move |text| {
            keywords.iter().all(|k| text.contains(k.as_str()))
        })
    }

    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    /// `lower` must already be lower-cased.
    pub fn matches(&self, lower: &str) -> bool {
        (self.predicate)(lower)
    }

    fn descriptor(&self, account_id: &str) -> BusinessAction {
        let mut parameters = serde_json::Map::new();
        parameters.insert("account_id".into(), account_id.into());
        BusinessAction {
            action_type: self.action_type,
            parameters,
            priority: self.priority,
            requires_confirmation: self.requires_confirmation,
        }
    }
}

impl std::fmt::Debug for ActionMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionMatcher")
            .field("action_type", &self.action_type)
            .field("priority", &self.priority)
            .field("requires_confirmation", &self.requires_confirmation)
            .finish_non_exhaustive()
    }
}

/// The built-in keyword co-occurrence table.
pub fn default_matchers() -> Vec<ActionMatcher> {
    vec![
        ActionMatcher::all_of(ActionType::CreateAppointment, 1, true, &["schedule", "appointment"]),
        ActionMatcher::all_of(ActionType::SendEmail, 2, true, &["send", "email"]),
        ActionMatcher::all_of(ActionType::UpgradePlan, 1, true, &["upgrade", "plan"]),
        ActionMatcher::all_of(ActionType::UpdateProfile, 3, false, &["update", "profile"]),
        ActionMatcher::all_of(ActionType::ScheduleMeeting, 2, true, &["schedule", "meeting"]),
        ActionMatcher::new(ActionType::CreateTicket, 2, false, |text| {
            (text.contains("create") || text.contains("open")) && text.contains("ticket")
        }),
    ]
}

/// Run every matcher over `text` and collect the implied actions.
pub fn extract_actions(
    matchers: &[ActionMatcher],
    text: &str,
    account_id: &str,
) -> Vec<BusinessAction> {
    let lower = text.to_lowercase();
    let actions: Vec<BusinessAction> = matchers
        .iter()
        .filter(|m| m.matches(&lower))
        .map(|m| m.descriptor(account_id))
        .collect();

    if !actions.is_empty() {
        debug!(
            account_id,
            actions = ?actions.iter().map(|a| a.action_type.as_str()).collect::<Vec<_>>(),
            "Actions extracted"
        );
    }
    actions
}

/// Handler that only logs and reports success. Stands in for the real
/// integrations (calendar, mailer, billing, ...).
pub struct StubActionHandler {
    action_type: ActionType,
}

impl StubActionHandler {
    pub fn new(action_type: ActionType) -> Self {
        Self { action_type }
    }
}

#[async_trait]
impl ActionHandler for StubActionHandler {
    fn action_type(&self) -> ActionType {
        self.action_type
    }

    async fn handle(
        &self,
        action: &BusinessAction,
        account_id: &str,
    ) -> Result<String, BusinessError> {
        info!(
            action = %action.action_type,
            account_id,
            requires_confirmation = action.requires_confirmation,
            "Action handled"
        );
        Ok(format!("{} accepted", action.action_type))
    }
}

/// Handlers keyed by action type.
pub struct ActionRegistry {
    handlers: HashMap<ActionType, Box<dyn ActionHandler>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// A registry with a [`StubActionHandler`] for every action type.
    pub fn with_stub_handlers() -> Self {
        let mut registry = Self::new();
        for action_type in ActionType::ALL {
            registry.register(Box::new(StubActionHandler::new(action_type)));
        }
        registry
    }

    /// Register a handler. Replaces any existing handler for the same type.
    pub fn register(&mut self, handler: Box<dyn ActionHandler>) {
        self.handlers.insert(handler.action_type(), handler);
    }

    pub fn get(&self, action_type: ActionType) -> Option<&dyn ActionHandler> {
        self.handlers.get(&action_type).map(|h| h.as_ref())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Execute one action. Never fails; errors become a failed outcome.
    pub async fn execute(&self, action: &BusinessAction, account_id: &str) -> ActionOutcome {
        let result = match self.get(action.action_type) {
            Some(handler) => handler.handle(action, account_id).await,
            None => Err(BusinessError::NoHandler(action.action_type.to_string())),
        };

        match result {
            Ok(message) => ActionOutcome {
                action: action.clone(),
                success: true,
                message,
            },
            Err(e) => {
                warn!(action = %action.action_type, account_id, error = %e, "Action failed");
                ActionOutcome {
                    action: action.clone(),
                    success: false,
                    message: e.to_string(),
                }
            }
        }
    }

    /// Execute a batch concurrently. Outcomes keep the input order.
    pub async fn execute_all(
        &self,
        actions: &[BusinessAction],
        account_id: &str,
    ) -> Vec<ActionOutcome> {
        join_all(actions.iter().map(|a| self.execute(a, account_id))).await
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
