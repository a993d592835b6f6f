//! The botloom response pipeline.
//!
//! A request moves through four components:
//!
//! 1. **Retrieve** labelled context from the embedding store ([`ContextRetriever`])
//! 2. **Fetch** the account's plan and usage ([`BusinessRulesEngine`])
//! 3. **Assemble** a prompt from templates ([`PromptAssembler`])
//! 4. **Generate**, then extract and execute business actions ([`Orchestrator`])
//!
//! The orchestrator owns the wiring and the lifecycle; each component is
//! usable and testable on its own.

pub mod business;
pub mod orchestrator;
pub mod prompt;
pub mod retrieval;
pub mod token;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use business::{
    ActionMatcher, ActionRegistry, BusinessRulesEngine, InMemoryAccountSource, StubActionHandler,
};
pub use orchestrator::{HealthReport, Orchestrator, OrchestratorState, STREAM_APOLOGY};
pub use prompt::{PromptAssembler, PromptContext, PromptTemplates, PromptVariant};
pub use retrieval::ContextRetriever;
