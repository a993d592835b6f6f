//! # botloom Core
//!
//! Domain types, traits, and error definitions for the botloom
//! conversational-response pipeline. This crate does no I/O: it defines the
//! domain model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Each collaborator of the pipeline is a trait here:
//! - [`ModelAdapter`]: text generation backend
//! - [`AccountSource`]: per-account business data
//! - [`ActionHandler`]: side effects for extracted business actions
//!
//! Implementations live in their respective crates, so any of them can be
//! swapped via configuration or replaced by stubs in tests.

pub mod business;
pub mod content;
pub mod error;
pub mod model;
pub mod pipeline;

// Re-export key types at crate root for ergonomics
pub use business::{
    AccountSource, ActionHandler, ActionOutcome, ActionType, BusinessAction, BusinessContext,
    UsageStats,
};
pub use content::{ContentItem, ContentMetadata, ContentType, SearchFilters, SimilarityResult};
pub use error::{BusinessError, Error, MemoryError, ModelError, PromptError, Result};
pub use model::{FinishReason, Generation, GenerationContext, ModelAdapter, TokenUsage};
pub use pipeline::{
    AIRequest, AIResponse, AccountHints, ConversationTurn, RequestContext, RetrievalContext,
    RetrievalMetadata, SectionStats,
};
