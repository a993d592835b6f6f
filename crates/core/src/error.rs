//! Error types for the botloom domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all botloom operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Embedding store errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Model adapter errors ---
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    // --- Business rules errors ---
    #[error("Business error: {0}")]
    Business(#[from] BusinessError),

    // --- Prompt rendering errors ---
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Lifecycle ---
    #[error("Component not initialized: {0}")]
    NotInitialized(String),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum MemoryError {
    #[error("Embedding store is not initialized")]
    NotInitialized,

    #[error("Unknown vector provider: {0}")]
    UnknownProvider(String),

    #[error("Embedding has {actual} dimensions, store expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Connection to vector backend failed: {0}")]
    Connection(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by model backend, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not configured: {0}")]
    NotConfigured(String),

    #[error("Model initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Generation timed out after {0}ms")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum BusinessError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Unknown plan: {0}")]
    UnknownPlan(String),

    #[error("No handler registered for action {0}")]
    NoHandler(String),

    #[error("Action {action} failed: {reason}")]
    HandlerFailed { action: String, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum PromptError {
    #[error("Unclosed placeholder in template '{template}'")]
    UnclosedPlaceholder { template: String },

    #[error("Unknown placeholder '{{{placeholder}}}' in template '{template}'")]
    UnknownPlaceholder { template: String, placeholder: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_error_displays_correctly() {
        let err = Error::Model(ModelError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn dimension_mismatch_names_both_sizes() {
        let err = Error::from(MemoryError::DimensionMismatch {
            expected: 1536,
            actual: 3,
        });
        let text = err.to_string();
        assert!(text.contains("1536"));
        assert!(text.contains('3'));
    }

    #[test]
    fn unknown_placeholder_shows_braces() {
        let err = PromptError::UnknownPlaceholder {
            template: "system".into(),
            placeholder: "mood".into(),
        };
        assert!(err.to_string().contains("{mood}"));
    }
}
