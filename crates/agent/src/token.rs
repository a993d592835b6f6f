//! Token estimation utilities.
//!
//! Uses a character-based heuristic: ~4 characters per token. Used when a
//! model adapter does not report usage.

use botloom_core::model::Generation;

/// Estimate the token count for a string.
///
/// Heuristic: 1 token ≈ 4 characters. Rounds up.
pub fn estimate_tokens(text: &str) -> u32 {
    text.len().div_ceil(4) as u32
}

/// Prompt + completion tokens for a finished generation.
///
/// Reported usage wins; otherwise both sides are estimated.
pub fn tokens_used(prompt: &str, generation: &Generation) -> u32 {
    match generation.usage {
        Some(usage) => usage.prompt_tokens + usage.completion_tokens,
        None => estimate_tokens(prompt) + estimate_tokens(&generation.text),
    }
}
