//! Prompt assembly from templates.
//!
//! | Section | Input | Omitted when |
//! |---------|-------|--------------|
//! | System | persona name and description | never |
//! | Guidance | variant and industry blocks | base variant, unknown industry |
//! | Context | retrieved text | empty |
//! | Business | account block | empty |
//! | History | last N turns | no turns |
//! | User | current message | never |

pub mod assembler;
pub mod templates;
pub mod variants;

pub use assembler::{PromptAssembler, PromptContext, ASSISTANT_MARKER};
pub use templates::{render, PromptTemplates};
pub use variants::{industry_instructions, PromptVariant};
