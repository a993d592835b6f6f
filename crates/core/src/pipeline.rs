//! Request/response contracts of the conversational pipeline.

use serde::{Deserialize, Serialize};

use crate::business::BusinessAction;
use crate::content::ContentType;

/// One prior exchange in a chat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user_message: String,
    pub assistant_response: String,
}

impl ConversationTurn {
    pub fn new(user_message: impl Into<String>, assistant_response: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            assistant_response: assistant_response.into(),
        }
    }
}

/// Caller-supplied account facts that override the account source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Optional per-request context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    /// Recent turns of the current session, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<ConversationTurn>,

    #[serde(default)]
    pub account: AccountHints,

    /// Industry the bot operates in (healthcare, finance, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_description: Option<String>,
}

/// A single inbound chat message to answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIRequest {
    pub message: String,
    pub account_id: String,
    pub session_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<RequestContext>,
}

impl AIRequest {
    pub fn new(
        message: impl Into<String>,
        account_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            account_id: account_id.into(),
            session_id: session_id.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Account hints, or empty hints when no context was supplied.
    pub fn account_hints(&self) -> AccountHints {
        self.context
            .as_ref()
            .map(|c| c.account.clone())
            .unwrap_or_default()
    }
}

/// The structured answer returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIResponse {
    pub text: String,
    pub confidence: f32,
    pub sources: Vec<String>,
    pub actions: Vec<BusinessAction>,
    pub model: String,
    pub processing_time_ms: u64,
    /// Prompt + completion token estimate
    pub tokens_used: u32,
}

/// Result count for one retrieval partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionStats {
    pub content_type: ContentType,
    pub results: usize,
    pub confidence: f32,
}

/// Which partitions contributed to a retrieval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalMetadata {
    pub sections: Vec<SectionStats>,
}

impl RetrievalMetadata {
    pub fn results_for(&self, content_type: ContentType) -> usize {
        self.sections
            .iter()
            .filter(|s| s.content_type == content_type)
            .map(|s| s.results)
            .sum()
    }
}

/// Aggregated output of one retrieval call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalContext {
    /// Labelled sections joined into one block
    pub text: String,
    /// Source identifiers, deduplicated, first-seen order
    pub sources: Vec<String>,
    /// Max confidence across contributing partitions
    pub confidence: f32,
    pub metadata: RetrievalMetadata,
}

impl RetrievalContext {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_without_context_has_empty_hints() {
        let req = AIRequest::new("hi", "u1", "s1");
        assert_eq!(req.account_hints(), AccountHints::default());
    }

    #[test]
    fn request_deserializes_without_context() {
        let json = r#"{"message":"hi","account_id":"u1","session_id":"s1"}"#;
        let req: AIRequest = serde_json::from_str(json).unwrap();
        assert!(req.context.is_none());
    }

    #[test]
    fn metadata_counts_by_type() {
        let meta = RetrievalMetadata {
            sections: vec![
                SectionStats {
                    content_type: ContentType::KnowledgeBase,
                    results: 3,
                    confidence: 0.9,
                },
                SectionStats {
                    content_type: ContentType::BusinessData,
                    results: 1,
                    confidence: 0.8,
                },
            ],
        };
        assert_eq!(meta.results_for(ContentType::KnowledgeBase), 3);
        assert_eq!(meta.results_for(ContentType::ConversationHistory), 0);
    }
}
