//! Content items, the unit stored in the embedding store.
//!
//! Every piece of retrievable text (knowledge-base articles, past
//! conversation turns, account data) is a [`ContentItem`] tagged with a
//! [`ContentType`] partition. Search results pair an item with its cosine
//! similarity to the query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The logical partition a content item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Curated help articles, FAQs, product docs
    KnowledgeBase,
    /// Past user/assistant turns for one account
    ConversationHistory,
    /// Plan, role and account-specific facts
    BusinessData,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KnowledgeBase => "knowledge_base",
            Self::ConversationHistory => "conversation_history",
            Self::BusinessData => "business_data",
        }
    }

    /// Human-readable section label used when rendering retrieved context.
    pub fn label(&self) -> &'static str {
        match self {
            Self::KnowledgeBase => "Knowledge Base",
            Self::ConversationHistory => "Conversation History",
            Self::BusinessData => "Business Context",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata attached to every content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentMetadata {
    /// Which partition this item lives in
    #[serde(rename = "type")]
    pub content_type: ContentType,

    /// Where the content came from (document name, session, etc.)
    pub source: String,

    /// Owning account, if the item is account-scoped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    /// Chat session the item was recorded in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// When the item was created
    pub created_at: DateTime<Utc>,

    /// Free-form tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Additional key/value facts (plan, role, ...) usable as filters
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ContentMetadata {
    pub fn new(content_type: ContentType, source: impl Into<String>) -> Self {
        Self {
            content_type,
            source: source.into(),
            account_id: None,
            session_id: None,
            created_at: Utc::now(),
            tags: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A single retrievable piece of text with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Unique ID; inserting an existing ID replaces the stored item
    pub id: String,

    /// The text content
    pub content: String,

    pub metadata: ContentMetadata,

    /// Embedding vector; generated by the store when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl ContentItem {
    pub fn new(id: impl Into<String>, content: impl Into<String>, metadata: ContentMetadata) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata,
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// A content item scored against a query. Built fresh per search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub item: ContentItem,
    /// Cosine similarity between query and item embeddings
    pub score: f32,
    /// `1 - score`
    pub distance: f32,
}

impl SimilarityResult {
    pub fn new(item: ContentItem, score: f32) -> Self {
        Self {
            item,
            score,
            distance: 1.0 - score,
        }
    }
}

/// Metadata filters for similarity search. All set fields must match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,

    /// Every listed tag must be present on the item
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Every key must exist in the item's `extra` map with an equal value
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SearchFilters {
    pub fn of_type(content_type: ContentType) -> Self {
        Self {
            content_type: Some(content_type),
            ..Self::default()
        }
    }

    pub fn for_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Whether the given metadata satisfies every filter.
    pub fn matches(&self, metadata: &ContentMetadata) -> bool {
        if let Some(account_id) = &self.account_id {
            if metadata.account_id.as_deref() != Some(account_id.as_str()) {
                return false;
            }
        }

        if let Some(content_type) = self.content_type {
            if metadata.content_type != content_type {
                return false;
            }
        }

        if !self.tags.iter().all(|t| metadata.tags.contains(t)) {
            return false;
        }

        self.extra
            .iter()
            .all(|(key, value)| metadata.extra.get(key) == Some(value))
    }
}
