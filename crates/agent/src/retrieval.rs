//! Context retrieval over the embedding store.
//!
//! One query fans out to up to three partitions (knowledge base, the
//! account's conversation history, plan-scoped business data). The
//! partitions share no state, so the searches run concurrently and are
//! merged into a single labelled block.

use std::sync::Arc;

use botloom_config::RetrievalConfig;
use botloom_core::content::{ContentItem, ContentMetadata, ContentType, SearchFilters};
use botloom_core::pipeline::{AccountHints, RetrievalContext, SectionStats};
use botloom_memory::EmbeddingStore;
use tracing::{debug, warn};

/// Tag attached to every recorded conversation turn.
pub const CONVERSATION_TAG: &str = "conversation";

/// Output of one partition search.
#[derive(Debug)]
struct Section {
    content_type: ContentType,
    text: String,
    sources: Vec<String>,
    confidence: f32,
    results: usize,
}

/// Builds [`RetrievalContext`]s and feeds the retrievable partitions.
pub struct ContextRetriever {
    store: Arc<EmbeddingStore>,
    config: RetrievalConfig,
}

impl ContextRetriever {
    pub fn new(store: Arc<EmbeddingStore>, config: RetrievalConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<EmbeddingStore> {
        &self.store
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Retrieve context for `query` on behalf of `account_id`.
    ///
    /// Sections appear in fixed order (knowledge base, conversation
    /// history, business context) and only when they produced text.
    /// Confidence is the best section's top score; sources are
    /// deduplicated in first-seen order.
    pub async fn retrieve_context(
        &self,
        query: &str,
        account_id: &str,
        hints: Option<&AccountHints>,
    ) -> RetrievalContext {
        let (knowledge, history, business) = tokio::join!(
            self.knowledge_section(query),
            self.history_section(query, account_id),
            self.business_section(query, account_id, hints),
        );

        let sections: Vec<Section> = [knowledge, history, business]
            .into_iter()
            .flatten()
            .collect();

        let context = Self::combine(sections);
        debug!(
            account_id,
            sections = context.metadata.sections.len(),
            sources = context.sources.len(),
            confidence = context.confidence,
            "Context retrieved"
        );
        context
    }

    async fn knowledge_section(&self, query: &str) -> Option<Section> {
        if !self.config.include_knowledge_base {
            return None;
        }
        let filters = SearchFilters::of_type(ContentType::KnowledgeBase);
        self.search_section(ContentType::KnowledgeBase, query, &filters)
            .await
    }

    async fn history_section(&self, query: &str, account_id: &str) -> Option<Section> {
        if !self.config.include_user_history {
            return None;
        }
        let filters =
            SearchFilters::of_type(ContentType::ConversationHistory).for_account(account_id);
        self.search_section(ContentType::ConversationHistory, query, &filters)
            .await
    }

    async fn business_section(
        &self,
        query: &str,
        account_id: &str,
        hints: Option<&AccountHints>,
    ) -> Option<Section> {
        if !self.config.include_business_data {
            return None;
        }

        let mut filters =
            SearchFilters::of_type(ContentType::BusinessData).for_account(account_id);
        let mut extended = query.to_string();
        if let Some(hints) = hints {
            if let Some(plan) = &hints.plan {
                filters = filters.with_extra("plan", plan.as_str());
                extended.push(' ');
                extended.push_str(plan);
            }
            if let Some(role) = &hints.role {
                filters = filters.with_extra("role", role.as_str());
                extended.push(' ');
                extended.push_str(role);
            }
        }

        self.search_section(ContentType::BusinessData, &extended, &filters)
            .await
    }

    async fn search_section(
        &self,
        content_type: ContentType,
        query: &str,
        filters: &SearchFilters,
    ) -> Option<Section> {
        let results = self
            .store
            .search_similar(
                query,
                self.config.max_results,
                self.config.similarity_threshold,
                filters,
            )
            .await;

        if results.is_empty() {
            return None;
        }

        let confidence = results
            .iter()
            .map(|r| r.score)
            .fold(f32::MIN, f32::max);
        let text = results
            .iter()
            .map(|r| r.item.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let sources = results
            .iter()
            .map(|r| r.item.metadata.source.clone())
            .collect();

        Some(Section {
            content_type,
            text,
            sources,
            confidence,
            results: results.len(),
        })
    }

    fn combine(sections: Vec<Section>) -> RetrievalContext {
        let mut context = RetrievalContext::default();
        let mut blocks = Vec::with_capacity(sections.len());

        for section in sections {
            blocks.push(format!("{}:\n{}", section.content_type.label(), section.text));
            for source in section.sources {
                if !context.sources.contains(&source) {
                    context.sources.push(source);
                }
            }
            context.confidence = context.confidence.max(section.confidence);
            context.metadata.sections.push(SectionStats {
                content_type: section.content_type,
                results: section.results,
                confidence: section.confidence,
            });
        }

        context.text = blocks.join("\n\n");
        context
    }

    /// Record one user/assistant exchange in the account's history.
    pub async fn add_conversation_to_history(
        &self,
        account_id: &str,
        message: &str,
        response: &str,
        session_id: &str,
    ) -> bool {
        let id = format!(
            "conv_{}_{}",
            session_id,
            chrono::Utc::now().timestamp_millis()
        );
        let metadata = ContentMetadata::new(
            ContentType::ConversationHistory,
            format!("conversation:{session_id}"),
        )
        .with_account(account_id)
        .with_session(session_id)
        .with_tags(vec![CONVERSATION_TAG.into()]);

        let item = ContentItem::new(
            id,
            format!("User: {message}\nAssistant: {response}"),
            metadata,
        );
        let added = self.store.add_document(item).await;
        if !added {
            warn!(account_id, session_id, "Failed to record conversation turn");
        }
        added
    }

    /// Add a knowledge-base article.
    pub async fn add_knowledge_base_document(
        &self,
        content: &str,
        source: &str,
        tags: Vec<String>,
    ) -> bool {
        let id = format!("kb_{}", uuid::Uuid::new_v4());
        let metadata = ContentMetadata::new(ContentType::KnowledgeBase, source).with_tags(tags);
        self.store
            .add_document(ContentItem::new(id, content, metadata))
            .await
    }

    /// Add plan/role-scoped business data for an account.
    pub async fn add_business_document(
        &self,
        account_id: &str,
        content: &str,
        plan: &str,
        role: &str,
    ) -> bool {
        let id = format!("biz_{}", uuid::Uuid::new_v4());
        let metadata = ContentMetadata::new(ContentType::BusinessData, format!("account:{account_id}"))
            .with_account(account_id)
            .with_extra("plan", plan)
            .with_extra("role", role);
        self.store
            .add_document(ContentItem::new(id, content, metadata))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botloom_config::VectorStoreConfig;
    use botloom_memory::HashingEmbedder;

    const DIMS: usize = 256;

    async fn retriever(config: RetrievalConfig) -> ContextRetriever {
        let store_config = VectorStoreConfig {
            dimensions: DIMS,
            ..VectorStoreConfig::default()
        };
        let store = Arc::new(EmbeddingStore::new(
            store_config,
            Arc::new(HashingEmbedder::new(DIMS)),
        ));
        assert!(store.initialize().await);
        ContextRetriever::new(store, config)
    }

    fn loose() -> RetrievalConfig {
        RetrievalConfig {
            similarity_threshold: 0.3,
            ..RetrievalConfig::default()
        }
    }

    #[tokio::test]
    async fn empty_store_gives_empty_context() {
        let r = retriever(loose()).await;
        let ctx = r.retrieve_context("anything at all", "u1", None).await;
        assert!(ctx.is_empty());
        assert!(ctx.sources.is_empty());
        assert_eq!(ctx.confidence, 0.0);
    }

    #[tokio::test]
    async fn knowledge_section_is_labelled() {
        let r = retriever(loose()).await;
        assert!(
            r.add_knowledge_base_document("reset your password from settings", "faq.md", vec![])
                .await
        );

        let ctx = r
            .retrieve_context("reset your password from settings", "u1", None)
            .await;
        assert!(ctx.text.starts_with("Knowledge Base:\n"));
        assert!(ctx.text.contains("reset your password"));
        assert_eq!(ctx.sources, vec!["faq.md".to_string()]);
        assert!((ctx.confidence - 1.0).abs() < 1e-4);
        assert_eq!(ctx.metadata.results_for(ContentType::KnowledgeBase), 1);
    }

    #[tokio::test]
    async fn label_follows_the_section_that_fired() {
        let r = retriever(loose()).await;
        r.add_business_document("u1", "pro plan features include priority support", "pro", "admin")
            .await;

        let hints = AccountHints {
            plan: Some("pro".into()),
            role: Some("admin".into()),
        };
        let ctx = r
            .retrieve_context("pro plan features", "u1", Some(&hints))
            .await;
        assert!(ctx.text.starts_with("Business Context:\n"));
        assert!(!ctx.text.contains("Knowledge Base:"));
        assert!(!ctx.text.contains("Conversation History:"));
    }

    #[tokio::test]
    async fn business_data_filtered_by_plan() {
        let r = retriever(loose()).await;
        r.add_business_document("u1", "plan features include priority support", "starter", "user")
            .await;

        let hints = AccountHints {
            plan: Some("pro".into()),
            role: None,
        };
        let ctx = r
            .retrieve_context("plan features include priority support", "u1", Some(&hints))
            .await;
        assert!(ctx.is_empty());
    }

    #[tokio::test]
    async fn business_data_is_scoped_to_account() {
        let r = retriever(loose()).await;
        r.add_business_document(
            "acme",
            "acme negotiated discount is 40 percent on renewal",
            "pro",
            "admin",
        )
        .await;

        let other = r
            .retrieve_context("what discount on renewal", "globex", None)
            .await;
        assert!(other.is_empty());
        assert!(other.sources.is_empty());

        let owner = r
            .retrieve_context("what discount on renewal", "acme", None)
            .await;
        assert!(owner.text.starts_with("Business Context:\n"));
        assert_eq!(owner.sources, vec!["account:acme".to_string()]);
    }

    #[tokio::test]
    async fn history_is_scoped_to_account() {
        let r = retriever(loose()).await;
        assert!(
            r.add_conversation_to_history("u1", "where is my invoice", "Under Billing.", "s1")
                .await
        );
        assert!(
            r.add_conversation_to_history("u2", "where is my invoice", "Check Billing.", "s2")
                .await
        );

        let ctx = r.retrieve_context("where is my invoice", "u1", None).await;
        assert!(ctx.text.starts_with("Conversation History:\n"));
        assert!(ctx.text.contains("Under Billing."));
        assert!(!ctx.text.contains("Check Billing."));
        assert_eq!(ctx.sources, vec!["conversation:s1".to_string()]);
    }

    #[tokio::test]
    async fn history_items_are_tagged_turns() {
        let r = retriever(loose()).await;
        r.add_conversation_to_history("u1", "hi", "hello", "s9").await;

        let items = r.store().list_documents(10, 0).await;
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert!(item.id.starts_with("conv_s9_"));
        assert_eq!(item.content, "User: hi\nAssistant: hello");
        assert_eq!(item.metadata.content_type, ContentType::ConversationHistory);
        assert_eq!(item.metadata.tags, vec![CONVERSATION_TAG.to_string()]);
        assert_eq!(item.metadata.account_id.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn sections_keep_fixed_order_and_dedup_sources() {
        let r = retriever(loose()).await;
        r.add_knowledge_base_document("billing invoices are monthly", "billing.md", vec![])
            .await;
        r.add_knowledge_base_document("billing invoices are emailed", "billing.md", vec![])
            .await;
        r.add_conversation_to_history("u1", "billing invoices", "They are monthly.", "s1")
            .await;

        let ctx = r.retrieve_context("billing invoices", "u1", None).await;
        let kb = ctx.text.find("Knowledge Base:").unwrap();
        let history = ctx.text.find("Conversation History:").unwrap();
        assert!(kb < history);
        assert_eq!(
            ctx.sources,
            vec!["billing.md".to_string(), "conversation:s1".to_string()]
        );
        let best = ctx
            .metadata
            .sections
            .iter()
            .map(|s| s.confidence)
            .fold(0.0f32, f32::max);
        assert_eq!(ctx.confidence, best);
    }

    #[tokio::test]
    async fn disabled_partitions_are_skipped() {
        let r = retriever(RetrievalConfig {
            include_knowledge_base: false,
            ..loose()
        })
        .await;
        r.add_knowledge_base_document("shipping takes three days", "shipping.md", vec![])
            .await;

        let ctx = r.retrieve_context("shipping takes three days", "u1", None).await;
        assert!(ctx.is_empty());
    }

    #[tokio::test]
    async fn max_results_caps_each_section() {
        let r = retriever(RetrievalConfig {
            max_results: 2,
            ..loose()
        })
        .await;
        for i in 0..5 {
            r.add_knowledge_base_document("refund policy details", &format!("doc{i}"), vec![])
                .await;
        }

        let ctx = r.retrieve_context("refund policy details", "u1", None).await;
        assert_eq!(ctx.metadata.results_for(ContentType::KnowledgeBase), 2);
    }
}
