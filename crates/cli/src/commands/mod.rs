pub mod ask;
pub mod config_cmd;
pub mod ingest;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use botloom_agent::{ContextRetriever, InMemoryAccountSource, Orchestrator};
use botloom_config::AppConfig;
use botloom_core::pipeline::{AIRequest, AccountHints, RequestContext};

/// Arguments shared by `ask` and `stream`.
#[derive(clap::Args)]
pub struct RequestArgs {
    /// The message to answer
    #[arg(short, long)]
    pub message: String,

    /// Account the request is made for
    #[arg(long, default_value = "local")]
    pub account: String,

    #[arg(long, default_value = "cli")]
    pub session: String,

    /// Industry guidance (healthcare, finance, education, ecommerce)
    #[arg(long)]
    pub industry: Option<String>,

    /// Override the account's plan tier
    #[arg(long)]
    pub plan: Option<String>,

    /// Knowledge-base files to index before answering
    #[arg(long = "kb")]
    pub knowledge: Vec<PathBuf>,
}

impl RequestArgs {
    pub fn to_request(&self) -> AIRequest {
        AIRequest::new(&self.message, &self.account, &self.session).with_context(RequestContext {
            industry: self.industry.clone(),
            account: AccountHints {
                plan: self.plan.clone(),
                role: None,
            },
            ..RequestContext::default()
        })
    }
}

/// Load config, wire and initialize the pipeline, and index `knowledge`.
pub async fn build_pipeline(knowledge: &[PathBuf]) -> anyhow::Result<Orchestrator> {
    let config = AppConfig::load().context("Failed to load config")?;
    let orchestrator = Orchestrator::from_config(&config, Arc::new(InMemoryAccountSource::new()))?;
    orchestrator.initialize().await?;

    if !knowledge.is_empty() {
        let indexed = index_files(orchestrator.retriever(), knowledge, None, &[]).await?;
        tracing::info!(documents = indexed, "Knowledge base indexed");
    }
    Ok(orchestrator)
}

/// Index each blank-line separated paragraph of every file.
pub async fn index_files(
    retriever: &ContextRetriever,
    files: &[PathBuf],
    source: Option<&str>,
    tags: &[String],
) -> anyhow::Result<usize> {
    let mut indexed = 0;
    for file in files {
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let label = source.map(str::to_string).unwrap_or_else(|| file_label(file));
        for paragraph in paragraphs(&text) {
            if retriever
                .add_knowledge_base_document(paragraph, &label, tags.to_vec())
                .await
            {
                indexed += 1;
            }
        }
    }
    Ok(indexed)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n").map(str::trim).filter(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_split_on_blank_lines() {
        let text = "first line\nstill first\n\n\nsecond\n\n   \n";
        let parts: Vec<_> = paragraphs(text).collect();
        assert_eq!(parts, vec!["first line\nstill first", "second"]);
    }

    #[test]
    fn request_args_carry_hints() {
        let args = RequestArgs {
            message: "hi".into(),
            account: "a1".into(),
            session: "s1".into(),
            industry: Some("finance".into()),
            plan: Some("pro".into()),
            knowledge: vec![],
        };
        let request = args.to_request();
        assert_eq!(request.account_hints().plan.as_deref(), Some("pro"));
        assert_eq!(
            request.context.unwrap().industry.as_deref(),
            Some("finance")
        );
    }
}
