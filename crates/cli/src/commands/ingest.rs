//! `botloom ingest`: index files and preview retrieval.

use std::path::PathBuf;

use botloom_core::content::{ContentType, SearchFilters};

use super::{build_pipeline, index_files};

pub async fn run(
    files: Vec<PathBuf>,
    source: Option<String>,
    tags: Vec<String>,
    query: Option<String>,
) -> anyhow::Result<()> {
    let orchestrator = build_pipeline(&[]).await?;
    let retriever = orchestrator.retriever();

    let indexed = index_files(retriever, &files, source.as_deref(), &tags).await?;
    println!("Indexed {indexed} documents from {} file(s)", files.len());

    let Some(query) = query else {
        return Ok(());
    };

    let config = retriever.config();
    let results = retriever
        .store()
        .search_similar(
            &query,
            config.max_results,
            config.similarity_threshold,
            &SearchFilters::of_type(ContentType::KnowledgeBase),
        )
        .await;

    println!();
    if results.is_empty() {
        println!(
            "No documents scored above {:.2} for \"{query}\"",
            config.similarity_threshold
        );
        return Ok(());
    }
    for result in results {
        let preview: String = result.item.content.chars().take(80).collect();
        println!(
            "  {:.3}  [{}]  {}",
            result.score, result.item.metadata.source, preview
        );
    }
    Ok(())
}
