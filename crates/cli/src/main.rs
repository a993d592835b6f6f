//! botloom CLI, the main entry point.
//!
//! Commands:
//! - `ask`     Answer one message and print the structured response
//! - `stream`  Answer one message, printing it word by word
//! - `ingest`  Index knowledge-base files and optionally preview a search
//! - `config`  Show, locate or validate configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "botloom",
    about = "botloom: retrieval-augmented responses for conversational bots",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single message
    Ask {
        #[command(flatten)]
        request: commands::RequestArgs,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Answer a single message as a word-by-word stream
    Stream {
        #[command(flatten)]
        request: commands::RequestArgs,
    },

    /// Index knowledge-base files
    Ingest {
        /// Files to index; each blank-line separated paragraph becomes a document
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Source label (defaults to the file name)
        #[arg(long)]
        source: Option<String>,

        /// Tags attached to every document
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Run a similarity search over the indexed documents
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print a default config file
    Default,
    /// Print the config file location
    Path,
    /// Validate the config file
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ask { request, json } => commands::ask::run(request, json).await?,
        Commands::Stream { request } => commands::ask::stream(request).await?,
        Commands::Ingest {
            files,
            source,
            tags,
            query,
        } => commands::ingest::run(files, source, tags, query).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show()?,
            ConfigAction::Default => commands::config_cmd::default_file(),
            ConfigAction::Path => commands::config_cmd::path(),
            ConfigAction::Validate => commands::config_cmd::validate()?,
        },
    }

    Ok(())
}
