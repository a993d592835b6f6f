//! `botloom config`: configuration management commands.

use anyhow::Context;
use botloom_config::AppConfig;

pub fn show() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;
    println!("{}", toml::to_string_pretty(&config.redacted())?);
    Ok(())
}

pub fn default_file() {
    println!("{}", AppConfig::default_toml());
}

pub fn path() {
    println!("{}", AppConfig::config_dir().join("config.toml").display());
}

pub fn validate() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Config is invalid")?;

    let mut warnings = Vec::new();
    if config.model.provider == "openai" && config.model.api_key.is_none() {
        warnings.push(
            "model.provider is openai but no API key is set (BOTLOOM_API_KEY or OPENAI_API_KEY)",
        );
    }
    if config.vector_store.embedder == "random" {
        warnings.push("random embedder: retrieval results will not be meaningful");
    }
    if !config.orchestrator.enable_rag && !config.orchestrator.enable_business_logic {
        warnings.push("both RAG and business logic are disabled");
    }

    println!("Config OK");
    for w in &warnings {
        println!("  warning: {w}");
    }
    println!();
    println!(
        "  Vector store:  {} ({} dims, {} embedder)",
        config.vector_store.provider, config.vector_store.dimensions, config.vector_store.embedder
    );
    println!("  Model:         {} ({})", config.model.name, config.model.provider);
    let plans: Vec<&str> = config.business.plans.keys().map(String::as_str).collect();
    println!("  Plans:         {}", plans.join(", "));
    Ok(())
}
