//! Model adapter implementations for botloom.
//!
//! All adapters implement the `botloom_core::ModelAdapter` trait.
//! [`create_model`] selects one based on configuration.

pub mod canned;
pub mod openai_compat;

pub use canned::{CannedModel, CannedRule};
pub use openai_compat::OpenAiCompatModel;

use botloom_config::ModelConfig;
use botloom_core::error::ModelError;
use botloom_core::model::ModelAdapter;
use std::sync::Arc;
use std::time::Duration;

/// Build the model adapter named in configuration.
///
/// `"none"` yields `None`: the orchestrator then answers with its generic
/// fallback sentences.
pub fn create_model(config: &ModelConfig) -> Result<Option<Arc<dyn ModelAdapter>>, ModelError> {
    match config.provider.as_str() {
        "none" => Ok(None),
        "canned" => Ok(Some(Arc::new(
            CannedModel::new(&config.name)
                .with_latency(Duration::from_millis(config.simulated_latency_ms)),
        ))),
        "openai" => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                ModelError::NotConfigured("model.api_key is required for the openai provider".into())
            })?;
            let base_url = config
                .api_url
                .clone()
                .unwrap_or_else(|| openai_compat::OPENAI_BASE_URL.to_string());
            Ok(Some(Arc::new(OpenAiCompatModel::new(
                base_url,
                api_key,
                &config.name,
            ))))
        }
        other => Err(ModelError::NotConfigured(format!(
            "unknown model provider '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_provider_has_no_model() {
        let config = ModelConfig {
            provider: "none".into(),
            ..ModelConfig::default()
        };
        assert!(create_model(&config).unwrap().is_none());
    }

    #[test]
    fn canned_provider_uses_configured_name() {
        let model = create_model(&ModelConfig::default()).unwrap().unwrap();
        assert_eq!(model.name(), "llama-3-8b-instruct");
    }

    #[test]
    fn openai_requires_key() {
        let config = ModelConfig {
            provider: "openai".into(),
            api_key: None,
            ..ModelConfig::default()
        };
        assert!(matches!(create_model(&config), Err(ModelError::NotConfigured(_))));
    }

    #[test]
    fn unknown_provider_rejected() {
        let config = ModelConfig {
            provider: "gpt-local".into(),
            ..ModelConfig::default()
        };
        assert!(create_model(&config).is_err());
    }
}
