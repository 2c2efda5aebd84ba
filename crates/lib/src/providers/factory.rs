//! # AI Provider Factory
//!
//! Centralizes the creation of AI provider instances from configuration so any
//! consumer (the cli, tests) builds providers the same way.

use crate::{
    errors::PromptError,
    providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
};
use serde::Deserialize;
use tracing::info;

/// Configuration for one named AI provider instance.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// The type of provider ("gemini" or "local").
    pub provider: String,
    /// The API URL. Optional for Gemini, where it is derived from the model name.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    pub model_name: String,
}

/// Creates the provider described by `config`.
///
/// `google_search` enables search grounding; only Gemini supports it.
pub fn create_provider(
    config: &ProviderConfig,
    google_search: bool,
) -> Result<Box<dyn AiProvider>, PromptError> {
    match config.provider.as_str() {
        "gemini" => {
            let api_key = config
                .api_key
                .clone()
                .filter(|key| !key.is_empty())
                .ok_or(PromptError::MissingApiKey)?;
            let api_url = config
                .api_url
                .clone()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| GeminiProvider::model_url(&config.model_name));
            info!("Configuring Gemini provider with URL: {}", api_url);
            let provider = GeminiProvider::new(api_url, api_key)?;
            Ok(if google_search {
                Box::new(provider.with_google_search())
            } else {
                Box::new(provider)
            })
        }
        "local" => {
            if google_search {
                return Err(PromptError::MissingAiProvider(
                    "search grounding requires a 'gemini' provider".to_string(),
                ));
            }
            let api_url = config.api_url.clone().ok_or_else(|| {
                PromptError::MissingAiProvider(
                    "api_url is not set for the local provider. Please set LOCAL_AI_API_URL in your .env file."
                        .to_string(),
                )
            })?;
            info!("Configuring Local AI provider with URL: {}", api_url);
            Ok(Box::new(LocalAiProvider::new(
                api_url,
                config.api_key.clone(),
                Some(config.model_name.clone()),
            )?))
        }
        other => Err(PromptError::MissingAiProvider(format!(
            "unsupported provider type '{other}'"
        ))),
    }
}
