use anyhow::{Context, Result};
use async_trait::async_trait;
use focus_storage::models::{AiConfig, AiProvider};

use crate::providers::{
    google::GoogleGenAiProvider, ollama::OllamaProvider, openai::OpenAiProvider,
};

/// A language model the relevance classifier can prompt
///
/// Implementations return the model's raw text; parsing the verdict out of it
/// is the classifier's job.
#[async_trait]
pub trait AiProviderTrait: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier, as shown in logs and `focus config show`
    fn model_name(&self) -> &str;

    /// Cheap reachability probe; backends without one report `true`
    async fn is_available(&self) -> bool {
        true
    }
}

/// Key for a hosted backend: stored value first, then the environment
fn hosted_key(config: &AiConfig) -> Result<String> {
    config.effective_api_key().with_context(|| {
        format!(
            "{} needs an API key: set ai.api_key or export {}",
            config.provider,
            config.provider.api_key_env_vars().join(" / ")
        )
    })
}

/// Build the backend selected by `config.provider`
///
/// # Errors
///
/// Returns an error when a hosted backend has no API key
pub fn create_provider(config: &AiConfig) -> Result<Box<dyn AiProviderTrait>> {
    let model = config.effective_model();
    let base_url = Some(config.effective_base_url());

    let provider: Box<dyn AiProviderTrait> = match config.provider {
        AiProvider::Google => Box::new(GoogleGenAiProvider::new(&hosted_key(config)?, model, base_url)),
        AiProvider::OpenAi => Box::new(OpenAiProvider::new(&hosted_key(config)?, model, base_url)),
        AiProvider::Ollama => Box::new(OllamaProvider::new(base_url, model)),
    };
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_without_key() {
        let config = AiConfig {
            provider: AiProvider::Ollama,
            model: Some("phi3".to_string()),
            ..AiConfig::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model_name(), "phi3");
    }

    #[test]
    fn test_create_openai_with_stored_key() {
        let config = AiConfig {
            provider: AiProvider::OpenAi,
            api_key: Some("sk-test".to_string()),
            ..AiConfig::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model_name(), "gpt-4o-mini");
    }

    #[test]
    fn test_hosted_provider_without_key_names_the_variables() {
        if std::env::var_os("OPENAI_API_KEY").is_some() {
            return;
        }
        let config = AiConfig {
            provider: AiProvider::OpenAi,
            ..AiConfig::default()
        };
        let Err(err) = create_provider(&config) else {
            panic!("expected a missing-key error");
        };
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
