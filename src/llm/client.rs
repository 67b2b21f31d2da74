//! LLM Client abstractions and provider management
//!
//! This module provides a unified interface for the text-generation backends
//! that power the pipeline's agents:
//! - **Ollama**: Local LLM inference (default feature)
//! - **OpenAI**: OpenAI API and compatible endpoints (`openai` feature)

use crate::types::{AppError, Result};
use crate::utils::toml_config::{LlmConfig, ProviderKind, SignalConfig};
use async_trait::async_trait;

/// Generic LLM client trait for provider abstraction
///
/// All LLM providers implement this trait, allowing for easy swapping
/// between providers without changing application code. The pipeline treats
/// it as an opaque capability: instructions plus input in, text out.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
///
/// | Provider | Feature | Notes |
/// |----------|---------|-------|
/// | Ollama | `ollama` (default) | Recommended for local |
/// | OpenAI | `openai` | Any OpenAI-compatible endpoint |
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI API provider (including Azure OpenAI and compatible APIs)
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "sk-...".to_string(),
    ///     api_base: "https://api.openai.com/v1".to_string(),
    ///     model: "gpt-4.1-mini".to_string(),
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
    },

    /// Ollama local LLM provider
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::Ollama {
    ///     base_url: "http://localhost:11434".to_string(),
    ///     model: "llama3.2".to_string(),
    /// };
    /// ```
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Build the provider described by the `[llm]` config section.
    ///
    /// API keys are resolved from the environment variable named in the
    /// config, never stored in the file itself.
    pub fn from_config(config: &SignalConfig) -> Result<Self> {
        let llm: &LlmConfig = &config.llm;
        match llm.provider {
            ProviderKind::Ollama => Ok(Provider::Ollama {
                base_url: llm.base_url.clone(),
                model: llm.model.clone(),
            }),
            ProviderKind::OpenAI => {
                let env_name = llm.api_key_env.as_deref().unwrap_or("OPENAI_API_KEY");
                let api_key = config.resolve_env(env_name).ok_or_else(|| {
                    AppError::Configuration(format!(
                        "Environment variable '{}' for the OpenAI API key is not set",
                        env_name
                    ))
                })?;
                Ok(Provider::OpenAI {
                    api_key,
                    api_base: llm.base_url.clone(),
                    model: llm.model.clone(),
                })
            }
        }
    }

    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider's cargo feature is disabled or the
    /// connection settings are invalid.
    pub async fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
            } => Ok(Box::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
            ))),

            #[cfg(not(feature = "openai"))]
            Provider::OpenAI { model, .. } => Err(AppError::Configuration(format!(
                "OpenAI provider requested for model '{}' but the 'openai' feature is disabled",
                model
            ))),

            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Box::new(
                super::ollama::OllamaClient::new(base_url.clone(), model.clone()).await?,
            )),

            #[cfg(not(feature = "ollama"))]
            Provider::Ollama { model, .. } => Err(AppError::Configuration(format!(
                "Ollama provider requested for model '{}' but the 'ollama' feature is disabled",
                model
            ))),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }
}
