//! Generation backend implementations.
//!
//! Contains the concrete [`LlmProvider`](taleweaver_core::llm::provider::LlmProvider)
//! implementations plus a factory ([`create_provider`]) that builds the right
//! one from a [`ProviderConfig`].

pub mod anthropic;

use secrecy::SecretString;

use taleweaver_core::llm::box_provider::BoxLlmProvider;
use taleweaver_types::config::ProviderConfig;
use taleweaver_types::llm::{LlmError, ProviderType};

use self::anthropic::AnthropicProvider;

/// Create a [`BoxLlmProvider`] from a [`ProviderConfig`] and an already
/// resolved API key.
///
/// Fails with `AuthenticationFailed` when the provider needs a key and none
/// is given.
pub fn create_provider(
    config: &ProviderConfig,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    match config.provider_type {
        ProviderType::Anthropic => {
            let key = api_key.ok_or(LlmError::AuthenticationFailed)?;
            let mut provider = AnthropicProvider::new(key, config.model.clone())?;
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(BoxLlmProvider::new(provider))
        }
    }
}

/// Read the API key named by `config.api_key_env` from the environment.
///
/// Unset, empty, and non-Unicode values all count as absent.
pub fn api_key_from_env(config: &ProviderConfig) -> Option<SecretString> {
    std::env::var(&config.api_key_env)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}

/// Build the configured backend, if any.
///
/// A configured provider whose key is missing is logged and treated as "no
/// backend", so the synthesizer's fallback policy decides what happens.
pub fn provider_from_config(config: Option<&ProviderConfig>) -> Option<BoxLlmProvider> {
    let config = config?;
    match create_provider(config, api_key_from_env(config)) {
        Ok(provider) => {
            tracing::info!(provider = %config.name, model = %config.model, "generation backend configured");
            Some(provider)
        }
        Err(e) => {
            tracing::warn!(
                provider = %config.name,
                api_key_env = %config.api_key_env,
                error = %e,
                "generation backend unavailable, continuing without it"
            );
            None
        }
    }
}
