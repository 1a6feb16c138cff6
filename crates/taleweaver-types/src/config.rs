//! Global configuration types for Taleweaver.
//!
//! `GlobalConfig` represents the top-level `config.toml`. Every recognized
//! field is listed here with its default; unknown keys are ignored.

use serde::{Deserialize, Serialize};

use crate::llm::ProviderType;

/// Top-level configuration.
///
/// Loaded from `~/.taleweaver/config.toml`. All fields have defaults, so an
/// empty file (or no file) is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Generation backend. `None` means template-only generation.
    #[serde(default)]
    pub provider: Option<ProviderConfig>,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Tale synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Use the built-in templates when no backend is configured or the
    /// backend cannot be reached.
    #[serde(default = "default_fallback_enabled")]
    pub fallback_enabled: bool,

    /// Upper bound on a single backend call, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Fixed seed for fallback title selection. Unset draws from OS entropy.
    #[serde(default)]
    pub title_seed: Option<u64>,
}

fn default_fallback_enabled() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_tokens() -> u32 {
    1_500
}

fn default_temperature() -> f64 {
    0.8
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            fallback_enabled: default_fallback_enabled(),
            timeout_ms: default_timeout_ms(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            title_seed: None,
        }
    }
}

/// Configuration for the generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Human-readable name (e.g., "anthropic").
    #[serde(default = "default_provider_name")]
    pub name: String,
    #[serde(default = "default_provider_type")]
    pub provider_type: ProviderType,
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Override the provider's default base URL.
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_provider_name() -> String {
    "anthropic".to_string()
}

fn default_provider_type() -> ProviderType {
    ProviderType::Anthropic
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
