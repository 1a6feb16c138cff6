//! AnthropicProvider -- concrete [`LlmProvider`] implementation for Anthropic Claude.
//!
//! Sends requests to the Anthropic Messages API (`/v1/messages`). The API key
//! is wrapped in [`secrecy::SecretString`] and is only exposed when building
//! request headers.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use taleweaver_core::llm::provider::LlmProvider;
use taleweaver_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};

use super::types::{
    AnthropicContentBlock, AnthropicErrorResponse, AnthropicMessage, AnthropicRequest,
    AnthropicResponse,
};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Anthropic Claude provider.
///
/// Does not derive `Debug`; the key must never end up in logs.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl AnthropicProvider {
    const API_VERSION: &'static str = "2023-06-01";

    /// Create a provider for `model`.
    ///
    /// The HTTP client carries its own generous timeout; the synthesizer
    /// applies the configured per-call bound on top.
    pub fn new(api_key: SecretString, model: String) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
        })
    }

    /// Override the base URL (proxies, local test servers).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn to_anthropic_request(&self, request: &CompletionRequest) -> AnthropicRequest {
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        AnthropicRequest {
            model,
            max_tokens: request.max_tokens,
            messages: request
                .messages
                .iter()
                .map(|m| AnthropicMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            system: request.system.clone(),
            temperature: request.temperature,
        }
    }
}

/// Map a non-2xx status and its body to an [`LlmError`].
fn error_for_status(status: reqwest::StatusCode, body: &str) -> LlmError {
    let message = serde_json::from_str::<AnthropicErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status.as_u16() {
        400 => LlmError::InvalidRequest(message),
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited {
            retry_after_ms: None,
        },
        529 => LlmError::Overloaded(message),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {message}"),
        },
    }
}

impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.to_anthropic_request(request);

        let response = self
            .client
            .post(self.url("/v1/messages"))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::debug!(%status, "anthropic request rejected");
            return Err(error_for_status(status, &error_body));
        }

        let resp: AnthropicResponse = response.json().await.map_err(|e| {
            LlmError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        let content = resp
            .content
            .iter()
            .filter_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(text.as_str()),
                AnthropicContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        let stop_reason = match resp.stop_reason.as_deref() {
            Some("max_tokens") => StopReason::MaxTokens,
            Some("stop_sequence") => StopReason::StopSequence,
            _ => StopReason::EndTurn,
        };

        Ok(CompletionResponse {
            id: resp.id,
            content,
            model: resp.model,
            stop_reason,
            usage: Usage {
                input_tokens: resp.usage.input_tokens,
                output_tokens: resp.usage.output_tokens,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taleweaver_types::llm::{Message, MessageRole};

    fn make_provider() -> AnthropicProvider {
        AnthropicProvider::new(
            SecretString::from("test-key-not-real"),
            "claude-sonnet-4-20250514".to_string(),
        )
        .unwrap()
    }

    fn request(model: &str) -> CompletionRequest {
        CompletionRequest {
            model: model.to_string(),
            messages: vec![Message {
                role: MessageRole::User,
                content: "Tell me a story".to_string(),
            }],
            system: Some("You are a children's author.".to_string()),
            max_tokens: 1500,
            temperature: Some(0.8),
        }
    }

    #[test]
    fn test_provider_name_and_model() {
        let provider = make_provider();
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.default_model(), "claude-sonnet-4-20250514");
    }

    #[test]
    fn test_to_anthropic_request() {
        let provider = make_provider();
        let req = provider.to_anthropic_request(&request("claude-haiku-4-5"));
        assert_eq!(req.model, "claude-haiku-4-5");
        assert_eq!(req.messages[0].role, "user");
        assert_eq!(req.system.as_deref(), Some("You are a children's author."));
        assert_eq!(req.max_tokens, 1500);
    }

    #[test]
    fn test_empty_model_uses_default() {
        let provider = make_provider();
        let req = provider.to_anthropic_request(&request(""));
        assert_eq!(req.model, "claude-sonnet-4-20250514");
    }

    #[test]
    fn test_base_url_override() {
        let provider = make_provider().with_base_url("http://localhost:8080/".to_string());
        assert_eq!(provider.url("/v1/messages"), "http://localhost:8080/v1/messages");
    }

    #[test]
    fn test_error_for_status() {
        use reqwest::StatusCode;

        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, ""),
            LlmError::AuthenticationFailed
        ));
        assert!(matches!(
            error_for_status(StatusCode::TOO_MANY_REQUESTS, ""),
            LlmError::RateLimited { .. }
        ));

        let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        let overloaded = StatusCode::from_u16(529).unwrap();
        assert!(matches!(
            error_for_status(overloaded, body),
            LlmError::Overloaded(msg) if msg == "Overloaded"
        ));

        let err = error_for_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_provider_error() {
        let provider = make_provider().with_base_url("http://127.0.0.1:1".to_string());
        let err = provider.complete(&request("")).await.unwrap_err();
        assert!(matches!(err, LlmError::Provider { .. }));
    }
}
