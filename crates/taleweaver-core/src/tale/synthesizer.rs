//! Tale synthesis: backend delegation with template fallback.
//!
//! `TaleSynthesizer::synthesize` asks the configured generation backend for a
//! story and splits the reply into title and body. When no backend is
//! configured, or the backend cannot be reached, it falls back to the
//! templates in [`super::template`] (if enabled).
//!
//! Outcomes:
//! - `Ok(Some(draft))`: a usable draft, from the backend or the templates
//! - `Err(GenerationError::Failure)`: the backend answered with something
//!   unusable, or did not answer within `timeout_ms`
//! - `Ok(None)`: nothing could produce a draft (no reachable backend and
//!   fallback disabled)

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use taleweaver_types::config::GenerationConfig;
use taleweaver_types::error::GenerationError;
use taleweaver_types::llm::{BackendStatus, CompletionRequest, LlmError, Message, MessageRole};
use taleweaver_types::tale::{GenerationParams, TaleDraft};

use crate::llm::box_provider::BoxLlmProvider;

use super::prompt::{PromptBuilder, TALE_SYSTEM_PROMPT};
use super::template;

/// Produces tale drafts.
pub struct TaleSynthesizer {
    provider: Option<BoxLlmProvider>,
    config: GenerationConfig,
    /// Only used for fallback title selection.
    rng: Mutex<StdRng>,
}

impl TaleSynthesizer {
    /// Create a synthesizer. The title RNG is seeded from
    /// `config.title_seed` when set, otherwise from OS entropy.
    pub fn new(provider: Option<BoxLlmProvider>, config: GenerationConfig) -> Self {
        let rng = match config.title_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(provider, config, rng)
    }

    /// Create a synthesizer with an explicit RNG.
    pub fn with_rng(provider: Option<BoxLlmProvider>, config: GenerationConfig, rng: StdRng) -> Self {
        Self {
            provider,
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Template-only synthesizer with default settings.
    pub fn template_only() -> Self {
        Self::new(None, GenerationConfig::default())
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.provider.as_ref().map(|p| p.name())
    }

    /// Produce a draft for `params`.
    #[tracing::instrument(
        name = "synthesize_tale",
        skip(self, params),
        fields(child_age = %params.child_age, mood = %params.mood)
    )]
    pub async fn synthesize(
        &self,
        params: &GenerationParams,
    ) -> Result<Option<TaleDraft>, GenerationError> {
        let Some(provider) = &self.provider else {
            return Ok(self.fallback(params, "no generation backend configured"));
        };

        let request = CompletionRequest {
            model: provider.default_model().to_string(),
            messages: vec![Message {
                role: MessageRole::User,
                content: PromptBuilder::build(params),
            }],
            system: Some(TALE_SYSTEM_PROMPT.to_string()),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
        };

        let timeout = Duration::from_millis(self.config.timeout_ms);
        match tokio::time::timeout(timeout, provider.complete(&request)).await {
            Err(_) => {
                tracing::warn!(
                    provider = provider.name(),
                    timeout_ms = self.config.timeout_ms,
                    "generation backend timed out"
                );
                Err(GenerationError::Failure(format!(
                    "generation backend timed out after {}ms",
                    self.config.timeout_ms
                )))
            }
            Ok(Ok(response)) => {
                tracing::debug!(
                    provider = provider.name(),
                    output_tokens = response.usage.output_tokens,
                    "generation backend responded"
                );
                parse_response(&response.content).map(Some)
            }
            Ok(Err(LlmError::Deserialization(msg))) => Err(GenerationError::Failure(format!(
                "malformed backend response: {msg}"
            ))),
            Ok(Err(e)) => {
                tracing::warn!(provider = provider.name(), error = %e, "generation backend unavailable");
                Ok(self.fallback(params, "generation backend unavailable"))
            }
        }
    }

    /// Send a minimal request to the backend to verify connectivity.
    pub async fn check_backend(&self) -> BackendStatus {
        let fallback_enabled = self.config.fallback_enabled;
        let Some(provider) = &self.provider else {
            return BackendStatus {
                provider: None,
                model: None,
                reachable: false,
                fallback_enabled,
                error: None,
            };
        };

        let request = CompletionRequest {
            model: provider.default_model().to_string(),
            messages: vec![Message {
                role: MessageRole::User,
                content: "Hello".to_string(),
            }],
            system: None,
            max_tokens: 10,
            temperature: Some(0.0),
        };

        let timeout = Duration::from_millis(self.config.timeout_ms);
        let error = match tokio::time::timeout(timeout, provider.complete(&request)).await {
            Ok(Ok(_)) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(_) => Some(format!("timed out after {}ms", self.config.timeout_ms)),
        };

        BackendStatus {
            provider: Some(provider.name().to_string()),
            model: Some(provider.default_model().to_string()),
            reachable: error.is_none(),
            fallback_enabled,
            error,
        }
    }

    fn fallback(&self, params: &GenerationParams, reason: &str) -> Option<TaleDraft> {
        if !self.config.fallback_enabled {
            tracing::warn!(reason, "template fallback disabled, cannot generate");
            return None;
        }
        tracing::debug!(reason, "using template synthesis");
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Some(template::draft(params, &mut *rng))
    }
}

/// Split a backend reply into title and body.
///
/// The first line is the title (markdown heading markers, a `Title:` label,
/// and surrounding quotes or asterisks are stripped); the rest is the body.
pub fn parse_response(text: &str) -> Result<TaleDraft, GenerationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(GenerationError::Failure(
            "generation backend returned an empty response".to_string(),
        ));
    }

    let (first_line, rest) = text.split_once('\n').unwrap_or((text, ""));
    let title = clean_title(first_line);
    let content = rest.trim();

    if title.is_empty() {
        return Err(GenerationError::Failure(
            "generation backend response has no title".to_string(),
        ));
    }
    if content.is_empty() {
        return Err(GenerationError::Failure(
            "generation backend response has no story body".to_string(),
        ));
    }

    Ok(TaleDraft {
        title,
        content: content.to_string(),
    })
}

fn clean_title(line: &str) -> String {
    let line = line.trim().trim_start_matches('#').trim();
    let line = match line.get(..6) {
        Some(label) if label.eq_ignore_ascii_case("title:") => line[6..].trim(),
        _ => line,
    };
    line.trim_matches(|c| c == '"' || c == '*' || c == '\'')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::LlmProvider;
    use taleweaver_types::llm::{CompletionResponse, StopReason, Usage};
    use taleweaver_types::tale::{AgeBand, Mood};

    enum Behavior {
        Reply(&'static str),
        Fail,
        Malformed,
        Hang,
    }

    struct MockProvider {
        behavior: Behavior,
    }

    impl LlmProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        fn default_model(&self) -> &str {
            "mock-model"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            assert_eq!(request.model, "mock-model");
            match self.behavior {
                Behavior::Reply(text) => Ok(CompletionResponse {
                    id: "msg_1".to_string(),
                    content: text.to_string(),
                    model: "mock-model".to_string(),
                    stop_reason: StopReason::EndTurn,
                    usage: Usage::default(),
                }),
                Behavior::Fail => Err(LlmError::Provider {
                    message: "connection refused".to_string(),
                }),
                Behavior::Malformed => {
                    Err(LlmError::Deserialization("expected object".to_string()))
                }
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Err(LlmError::Provider {
                        message: "unreachable".to_string(),
                    })
                }
            }
        }
    }

    fn synthesizer(behavior: Option<Behavior>, fallback_enabled: bool) -> TaleSynthesizer {
        let config = GenerationConfig {
            fallback_enabled,
            timeout_ms: 50,
            title_seed: Some(7),
            ..GenerationConfig::default()
        };
        let provider = behavior.map(|behavior| BoxLlmProvider::new(MockProvider { behavior }));
        TaleSynthesizer::new(provider, config)
    }

    fn params() -> GenerationParams {
        GenerationParams {
            child_age: AgeBand::Preschool,
            topic: "sleepy owls".to_string(),
            setting: "an old oak tree".to_string(),
            characters: String::new(),
            mood: Mood::Calming,
        }
    }

    #[tokio::test]
    async fn test_backend_reply_is_split_into_title_and_body() {
        let synth = synthesizer(
            Some(Behavior::Reply("# The Owl Who Couldn't Sleep\n\nOnce, in an old oak tree...")),
            true,
        );
        let draft = synth.synthesize(&params()).await.unwrap().unwrap();
        assert_eq!(draft.title, "The Owl Who Couldn't Sleep");
        assert_eq!(draft.content, "Once, in an old oak tree...");
    }

    #[tokio::test]
    async fn test_empty_backend_reply_is_generation_failure() {
        let synth = synthesizer(Some(Behavior::Reply("   \n  ")), true);
        let err = synth.synthesize(&params()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Failure(msg) if msg.contains("empty")));
    }

    #[tokio::test]
    async fn test_title_only_reply_is_generation_failure() {
        let synth = synthesizer(Some(Behavior::Reply("Just A Title")), true);
        let err = synth.synthesize(&params()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Failure(msg) if msg.contains("no story body")));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_generation_failure_even_with_fallback() {
        let synth = synthesizer(Some(Behavior::Malformed), true);
        assert!(synth.synthesize(&params()).await.is_err());
    }

    #[tokio::test]
    async fn test_timeout_is_generation_failure() {
        let synth = synthesizer(Some(Behavior::Hang), true);
        let err = synth.synthesize(&params()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Failure(msg) if msg.contains("timed out")));
    }

    #[tokio::test]
    async fn test_unreachable_backend_falls_back_to_templates() {
        let synth = synthesizer(Some(Behavior::Fail), true);
        let draft = synth.synthesize(&params()).await.unwrap().unwrap();
        assert!(draft.title.ends_with(" Sleepy"));
        assert_eq!(draft.content, template::content(&params()));
    }

    #[tokio::test]
    async fn test_unreachable_backend_without_fallback_is_absent() {
        let synth = synthesizer(Some(Behavior::Fail), false);
        assert!(synth.synthesize(&params()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_no_backend_uses_templates() {
        let synth = synthesizer(None, true);
        let draft = synth.synthesize(&params()).await.unwrap().unwrap();
        assert!(template::title_prefixes(Mood::Calming)
            .iter()
            .any(|p| draft.title == format!("{p} Sleepy")));
        assert!(draft.content.contains("an old oak tree"));
    }

    #[tokio::test]
    async fn test_no_backend_without_fallback_is_absent() {
        let synth = synthesizer(None, false);
        assert!(synth.synthesize(&params()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seeded_synthesizers_agree() {
        let a = synthesizer(None, true);
        let b = synthesizer(None, true);
        for _ in 0..5 {
            let da = a.synthesize(&params()).await.unwrap().unwrap();
            let db = b.synthesize(&params()).await.unwrap().unwrap();
            assert_eq!(da, db);
        }
    }

    #[tokio::test]
    async fn test_check_backend_reports_state() {
        let none = synthesizer(None, true).check_backend().await;
        assert_eq!(none.provider, None);
        assert!(!none.reachable);
        assert!(none.fallback_enabled);

        let ok = synthesizer(Some(Behavior::Reply("hi")), true).check_backend().await;
        assert_eq!(ok.provider.as_deref(), Some("mock"));
        assert!(ok.reachable);

        let down = synthesizer(Some(Behavior::Fail), false).check_backend().await;
        assert!(!down.reachable);
        assert!(down.error.unwrap().contains("connection refused"));
    }

    #[test]
    fn test_clean_title_variants() {
        assert_eq!(clean_title("Title: \"Moon Soup\""), "Moon Soup");
        assert_eq!(clean_title("## **The Brave Snail**"), "The Brave Snail");
        assert_eq!(clean_title("TITLE:Star Boats"), "Star Boats");
        assert_eq!(clean_title("Ünïcode Tale"), "Ünïcode Tale");
    }

    #[test]
    fn test_parse_response_keeps_inner_paragraphs() {
        let draft = parse_response("Moon Soup\n\nFirst.\n\nSecond.\n").unwrap();
        assert_eq!(draft.title, "Moon Soup");
        assert_eq!(draft.content, "First.\n\nSecond.");
    }
}
