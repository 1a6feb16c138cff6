//! Prompt builder for tale generation.
//!
//! Turns validated generation parameters into the natural-language request
//! sent to a generation backend.

use taleweaver_types::tale::{AgeBand, GenerationParams, Mood};

/// System prompt sent alongside every tale request. Pins the response layout
/// so the synthesizer can split title from body.
pub const TALE_SYSTEM_PROMPT: &str = "You are a children's author. Reply with the story title alone on the first line, then a blank line, then the story. Do not add any commentary before or after the story.";

const CLOSING_INSTRUCTION: &str = " Include a creative title for the story. The story should be appropriate for children and promote positive values.";

/// Builds the user prompt for a tale.
///
/// Layout:
/// ```text
/// Create an engaging children's story for {audience} about {topic}.
/// [ The story should be set in {setting}.]
/// [ The main characters should include {characters}.]
/// {mood clause}
/// {closing instruction}
/// ```
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the prompt. Pure and total: every well-formed `params` yields a
    /// prompt.
    pub fn build(params: &GenerationParams) -> String {
        let mut prompt = format!(
            "Create an engaging children's story for {} about {}.",
            Self::audience(params.child_age),
            params.topic
        );

        if !params.setting.is_empty() {
            prompt.push_str(&format!(" The story should be set in {}.", params.setting));
        }

        if !params.characters.is_empty() {
            prompt.push_str(&format!(
                " The main characters should include {}.",
                params.characters
            ));
        }

        prompt.push_str(Self::mood_clause(params.mood));
        prompt.push_str(CLOSING_INSTRUCTION);

        prompt
    }

    /// Human-readable audience phrase for an age band.
    pub fn audience(age: AgeBand) -> &'static str {
        match age {
            AgeBand::Preschool => "preschool children (3-4 years old)",
            AgeBand::EarlyElementary => "early elementary children (5-8 years old)",
            AgeBand::UpperElementary => "upper elementary children (9-12 years old)",
        }
    }

    fn mood_clause(mood: Mood) -> &'static str {
        match mood {
            Mood::Happy => {
                " The story should have a happy and uplifting tone with a positive message."
            }
            Mood::Adventurous => {
                " The story should be exciting and adventurous with elements of discovery and courage."
            }
            Mood::Educational => {
                " The story should include educational elements that teach children something valuable."
            }
            Mood::Calming => " The story should have a calming, peaceful tone perfect for bedtime.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(setting: &str, characters: &str, mood: Mood) -> GenerationParams {
        GenerationParams {
            child_age: AgeBand::EarlyElementary,
            topic: "friendly dragons".to_string(),
            setting: setting.to_string(),
            characters: characters.to_string(),
            mood,
        }
    }

    #[test]
    fn test_prompt_contains_topic_and_audience() {
        let prompt = PromptBuilder::build(&params("", "", Mood::Happy));
        assert!(prompt.starts_with(
            "Create an engaging children's story for early elementary children (5-8 years old) about friendly dragons."
        ));
        assert!(prompt.ends_with(CLOSING_INSTRUCTION));
    }

    #[test]
    fn test_optional_clauses_only_when_present() {
        let bare = PromptBuilder::build(&params("", "", Mood::Happy));
        assert!(!bare.contains("should be set in"));
        assert!(!bare.contains("main characters"));

        let full = PromptBuilder::build(&params("a misty forest", "Pip and Luna", Mood::Happy));
        assert_eq!(full.matches("a misty forest").count(), 1);
        assert_eq!(full.matches("Pip and Luna").count(), 1);
        assert!(full.contains(" The story should be set in a misty forest."));
        assert!(full.contains(" The main characters should include Pip and Luna."));
    }

    #[test]
    fn test_exactly_one_mood_clause() {
        for mood in Mood::ALL {
            let prompt = PromptBuilder::build(&params("", "", mood));
            let clauses = Mood::ALL
                .iter()
                .filter(|m| prompt.contains(PromptBuilder::mood_clause(**m)))
                .count();
            assert_eq!(clauses, 1, "mood {mood} should add exactly one clause");
            assert!(prompt.contains(PromptBuilder::mood_clause(mood)));
        }
    }

    #[test]
    fn test_audience_per_band() {
        assert!(PromptBuilder::audience(AgeBand::Preschool).contains("3-4"));
        assert!(PromptBuilder::audience(AgeBand::UpperElementary).contains("9-12"));
    }

    #[test]
    fn test_clause_order() {
        let prompt = PromptBuilder::build(&params("space", "a robot", Mood::Calming));
        let setting = prompt.find("set in space").unwrap();
        let characters = prompt.find("include a robot").unwrap();
        let mood = prompt.find("perfect for bedtime").unwrap();
        let closing = prompt.find("creative title").unwrap();
        assert!(setting < characters && characters < mood && mood < closing);
    }
}
