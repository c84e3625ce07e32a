//! Verdict classifier.
//!
//! Turns a screen description plus a productivity definition into a
//! structured [`RawVerdict`] by prompting the text generation service
//! once and parsing whatever JSON object the response contains.
//!
//! Responses are not guaranteed to be clean JSON; models wrap objects
//! in prose, code fences, or trailing commentary. The parser takes the
//! substring between the first `{` and the last `}` and parses only
//! that. No balanced braces, or an unparseable substring, is a
//! [`ServiceError::MalformedOutput`].

use crate::definition::ProductivityDefinition;
use crate::error::ServiceError;
use crate::observation::{Label, RawVerdict};
use crate::services::TextGenerator;

/// Classifies screen descriptions against a productivity definition.
pub struct VerdictClassifier<G> {
    generator: G,
}

impl<G: TextGenerator> VerdictClassifier<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Classify a description. One outbound call, no retries.
    pub async fn classify(
        &self,
        description: &str,
        definition: &ProductivityDefinition,
    ) -> Result<RawVerdict, ServiceError> {
        if description.trim().is_empty() {
            return Err(ServiceError::EmptyInput(
                "screen description is empty".into(),
            ));
        }

        let prompt = build_prompt(description, definition);
        let response = self.generator.generate(&prompt).await?;
        parse_verdict(&response)
    }
}

fn build_prompt(description: &str, definition: &ProductivityDefinition) -> String {
    format!(
        "You are analyzing a screenshot of a student's screen.\n\
         Visual description of the screen:\n{description}\n\n\
         The student's productivity rule is the following JSON:\n{rule}\n\n\
         Based on the description and the rule, classify the activity.\n\
         Consider:\n\
         - The type of application or website visible\n\
         - The nature of the content (study, work, entertainment, social)\n\
         - Whether the content relates to the study topic\n\n\
         Return a single JSON object with:\n\
         - \"label\": either \"productive\" or \"procrastinating\"\n\
         - \"confidence\": a number between 0 and 1\n\
         - \"reasoning\": a brief explanation of the classification\n\n\
         JSON response:",
        rule = definition.render(),
    )
}

/// Parse the first JSON object embedded in a raw model response.
pub fn parse_verdict(response: &str) -> Result<RawVerdict, ServiceError> {
    let start = response.find('{');
    let end = response.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &response[start..=end],
        _ => {
            return Err(ServiceError::MalformedOutput(
                "no JSON object found in response".into(),
            ))
        }
    };

    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| ServiceError::MalformedOutput(format!("unparseable JSON object: {e}")))?;

    let label = match value.get("label").and_then(|v| v.as_str()) {
        Some("productive") => Label::Productive,
        // One historical prompt asked for "procrastination" as the
        // label value; accept both spellings.
        Some("procrastinating") | Some("procrastination") => Label::Procrastinating,
        _ => Label::Unknown,
    };

    let confidence = ["confidence", "score"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_f64()))
        .map(|c| c.clamp(0.0, 1.0));

    let justification = ["reasoning", "justification", "context"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .unwrap_or("No justification provided")
        .to_string();

    Ok(RawVerdict {
        label,
        confidence,
        justification,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGenerator(String);

    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, ServiceError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn parses_object_surrounded_by_noise() {
        let response =
            "noise {\"label\": \"procrastinating\", \"reasoning\": \"watching video\"} trailing";
        let verdict = parse_verdict(response).unwrap();
        assert_eq!(verdict.label, Label::Procrastinating);
        assert_eq!(verdict.justification, "watching video");
        assert_eq!(verdict.confidence, None);
    }

    #[test]
    fn response_without_braces_is_malformed() {
        let err = parse_verdict("I cannot classify this screen.").unwrap_err();
        assert!(matches!(err, ServiceError::MalformedOutput(_)));
    }

    #[test]
    fn inverted_braces_are_malformed() {
        let err = parse_verdict("} label: productive {").unwrap_err();
        assert!(matches!(err, ServiceError::MalformedOutput(_)));
    }

    #[test]
    fn unparseable_object_is_malformed() {
        let err = parse_verdict("{label: productive,}").unwrap_err();
        assert!(matches!(err, ServiceError::MalformedOutput(_)));
    }

    #[test]
    fn accepts_score_and_context_aliases() {
        let response = "{\"label\": \"productive\", \"score\": 0.92, \"context\": \"lecture notes open\"}";
        let verdict = parse_verdict(response).unwrap();
        assert_eq!(verdict.label, Label::Productive);
        assert_eq!(verdict.confidence, Some(0.92));
        assert_eq!(verdict.justification, "lecture notes open");
    }

    #[test]
    fn accepts_procrastination_spelling() {
        let verdict = parse_verdict("{\"label\": \"procrastination\"}").unwrap();
        assert_eq!(verdict.label, Label::Procrastinating);
    }

    #[test]
    fn unexpected_label_becomes_unknown() {
        let verdict = parse_verdict("{\"label\": \"idle\", \"reasoning\": \"screensaver\"}").unwrap();
        assert_eq!(verdict.label, Label::Unknown);
    }

    #[test]
    fn confidence_is_clamped_to_unit_interval() {
        let verdict = parse_verdict("{\"label\": \"productive\", \"confidence\": 1.7}").unwrap();
        assert_eq!(verdict.confidence, Some(1.0));
    }

    #[tokio::test]
    async fn classify_rejects_empty_description() {
        let classifier = VerdictClassifier::new(FixedGenerator("{}".into()));
        let definition = ProductivityDefinition::new("math");
        let err = classifier.classify("  ", &definition).await.unwrap_err();
        assert!(matches!(err, ServiceError::EmptyInput(_)));
    }

    #[tokio::test]
    async fn classify_parses_generator_response() {
        let classifier = VerdictClassifier::new(FixedGenerator(
            "{\"label\": \"productive\", \"confidence\": 0.8, \"reasoning\": \"IDE open\"}".into(),
        ));
        let definition = ProductivityDefinition::new("rust");
        let verdict = classifier
            .classify("an IDE with Rust source", &definition)
            .await
            .unwrap();
        assert_eq!(verdict.label, Label::Productive);
        assert_eq!(verdict.confidence, Some(0.8));
    }
}
