//! Productivity definition.
//!
//! A [`ProductivityDefinition`] is the user-scoped rule describing what
//! counts as productive for the current session: a base procrastination
//! rule plus the free-text study topic. It renders to the JSON rule
//! string embedded in classification prompts.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Default base rule, used when the config does not override it.
pub const DEFAULT_BASE_RULE: &str =
    "Procrastination includes social media, entertainment, and non-study activities.";

/// User-scoped rule for what counts as productive.
///
/// Built once per session when the topic is submitted; read-only for
/// the session's duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductivityDefinition {
    pub study_topic: String,
    pub base_rule: String,
}

impl ProductivityDefinition {
    pub fn new(study_topic: impl Into<String>) -> Self {
        Self {
            study_topic: study_topic.into(),
            base_rule: DEFAULT_BASE_RULE.to_string(),
        }
    }

    pub fn with_base_rule(mut self, base_rule: impl Into<String>) -> Self {
        self.base_rule = base_rule.into();
        self
    }

    /// Render the JSON rule string embedded in prompts.
    pub fn render(&self) -> String {
        json!({
            "definition": self.base_rule,
            "study_topic": self.study_topic,
        })
        .to_string()
    }
}
