//! Observation records.
//!
//! An [`Observation`] is one classified screen snapshot: a timestamp,
//! the description returned by the vision service, the verdict, and
//! whether the confidence aggregator escalated it for review. Records
//! are created once by the aggregator and never mutated afterwards.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Maximum description length kept in a persisted record.
///
/// Vision models can return multi-paragraph descriptions; only enough
/// text to support the schedule rationale needs to survive storage.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Classification label for a single observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Productive,
    Procrastinating,
    /// The service answered with a label outside the contract.
    Unknown,
    /// The pipeline failed before a verdict could be produced.
    Error,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Productive => "productive",
            Label::Procrastinating => "procrastinating",
            Label::Unknown => "unknown",
            Label::Error => "error",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw classifier output before aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawVerdict {
    pub label: Label,
    /// Confidence in [0, 1]. `None` means the service produced no score.
    pub confidence: Option<f64>,
    pub justification: String,
}

/// One timestamped, classified screen snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Wall-clock time of the snapshot, with its local offset so the
    /// time-of-day travels with the record.
    pub timestamp: DateTime<FixedOffset>,
    /// Description of on-screen content, truncated for storage.
    pub description: String,
    pub label: Label,
    pub confidence: Option<f64>,
    pub justification: String,
    /// True if the aggregator escalated this record for review.
    pub flagged: bool,
}

impl Observation {
    /// Truncate a description at a char boundary for storage.
    pub fn truncate_description(description: &str) -> String {
        if description.chars().count() <= MAX_DESCRIPTION_LEN {
            description.to_string()
        } else {
            description.chars().take(MAX_DESCRIPTION_LEN).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Label::Procrastinating).unwrap(),
            "\"procrastinating\""
        );
        assert_eq!(
            serde_json::from_str::<Label>("\"productive\"").unwrap(),
            Label::Productive
        );
    }

    #[test]
    fn observation_roundtrips_through_json() {
        let obs = Observation {
            timestamp: DateTime::parse_from_rfc3339("2025-02-08T10:15:00-05:00").unwrap(),
            description: "VS Code with a Rust project open".into(),
            label: Label::Productive,
            confidence: Some(0.9),
            justification: "code editor in focus".into(),
            flagged: false,
        };
        let json = serde_json::to_string(&obs).unwrap();
        let parsed: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.timestamp, obs.timestamp);
        assert_eq!(parsed.label, Label::Productive);
        assert_eq!(parsed.confidence, Some(0.9));
        assert!(!parsed.flagged);
    }

    #[test]
    fn truncate_keeps_short_descriptions() {
        let short = "a browser window";
        assert_eq!(Observation::truncate_description(short), short);
    }

    #[test]
    fn truncate_caps_long_descriptions() {
        let long = "x".repeat(2000);
        let truncated = Observation::truncate_description(&long);
        assert_eq!(truncated.chars().count(), MAX_DESCRIPTION_LEN);
    }
}
