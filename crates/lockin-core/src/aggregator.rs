//! Confidence aggregator.
//!
//! Decides whether a raw verdict is accepted directly or escalated for
//! review, and turns pipeline failures into error-labeled observations
//! so the caller always receives a well-formed record. Escalation is a
//! plain two-branch decision inside the same cycle; no separate
//! refinement job exists.
//!
//! A verdict with no confidence score is accepted unflagged: some
//! generation setups never emit a score, and the absence of one is not
//! evidence against the label. Only a score below the threshold
//! escalates.

use chrono::{DateTime, FixedOffset, Local};
use log::warn;

use crate::error::ServiceError;
use crate::observation::{Label, Observation, RawVerdict};
use crate::services::NotificationSink;

/// Default escalation threshold.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.75;

/// Message spoken/sent when a procrastination verdict is recorded.
pub const PROCRASTINATION_ALERT: &str =
    "You have been caught procrastinating. Please get back to your study schedule.";

const ACCEPTED_MESSAGE: &str = "Classification accepted.";
const REVIEW_MESSAGE: &str = "Low confidence - requires further review.";
const UNKNOWN_MESSAGE: &str = "Label not recognized; recorded as unknown.";

/// Turns raw verdicts into final observation records.
#[derive(Debug, Clone)]
pub struct ConfidenceAggregator {
    threshold: f64,
}

impl Default for ConfidenceAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

impl ConfidenceAggregator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Aggregate a verdict into an observation stamped with the current
    /// local time.
    pub fn aggregate(&self, verdict: RawVerdict, description: &str) -> Observation {
        self.aggregate_at(verdict, description, Local::now().fixed_offset())
    }

    /// Aggregate a verdict into an observation with an explicit
    /// timestamp.
    pub fn aggregate_at(
        &self,
        verdict: RawVerdict,
        description: &str,
        timestamp: DateTime<FixedOffset>,
    ) -> Observation {
        let escalate = matches!(verdict.confidence, Some(c) if c < self.threshold);

        let justification = if escalate {
            format!("{} {REVIEW_MESSAGE}", verdict.justification)
        } else if verdict.label == Label::Unknown {
            // An out-of-contract label is recorded, not endorsed.
            format!("{} {UNKNOWN_MESSAGE}", verdict.justification)
        } else {
            format!("{} {ACCEPTED_MESSAGE}", verdict.justification)
        };

        Observation {
            timestamp,
            description: Observation::truncate_description(description),
            label: verdict.label,
            confidence: verdict.confidence,
            justification,
            flagged: escalate,
        }
    }

    /// Build an error-labeled observation for an upstream failure.
    ///
    /// Never escalates: there is no verdict to review, only a failure
    /// to audit.
    pub fn failure_observation(&self, err: &ServiceError) -> Observation {
        self.failure_observation_at(err, Local::now().fixed_offset())
    }

    /// Error-labeled observation with an explicit timestamp.
    pub fn failure_observation_at(
        &self,
        err: &ServiceError,
        timestamp: DateTime<FixedOffset>,
    ) -> Observation {
        Observation {
            timestamp,
            description: String::new(),
            label: Label::Error,
            confidence: Some(0.0),
            justification: format!("Classification failed: {err}"),
            flagged: false,
        }
    }

    /// Fire the notification sink if the finalized observation is a
    /// procrastination verdict. Sink failures are logged, never
    /// propagated.
    pub async fn notify_if_procrastinating<N: NotificationSink>(
        &self,
        observation: &Observation,
        sink: &N,
    ) {
        if observation.label != Label::Procrastinating {
            return;
        }
        if let Err(e) = sink.notify(PROCRASTINATION_ALERT).await {
            warn!("notification sink failed: {e}");
        }
    }
}
