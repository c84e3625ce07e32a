//! Capture-and-classify pipeline.
//!
//! One cycle runs strictly in sequence: capture, describe, classify,
//! aggregate (which notifies on a procrastination verdict), persist.
//! The loop sleeps the configured interval after a completed cycle,
//! so a slow downstream call delays the next capture instead of
//! overlapping with it.
//!
//! Failure handling per cycle:
//! - capture failure: nothing to classify, the cycle is skipped;
//! - describe/classify failure: an error-labeled observation is
//!   persisted so the failure stays auditable;
//! - store write failure: the cycle fails, the loop continues.
//!
//! Only an interrupt stops the loop; an in-flight cycle is then
//! abandoned with a warning and nothing partial is persisted.

use std::time::Duration;

use log::{error, info, warn};

use crate::aggregator::ConfidenceAggregator;
use crate::classifier::VerdictClassifier;
use crate::definition::ProductivityDefinition;
use crate::observation::{Label, Observation};
use crate::services::{DescriptionService, NotificationSink, ScreenCapturer, TextGenerator};
use crate::storage::ObservationStore;

/// Outcome of one capture cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// An observation was persisted.
    Recorded { label: Label, flagged: bool },
    /// The screenshot could not be taken; nothing to classify.
    CaptureSkipped,
    /// The observation could not be persisted.
    StoreFailed,
}

/// The sequential capture-and-classify monitor.
pub struct Monitor<C, D, G, N> {
    capturer: C,
    describer: D,
    classifier: VerdictClassifier<G>,
    aggregator: ConfidenceAggregator,
    sink: N,
    store: ObservationStore,
    definition: ProductivityDefinition,
    interval: Duration,
}

impl<C, D, G, N> Monitor<C, D, G, N>
where
    C: ScreenCapturer,
    D: DescriptionService,
    G: TextGenerator,
    N: NotificationSink,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        capturer: C,
        describer: D,
        classifier: VerdictClassifier<G>,
        aggregator: ConfidenceAggregator,
        sink: N,
        store: ObservationStore,
        definition: ProductivityDefinition,
        interval: Duration,
    ) -> Self {
        Self {
            capturer,
            describer,
            classifier,
            aggregator,
            sink,
            store,
            definition,
            interval,
        }
    }

    /// Run one full cycle.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let image = match self.capturer.capture().await {
            Ok(path) => path,
            Err(e) => {
                warn!("screen capture failed, skipping cycle: {e}");
                return CycleOutcome::CaptureSkipped;
            }
        };

        let observation = classify_snapshot(
            &self.describer,
            &self.classifier,
            &self.aggregator,
            &self.sink,
            &self.definition,
            &image,
        )
        .await;

        match self.store.append(&observation) {
            Ok(path) => {
                info!(
                    "recorded {} observation (flagged: {}) at {}",
                    observation.label,
                    observation.flagged,
                    path.display()
                );
                CycleOutcome::Recorded {
                    label: observation.label,
                    flagged: observation.flagged,
                }
            }
            Err(e) => {
                error!("failed to persist observation: {e}");
                CycleOutcome::StoreFailed
            }
        }
    }

    /// Run the capture loop until interrupted.
    ///
    /// The interval is waited between completed cycles, not on a fixed
    /// wall clock.
    pub async fn run(&self) {
        info!(
            "watch loop started (topic: {}, interval: {}s)",
            self.definition.study_topic,
            self.interval.as_secs()
        );

        loop {
            tokio::select! {
                outcome = self.run_cycle() => {
                    if outcome == CycleOutcome::StoreFailed {
                        warn!("cycle failed to persist; continuing");
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    warn!("interrupt received; abandoning in-flight cycle");
                    break;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupt received; stopping watch loop");
                    break;
                }
            }
        }
    }
}

/// Describe, classify, and aggregate one snapshot, firing the
/// notification sink on a procrastination verdict.
///
/// This is the single classification path: the watch loop and the
/// one-shot CLI classification both go through it, so the sink fires
/// on every procrastination verdict regardless of how the snapshot was
/// obtained. Always returns a well-formed observation; upstream
/// failures become error-labeled records.
pub async fn classify_snapshot<D, G, N>(
    describer: &D,
    classifier: &VerdictClassifier<G>,
    aggregator: &ConfidenceAggregator,
    sink: &N,
    definition: &ProductivityDefinition,
    image: &std::path::Path,
) -> Observation
where
    D: DescriptionService,
    G: TextGenerator,
    N: NotificationSink,
{
    let observation = match describer.describe(image).await {
        Ok(description) => match classifier.classify(&description, definition).await {
            Ok(verdict) => aggregator.aggregate(verdict, &description),
            Err(e) => aggregator.failure_observation(&e),
        },
        Err(e) => aggregator.failure_observation(&e),
    };

    aggregator.notify_if_procrastinating(&observation, sink).await;
    observation
}
