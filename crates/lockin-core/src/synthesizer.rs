//! Schedule synthesizer.
//!
//! Converts the full observation history into a [`DailySchedule`] in
//! two passes. The evidence pass groups observations by half-hour
//! time-of-day bucket (dates ignored) and marks every bucket whose
//! history is productive and free of procrastination as a study slot.
//! The shortfall repair pass then tops the grid up to the required
//! minutes: procrastination-prone buckets first (evidence of wasted
//! time worth reclaiming), no-history buckets last, both in ascending
//! time order.
//!
//! The grid always has 48 buckets, so any requirement up to a full day
//! is satisfiable and the synthesizer never fails, regardless of how
//! sparse or malformed the history is.

use chrono::Timelike;
use log::warn;

use crate::observation::{Label, Observation};
use crate::schedule::{slot_key, DailySchedule, MINUTES_PER_DAY, SLOTS_PER_DAY, SLOT_MINUTES};
use crate::services::TextGenerator;

/// Default minimum study time per day, in minutes.
pub const DEFAULT_REQUIRED_MINUTES: u32 = 300;

/// How a bucket ended up in the study set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BucketEvidence {
    /// Productive history, no procrastination at this time.
    Productive,
    /// At least one procrastination verdict at this time.
    Prone,
    /// No usable history.
    None,
}

/// Synthesizes daily schedules from observation history.
#[derive(Debug, Clone, Default)]
pub struct ScheduleSynthesizer;

impl ScheduleSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Synthesize a schedule with a deterministic templated rationale.
    pub fn synthesize(&self, history: &[Observation], required_minutes: u32) -> DailySchedule {
        let (grid, rationale) = self.build_grid(history, required_minutes);
        DailySchedule::from_grid(&grid, rationale)
    }

    /// Synthesize a schedule, asking `generator` to enrich the
    /// rationale. The slot grid is never model-derived; if the service
    /// fails or returns nothing usable, the templated rationale is
    /// kept.
    pub async fn synthesize_with_narrative<G: TextGenerator>(
        &self,
        history: &[Observation],
        required_minutes: u32,
        generator: &G,
    ) -> DailySchedule {
        let (grid, template) = self.build_grid(history, required_minutes);

        let prompt = narrative_prompt(&grid, &template, history.len());
        let rationale = match generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!("narrative service returned empty text; keeping templated rationale");
                template
            }
            Err(e) => {
                warn!("narrative service unavailable ({e}); keeping templated rationale");
                template
            }
        };

        DailySchedule::from_grid(&grid, rationale)
    }

    fn build_grid(
        &self,
        history: &[Observation],
        required_minutes: u32,
    ) -> ([bool; SLOTS_PER_DAY], String) {
        // A full day is the grid's capacity; anything beyond it is
        // unsatisfiable on a 24-hour grid.
        let required_minutes = required_minutes.min(MINUTES_PER_DAY);

        let evidence = classify_buckets(history);

        // Pass 1: direct evidence.
        let mut grid = [false; SLOTS_PER_DAY];
        for (index, kind) in evidence.iter().enumerate() {
            grid[index] = *kind == BucketEvidence::Productive;
        }
        let evidence_slots: Vec<usize> = (0..SLOTS_PER_DAY).filter(|&i| grid[i]).collect();

        // Pass 2: shortfall repair, prone buckets before no-history
        // ones, both ascending.
        let mut repaired_prone = Vec::new();
        let mut repaired_default = Vec::new();
        for kind in [BucketEvidence::Prone, BucketEvidence::None] {
            for index in 0..SLOTS_PER_DAY {
                if total_minutes(&grid) >= required_minutes {
                    break;
                }
                if !grid[index] && evidence[index] == kind {
                    grid[index] = true;
                    match kind {
                        BucketEvidence::Prone => repaired_prone.push(index),
                        _ => repaired_default.push(index),
                    }
                }
            }
        }

        let rationale = template_rationale(
            history.is_empty(),
            &evidence_slots,
            &repaired_prone,
            &repaired_default,
            total_minutes(&grid),
            required_minutes,
        );

        (grid, rationale)
    }
}

fn total_minutes(grid: &[bool; SLOTS_PER_DAY]) -> u32 {
    grid.iter().filter(|&&s| s).count() as u32 * SLOT_MINUTES
}

/// Half-hour bucket index for an observation's local wall clock.
fn bucket_of(observation: &Observation) -> usize {
    (observation.timestamp.hour() * 2 + observation.timestamp.minute() / 30) as usize
}

fn classify_buckets(history: &[Observation]) -> [BucketEvidence; SLOTS_PER_DAY] {
    let mut productive = [0u32; SLOTS_PER_DAY];
    let mut procrastinating = [0u32; SLOTS_PER_DAY];

    for observation in history {
        let bucket = bucket_of(observation);
        match observation.label {
            Label::Productive => productive[bucket] += 1,
            Label::Procrastinating => procrastinating[bucket] += 1,
            // Unknown and error records carry no behavioral evidence.
            Label::Unknown | Label::Error => {}
        }
    }

    let mut evidence = [BucketEvidence::None; SLOTS_PER_DAY];
    for index in 0..SLOTS_PER_DAY {
        evidence[index] = if procrastinating[index] > 0 {
            // Mixed buckets count as prone: they are evidence-bearing,
            // so repair prefers them over untouched time.
            BucketEvidence::Prone
        } else if productive[index] > 0 {
            BucketEvidence::Productive
        } else {
            BucketEvidence::None
        };
    }
    evidence
}

fn keys(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|&i| slot_key(i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn template_rationale(
    empty_history: bool,
    evidence_slots: &[usize],
    repaired_prone: &[usize],
    repaired_default: &[usize],
    total: u32,
    required: u32,
) -> String {
    let mut parts = Vec::new();

    if empty_history {
        parts.push(
            "No behavioral evidence was available; the allocation is a default fill in ascending time order."
                .to_string(),
        );
    } else if evidence_slots.is_empty() {
        parts.push("No historically productive time slots were found.".to_string());
    } else {
        parts.push(format!(
            "Slots allocated from productive history: {}.",
            keys(evidence_slots)
        ));
    }

    if !repaired_prone.is_empty() {
        parts.push(format!(
            "Slots reclaimed from procrastination-prone time to meet the requirement: {}.",
            keys(repaired_prone)
        ));
    }
    if !repaired_default.is_empty() && !empty_history {
        parts.push(format!(
            "Slots added without historical evidence to meet the requirement: {}.",
            keys(repaired_default)
        ));
    }

    parts.push(format!(
        "Total scheduled study time: {total} minutes against a required minimum of {required} minutes."
    ));

    parts.join(" ")
}

fn narrative_prompt(grid: &[bool; SLOTS_PER_DAY], template: &str, history_len: usize) -> String {
    let study: Vec<String> = (0..SLOTS_PER_DAY)
        .filter(|&i| grid[i])
        .map(slot_key)
        .collect();
    format!(
        "You are a productivity coach. A study schedule was generated from {history_len} \
         screen-activity observations. The scheduled study slots are: {slots}.\n\
         The allocation summary is: {template}\n\
         Rewrite this as a short, encouraging explanation of how the schedule uses the \
         student's productive hours and reclaims procrastination-prone time. \
         Do not change any times. Reply with plain text only.",
        slots = study.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use chrono::DateTime;

    fn obs(time: &str, label: Label) -> Observation {
        Observation {
            timestamp: DateTime::parse_from_rfc3339(&format!("2025-02-08T{time}:00-05:00"))
                .unwrap(),
            description: "desc".into(),
            label,
            confidence: Some(0.9),
            justification: "test".into(),
            flagged: false,
        }
    }

    struct FailingGenerator;

    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, ServiceError> {
            Err(ServiceError::Unavailable("no model loaded".into()))
        }
    }

    struct EchoGenerator;

    impl TextGenerator for EchoGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, ServiceError> {
            Ok("A focused morning plan built from your habits.".into())
        }
    }

    #[test]
    fn empty_history_fills_ascending_from_midnight() {
        let schedule = ScheduleSynthesizer::new().synthesize(&[], 300);
        assert_eq!(schedule.total_study_minutes, 300);
        let expected: Vec<String> = (0..10).map(slot_key).collect();
        assert_eq!(schedule.study_slots(), expected);
        assert!(schedule.rationale.contains("No behavioral evidence"));
    }

    #[test]
    fn productive_history_maps_directly() {
        let history = vec![
            obs("10:00", Label::Productive),
            obs("10:10", Label::Productive),
            obs("14:00", Label::Procrastinating),
        ];
        // Requirement met by evidence alone.
        let schedule = ScheduleSynthesizer::new().synthesize(&history, 30);
        assert_eq!(schedule.study_slots(), vec!["10:00"]);
        assert!(schedule.rationale.contains("productive history: 10:00"));
    }

    #[test]
    fn mixed_bucket_is_not_marked_by_evidence() {
        let history = vec![
            obs("10:00", Label::Productive),
            obs("10:20", Label::Procrastinating),
        ];
        let schedule = ScheduleSynthesizer::new().synthesize(&history, 0);
        assert!(schedule.study_slots().is_empty());
    }

    #[test]
    fn repair_prefers_prone_buckets_over_untouched_time() {
        let history = vec![
            obs("10:00", Label::Productive),
            obs("14:00", Label::Procrastinating),
        ];
        // One productive slot gives 30 minutes; require one more slot.
        let schedule = ScheduleSynthesizer::new().synthesize(&history, 60);
        assert_eq!(schedule.study_slots(), vec!["10:00", "14:00"]);
        assert!(schedule.rationale.contains("procrastination-prone"));
    }

    #[test]
    fn repair_falls_back_to_no_history_buckets() {
        let history = vec![
            obs("10:00", Label::Productive),
            obs("14:00", Label::Procrastinating),
        ];
        // 90 minutes needs a third slot; the only prone bucket is
        // exhausted, so the earliest untouched bucket is used.
        let schedule = ScheduleSynthesizer::new().synthesize(&history, 90);
        assert_eq!(schedule.study_slots(), vec!["00:00", "10:00", "14:00"]);
    }

    #[test]
    fn unknown_and_error_records_carry_no_evidence() {
        let history = vec![obs("09:00", Label::Unknown), obs("11:00", Label::Error)];
        let schedule = ScheduleSynthesizer::new().synthesize(&history, 0);
        assert!(schedule.study_slots().is_empty());
    }

    #[test]
    fn requirement_of_full_day_marks_every_slot() {
        let schedule = ScheduleSynthesizer::new().synthesize(&[], 1440);
        assert_eq!(schedule.total_study_minutes, 1440);
        assert_eq!(schedule.study_slots().len(), SLOTS_PER_DAY);
    }

    #[test]
    fn requirement_above_capacity_is_clamped() {
        let schedule = ScheduleSynthesizer::new().synthesize(&[], 5000);
        assert_eq!(schedule.total_study_minutes, 1440);
    }

    #[test]
    fn zero_requirement_is_trivially_satisfied() {
        let schedule = ScheduleSynthesizer::new().synthesize(&[], 0);
        assert_eq!(schedule.total_study_minutes, 0);
    }

    #[test]
    fn rationale_states_total_against_requirement() {
        let schedule = ScheduleSynthesizer::new().synthesize(&[], 120);
        assert!(schedule
            .rationale
            .contains("120 minutes against a required minimum of 120"));
    }

    #[tokio::test]
    async fn narrative_failure_falls_back_to_template() {
        let synthesizer = ScheduleSynthesizer::new();
        let history = vec![obs("10:00", Label::Productive)];

        let plain = synthesizer.synthesize(&history, 300);
        let enriched = synthesizer
            .synthesize_with_narrative(&history, 300, &FailingGenerator)
            .await;

        assert_eq!(enriched.slots, plain.slots);
        assert_eq!(enriched.rationale, plain.rationale);
    }

    #[tokio::test]
    async fn narrative_success_replaces_prose_but_not_slots() {
        let synthesizer = ScheduleSynthesizer::new();
        let history = vec![obs("10:00", Label::Productive)];

        let plain = synthesizer.synthesize(&history, 300);
        let enriched = synthesizer
            .synthesize_with_narrative(&history, 300, &EchoGenerator)
            .await;

        assert_eq!(enriched.slots, plain.slots);
        assert_eq!(enriched.rationale, "A focused morning plan built from your habits.");
    }
}
