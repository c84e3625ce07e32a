//! Property tests for the schedule synthesizer.

use chrono::DateTime;
use proptest::prelude::*;

use lockin_core::schedule::{slot_index, MINUTES_PER_DAY, SLOTS_PER_DAY};
use lockin_core::{Label, Observation, ScheduleSynthesizer};

fn arb_label() -> impl Strategy<Value = Label> {
    prop_oneof![
        Just(Label::Productive),
        Just(Label::Procrastinating),
        Just(Label::Unknown),
        Just(Label::Error),
    ]
}

fn arb_observation() -> impl Strategy<Value = Observation> {
    (0u32..24, 0u32..60, arb_label(), proptest::option::of(0.0f64..=1.0)).prop_map(
        |(hour, minute, label, confidence)| Observation {
            timestamp: DateTime::parse_from_rfc3339(&format!(
                "2025-02-08T{hour:02}:{minute:02}:00-05:00"
            ))
            .unwrap(),
            description: "generated".into(),
            label,
            confidence,
            justification: "generated".into(),
            flagged: false,
        },
    )
}

proptest! {
    /// The core schedule invariant: the total never falls short of the
    /// requirement, for any history and any requirement up to a day.
    #[test]
    fn total_meets_requirement(
        history in proptest::collection::vec(arb_observation(), 0..100),
        required in 0u32..=MINUTES_PER_DAY,
    ) {
        let schedule = ScheduleSynthesizer::new().synthesize(&history, required);
        prop_assert!(schedule.total_study_minutes >= required);
    }

    /// The grid is always complete: 48 keyed slots, every key valid,
    /// and the reported total consistent with the flags.
    #[test]
    fn grid_is_complete_and_consistent(
        history in proptest::collection::vec(arb_observation(), 0..60),
        required in 0u32..=MINUTES_PER_DAY,
    ) {
        let schedule = ScheduleSynthesizer::new().synthesize(&history, required);
        prop_assert_eq!(schedule.slots.len(), SLOTS_PER_DAY);
        for key in schedule.slots.keys() {
            prop_assert!(slot_index(key).is_some());
        }
        let true_minutes = schedule.slots.values().filter(|&&s| s).count() as u32 * 30;
        prop_assert_eq!(schedule.total_study_minutes, true_minutes);
    }

    /// Buckets with productive-only history are always study slots.
    #[test]
    fn productive_evidence_is_never_dropped(
        hour in 0u32..24,
        required in 0u32..=MINUTES_PER_DAY,
    ) {
        let history = vec![Observation {
            timestamp: DateTime::parse_from_rfc3339(
                &format!("2025-02-08T{hour:02}:00:00-05:00")
            ).unwrap(),
            description: "generated".into(),
            label: Label::Productive,
            confidence: Some(0.9),
            justification: "generated".into(),
            flagged: false,
        }];
        let schedule = ScheduleSynthesizer::new().synthesize(&history, required);
        let key = format!("{hour:02}:00");
        prop_assert_eq!(schedule.slots.get(&key), Some(&true));
    }
}
