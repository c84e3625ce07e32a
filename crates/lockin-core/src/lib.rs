//! # lockin Core Library
//!
//! Core logic for lockin, a screen-activity study coach: a periodic
//! capture loop classifies screen snapshots as productive or
//! procrastinating against a user-supplied study topic, persists the
//! verdicts, and synthesizes a daily half-hour study schedule from the
//! accumulated history.
//!
//! ## Architecture
//!
//! - **Classification pipeline**: description service (vision model)
//!   feeding the [`VerdictClassifier`], whose raw verdicts the
//!   [`ConfidenceAggregator`] accepts or escalates for review
//! - **Storage**: JSON-unit observation and schedule stores plus
//!   TOML-based configuration under `~/.config/lockin`
//! - **Schedule synthesis**: evidence-based slot allocation with
//!   shortfall repair over the full observation history
//! - **Services**: injected adapters for Ollama, screen capture, and
//!   speech notification; the Canvas LMS client supplies course data
//!
//! ## Key Components
//!
//! - [`Monitor`]: the sequential capture-and-classify loop
//! - [`ScheduleSynthesizer`]: history to daily schedule
//! - [`ObservationStore`] / [`ScheduleStore`]: persistence
//! - [`Config`]: application configuration management

pub mod aggregator;
pub mod classifier;
pub mod definition;
pub mod error;
pub mod integrations;
pub mod observation;
pub mod pipeline;
pub mod schedule;
pub mod services;
pub mod storage;
pub mod synthesizer;

pub use aggregator::{ConfidenceAggregator, DEFAULT_CONFIDENCE_THRESHOLD};
pub use classifier::VerdictClassifier;
pub use definition::ProductivityDefinition;
pub use error::{ConfigError, CoreError, ServiceError, StoreError};
pub use observation::{Label, Observation, RawVerdict};
pub use pipeline::{classify_snapshot, CycleOutcome, Monitor};
pub use schedule::DailySchedule;
pub use services::{
    CommandCapturer, DescriptionService, LogNotifier, NotificationSink, OllamaGenerator,
    OllamaVision, ScreenCapturer, SpeechNotifier, TextGenerator,
};
pub use storage::{Config, ObservationStore, ScheduleStore};
pub use synthesizer::{ScheduleSynthesizer, DEFAULT_REQUIRED_MINUTES};
