pub mod auth;
pub mod classify;
pub mod config;
pub mod courses;
pub mod history;
pub mod schedule;
pub mod watch;

use std::time::Duration;

use lockin_core::storage::Config;
use lockin_core::{
    LogNotifier, NotificationSink, OllamaGenerator, OllamaVision, ProductivityDefinition,
    ServiceError, SpeechNotifier,
};

/// Sink selected by `[notifications]`: speech when enabled, log-only
/// otherwise.
pub enum ConfiguredSink {
    Speech(SpeechNotifier),
    Log(LogNotifier),
}

impl NotificationSink for ConfiguredSink {
    async fn notify(&self, message: &str) -> Result<(), ServiceError> {
        match self {
            ConfiguredSink::Speech(sink) => sink.notify(message).await,
            ConfiguredSink::Log(sink) => sink.notify(message).await,
        }
    }
}

/// Build the notification sink configured in `[notifications]`.
pub fn sink(config: &Config) -> ConfiguredSink {
    if config.notifications.enabled {
        ConfiguredSink::Speech(SpeechNotifier::new(&config.notifications.speech_command))
    } else {
        ConfiguredSink::Log(LogNotifier)
    }
}

/// Build the text generator configured in `[services]`.
pub fn generator(config: &Config) -> Result<OllamaGenerator, Box<dyn std::error::Error>> {
    Ok(OllamaGenerator::new(
        &config.services.ollama_base_url,
        &config.services.text_model,
        config.services.temperature,
        Duration::from_secs(config.services.request_timeout_secs),
    )?)
}

/// Build the vision describer configured in `[services]`.
pub fn describer(config: &Config) -> Result<OllamaVision, Box<dyn std::error::Error>> {
    Ok(OllamaVision::new(
        &config.services.ollama_base_url,
        &config.services.vision_model,
        Duration::from_secs(config.services.request_timeout_secs),
    )?)
}

/// Resolve the session's productivity definition from a CLI topic or
/// the configured default.
pub fn definition(
    config: &Config,
    topic: Option<String>,
) -> Result<ProductivityDefinition, Box<dyn std::error::Error>> {
    let topic = topic
        .or_else(|| config.classifier.study_topic.clone())
        .ok_or("no study topic given; pass --topic or set classifier.study_topic")?;
    Ok(ProductivityDefinition::new(topic).with_base_rule(config.classifier.base_rule.clone()))
}
