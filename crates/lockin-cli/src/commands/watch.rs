use std::time::Duration;

use lockin_core::storage::{data_dir, Config};
use lockin_core::{
    CommandCapturer, ConfidenceAggregator, Monitor, ObservationStore, VerdictClassifier,
};

pub async fn run(
    topic: Option<String>,
    interval: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let definition = super::definition(&config, topic)?;

    let screenshots_dir = match &config.monitor.screenshots_dir {
        Some(dir) => dir.into(),
        None => data_dir()?.join("screenshots"),
    };
    let capturer = CommandCapturer::new(&config.monitor.screenshot_command, screenshots_dir);

    let sink = super::sink(&config);

    let interval = interval.unwrap_or(config.monitor.capture_interval_seconds);

    let monitor = Monitor::new(
        capturer,
        super::describer(&config)?,
        VerdictClassifier::new(super::generator(&config)?),
        ConfidenceAggregator::new(config.classifier.confidence_threshold),
        sink,
        ObservationStore::open_default()?,
        definition,
        Duration::from_secs(interval),
    );

    monitor.run().await;
    Ok(())
}
