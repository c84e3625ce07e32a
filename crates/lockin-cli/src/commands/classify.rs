use std::path::Path;

use lockin_core::storage::Config;
use lockin_core::{classify_snapshot, ConfidenceAggregator, ObservationStore, VerdictClassifier};

/// One-shot classification of an image file.
///
/// Runs the same classify-and-notify path as the watch loop, so a
/// procrastination verdict fires the configured sink here too.
pub async fn run(
    image: &Path,
    topic: Option<String>,
    save: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let definition = super::definition(&config, topic)?;
    let aggregator = ConfidenceAggregator::new(config.classifier.confidence_threshold);

    let describer = super::describer(&config)?;
    let classifier = VerdictClassifier::new(super::generator(&config)?);
    let sink = super::sink(&config);

    let observation =
        classify_snapshot(&describer, &classifier, &aggregator, &sink, &definition, image).await;

    if save {
        let store = ObservationStore::open_default()?;
        let path = store.append(&observation)?;
        eprintln!("saved to {}", path.display());
    }

    println!("{}", serde_json::to_string_pretty(&observation)?);
    Ok(())
}
