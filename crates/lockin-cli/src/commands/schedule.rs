use clap::Subcommand;
use lockin_core::storage::Config;
use lockin_core::{ObservationStore, ScheduleStore, ScheduleSynthesizer};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Generate a schedule from the observation history
    Generate {
        /// Minimum study minutes (falls back to config)
        #[arg(long)]
        required_minutes: Option<u32>,
        /// Enrich the rationale via the text model (falls back to the
        /// templated rationale on service failure)
        #[arg(long)]
        narrative: bool,
    },
    /// Show the latest generated schedule
    Show,
    /// Export the latest schedule as ICS
    Export {
        /// Date for the calendar events (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<std::path::PathBuf>,
    },
}

pub async fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ScheduleAction::Generate {
            required_minutes,
            narrative,
        } => {
            let config = Config::load_or_default();
            let required = required_minutes.unwrap_or(config.schedule.required_minutes);

            let history = ObservationStore::open_default()?.load_all()?;
            let synthesizer = ScheduleSynthesizer::new();

            let schedule = if narrative {
                let generator = super::generator(&config)?;
                synthesizer
                    .synthesize_with_narrative(&history, required, &generator)
                    .await
            } else {
                synthesizer.synthesize(&history, required)
            };

            ScheduleStore::open_default()?.save(&schedule)?;
            println!("{}", serde_json::to_string_pretty(&schedule)?);
        }
        ScheduleAction::Show => match ScheduleStore::open_default()?.latest()? {
            Some(schedule) => println!("{}", serde_json::to_string_pretty(&schedule)?),
            None => println!("no schedule generated yet"),
        },
        ScheduleAction::Export { date, output } => {
            let Some(schedule) = ScheduleStore::open_default()?.latest()? else {
                return Err("no schedule generated yet".into());
            };

            let date = match date {
                Some(date) => chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d")?,
                None => chrono::Local::now().date_naive(),
            };

            let config = Config::load_or_default();
            let summary = match (
                &config.canvas.selected_course_name,
                &config.classifier.study_topic,
            ) {
                (Some(course), _) => format!("Study: {course}"),
                (None, Some(topic)) => format!("Self study: {topic}"),
                (None, None) => "Study session".to_string(),
            };

            let ics = schedule.to_ics(date, &summary);
            match output {
                Some(path) => {
                    std::fs::write(&path, ics)?;
                    println!("exported to {}", path.display());
                }
                None => print!("{ics}"),
            }
        }
    }
    Ok(())
}
