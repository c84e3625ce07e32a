use chrono::Timelike;
use clap::Subcommand;
use lockin_core::schedule::{slot_key, SLOTS_PER_DAY};
use lockin_core::{Label, Observation, ObservationStore};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded observations, oldest first
    List {
        /// Only show the most recent N records
        #[arg(long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Per-slot day profile aggregated across all dates
    Profile,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = ObservationStore::open_default()?;
    let mut history = store.load_all()?;
    history.sort_by_key(|o| o.timestamp);

    match action {
        HistoryAction::List { limit, json } => {
            if let Some(limit) = limit {
                let skip = history.len().saturating_sub(limit);
                history.drain(..skip);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else {
                for record in &history {
                    let flag = if record.flagged { " [flagged]" } else { "" };
                    let confidence = record
                        .confidence
                        .map(|c| format!("{c:.2}"))
                        .unwrap_or_else(|| "-".into());
                    println!(
                        "{}  {:<15} {}{}",
                        record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        record.label.to_string(),
                        confidence,
                        flag
                    );
                }
            }
        }
        HistoryAction::Profile => {
            print!("{}", render_day_profile(&history));
        }
    }
    Ok(())
}

/// ASCII day profile: per half-hour slot, productive vs
/// procrastination counts across all recorded dates.
fn render_day_profile(history: &[Observation]) -> String {
    let mut productive = [0u32; SLOTS_PER_DAY];
    let mut procrastinating = [0u32; SLOTS_PER_DAY];

    for record in history {
        let bucket = (record.timestamp.hour() * 2 + record.timestamp.minute() / 30) as usize;
        match record.label {
            Label::Productive => productive[bucket] += 1,
            Label::Procrastinating => procrastinating[bucket] += 1,
            _ => {}
        }
    }

    let mut output = String::from("\nDay Profile (productive + / procrastinating -)\n");
    output.push_str(&"─".repeat(50));
    output.push('\n');

    for slot in 0..SLOTS_PER_DAY {
        if productive[slot] == 0 && procrastinating[slot] == 0 {
            continue;
        }
        let plus = "+".repeat(productive[slot].min(30) as usize);
        let minus = "-".repeat(procrastinating[slot].min(30) as usize);
        output.push_str(&format!("{} {}{}\n", slot_key(slot), plus, minus));
    }

    if history.is_empty() {
        output.push_str("No observations recorded yet.\n");
    }
    output.push_str(&"─".repeat(50));
    output.push('\n');
    output
}
