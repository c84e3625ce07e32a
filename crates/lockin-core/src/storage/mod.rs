//! Persistence: configuration, observation store, schedule store.

pub mod config;
pub mod observations;
pub mod schedules;

pub use config::Config;
pub use observations::ObservationStore;
pub use schedules::ScheduleStore;

use std::path::PathBuf;

/// Returns `~/.config/lockin[-dev]/` based on LOCKIN_ENV.
///
/// Set LOCKIN_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("LOCKIN_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("lockin-dev")
    } else {
        base_dir.join("lockin")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
