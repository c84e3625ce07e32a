//! Schedule store.
//!
//! Generated schedules are persisted as `schedule_<unix_ts>.json`
//! units. Previous schedules are never mutated; a new generation
//! simply supersedes the old one, and `latest()` picks the newest by
//! generation time.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use super::data_dir;
use crate::error::StoreError;
use crate::schedule::DailySchedule;

/// Directory-of-JSON-units store for generated schedules.
#[derive(Debug, Clone)]
pub struct ScheduleStore {
    dir: PathBuf,
}

impl ScheduleStore {
    /// Open (creating if needed) a store at the given directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::OpenFailed {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Open the store at its default location under the data dir.
    pub fn open_default() -> Result<Self, StoreError> {
        let base = data_dir().map_err(|source| StoreError::OpenFailed {
            path: PathBuf::from("~/.config/lockin"),
            source,
        })?;
        Self::open(base.join("schedules"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist one schedule. Returns the unit path.
    pub fn save(&self, schedule: &DailySchedule) -> Result<PathBuf, StoreError> {
        let stem = format!("schedule_{}", schedule.generated_at.timestamp());
        let mut path = self.dir.join(format!("{stem}.json"));
        let mut n = 0;
        while path.exists() {
            n += 1;
            path = self.dir.join(format!("{stem}-{n}.json"));
        }

        let json = serde_json::to_vec_pretty(schedule)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &json).map_err(|source| StoreError::WriteFailed {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::WriteFailed {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// All persisted schedules, skipping unreadable units.
    pub fn list(&self) -> Result<Vec<DailySchedule>, StoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| StoreError::ListFailed {
            path: self.dir.clone(),
            source,
        })?;

        let mut schedules = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|content| {
                    serde_json::from_str::<DailySchedule>(&content).map_err(|e| e.to_string())
                }) {
                Ok(schedule) => schedules.push(schedule),
                Err(e) => warn!("skipping unreadable schedule unit {}: {e}", path.display()),
            }
        }
        Ok(schedules)
    }

    /// The most recently generated schedule, if any.
    pub fn latest(&self) -> Result<Option<DailySchedule>, StoreError> {
        let mut schedules = self.list()?;
        schedules.sort_by_key(|s| s.generated_at);
        Ok(schedules.pop())
    }
}
