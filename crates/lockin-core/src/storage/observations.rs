//! Observation store.
//!
//! Append-only persistence of observation records: one JSON file per
//! record under a store directory. File names are derived from the
//! record's unix timestamp; a same-second collision gets a `-<n>`
//! suffix instead of overwriting, so no data is ever dropped.
//!
//! Writes go to a temp file in the same directory followed by a
//! rename, so a concurrent `load_all` never observes a partial record.
//! Loading tolerates corrupt or empty units: they are skipped with a
//! warning, never failing the whole load.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use super::data_dir;
use crate::error::StoreError;
use crate::observation::Observation;

/// Directory-of-JSON-units store for observation records.
#[derive(Debug, Clone)]
pub struct ObservationStore {
    dir: PathBuf,
}

impl ObservationStore {
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
        Self::open(base.join("observations"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Durably record one observation. Returns the unit path.
    pub fn append(&self, observation: &Observation) -> Result<PathBuf, StoreError> {
        let stem = format!("observation_{}", observation.timestamp.timestamp());
        let path = self.unique_path(&stem);

        let json = serde_json::to_vec_pretty(observation)?;

        // Write-then-rename keeps each unit atomic for readers.
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

    /// Reconstruct the full history. Pure read, no ordering guarantee.
    ///
    /// Unreadable, empty, or unparseable units are skipped with a
    /// warning.
    pub fn load_all(&self) -> Result<Vec<Observation>, StoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| StoreError::ListFailed {
            path: self.dir.clone(),
            source,
        })?;

        let mut observations = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable store entry: {e}");
                    continue;
                }
            };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            Self::load_unit(&path, &mut observations);
        }

        Ok(observations)
    }

    fn load_unit(path: &Path, observations: &mut Vec<Observation>) {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("skipping unreadable observation unit {}: {e}", path.display());
                return;
            }
        };
        if content.trim().is_empty() {
            warn!("skipping empty observation unit {}", path.display());
            return;
        }

        // Units are usually one object; the historical exporter wrote
        // arrays of records, which the loader still accepts.
        let value: serde_json::Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!("skipping corrupt observation unit {}: {e}", path.display());
                return;
            }
        };

        let items = match value {
            serde_json::Value::Array(items) => items,
            other => vec![other],
        };
        for item in items {
            match serde_json::from_value::<Observation>(item) {
                Ok(observation) => observations.push(observation),
                Err(e) => {
                    warn!("skipping malformed record in {}: {e}", path.display());
                }
            }
        }
    }

    fn unique_path(&self, stem: &str) -> PathBuf {
        let candidate = self.dir.join(format!("{stem}.json"));
        if !candidate.exists() {
            return candidate;
        }
        for n in 1.. {
            let candidate = self.dir.join(format!("{stem}-{n}.json"));
            if !candidate.exists() {
                return candidate;
            }
        }
        unreachable!("suffix search is unbounded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::Label;
    use chrono::DateTime;

    fn obs(rfc3339: &str) -> Observation {
        Observation {
            timestamp: DateTime::parse_from_rfc3339(rfc3339).unwrap(),
            description: "an editor window".into(),
            label: Label::Productive,
            confidence: Some(0.85),
            justification: "code visible. Classification accepted.".into(),
            flagged: false,
        }
    }

    #[test]
    fn append_then_load_roundtrips_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObservationStore::open(dir.path()).unwrap();
        let original = obs("2025-02-08T10:00:00-05:00");

        store.append(&original).unwrap();
        let loaded = store.load_all().unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].timestamp, original.timestamp);
        assert_eq!(loaded[0].description, original.description);
        assert_eq!(loaded[0].label, original.label);
        assert_eq!(loaded[0].confidence, original.confidence);
        assert_eq!(loaded[0].justification, original.justification);
        assert_eq!(loaded[0].flagged, original.flagged);
    }

    #[test]
    fn colliding_timestamps_keep_both_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObservationStore::open(dir.path()).unwrap();
        let record = obs("2025-02-08T10:00:00-05:00");

        let first = store.append(&record).unwrap();
        let second = store.append(&record).unwrap();

        assert_ne!(first, second);
        assert_eq!(store.load_all().unwrap().len(), 2);
    }

    #[test]
    fn load_all_skips_corrupt_and_empty_units() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObservationStore::open(dir.path()).unwrap();
        store.append(&obs("2025-02-08T10:00:00-05:00")).unwrap();

        fs::write(dir.path().join("corrupt.json"), "{not json").unwrap();
        fs::write(dir.path().join("empty.json"), "").unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn load_all_accepts_array_units() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObservationStore::open(dir.path()).unwrap();

        let batch = vec![
            obs("2025-02-08T10:00:00-05:00"),
            obs("2025-02-08T11:00:00-05:00"),
        ];
        fs::write(
            dir.path().join("batch.json"),
            serde_json::to_vec(&batch).unwrap(),
        )
        .unwrap();

        assert_eq!(store.load_all().unwrap().len(), 2);
    }

    #[test]
    fn load_all_ignores_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObservationStore::open(dir.path()).unwrap();
        fs::write(dir.path().join("observation_1.json.tmp"), "partial").unwrap();
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn load_all_is_a_pure_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = ObservationStore::open(dir.path()).unwrap();
        store.append(&obs("2025-02-08T10:00:00-05:00")).unwrap();

        let before = fs::read_dir(dir.path()).unwrap().count();
        store.load_all().unwrap();
        let after = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(before, after);
    }
}
