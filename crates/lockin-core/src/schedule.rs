//! Daily schedule representation.
//!
//! A [`DailySchedule`] is a full 24-hour grid of half-hour slots keyed
//! by "HH:MM" strings ("00:00" through "23:30"), each mapped to a
//! should-study flag, plus a rationale for the allocation. Fixed-width
//! keys sort correctly in a `BTreeMap`, so iteration order is always
//! ascending time of day.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minutes covered by one slot.
pub const SLOT_MINUTES: u32 = 30;

/// Number of slots in a day.
pub const SLOTS_PER_DAY: usize = 48;

/// Total minutes representable in one schedule.
pub const MINUTES_PER_DAY: u32 = SLOT_MINUTES * SLOTS_PER_DAY as u32;

/// Key for the slot at the given index (0 => "00:00", 47 => "23:30").
pub fn slot_key(index: usize) -> String {
    format!("{:02}:{:02}", index / 2, (index % 2) * 30)
}

/// Index for a slot key, if it is a valid half-hour key.
pub fn slot_index(key: &str) -> Option<usize> {
    let (hours, minutes) = key.split_once(':')?;
    let hours: usize = hours.parse().ok()?;
    let minutes: usize = minutes.parse().ok()?;
    if hours < 24 && (minutes == 0 || minutes == 30) {
        Some(hours * 2 + minutes / 30)
    } else {
        None
    }
}

/// A synthesized daily study schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySchedule {
    pub id: String,
    pub generated_at: DateTime<FixedOffset>,
    /// Full 48-slot grid, "HH:MM" key to should-study flag.
    pub slots: BTreeMap<String, bool>,
    pub rationale: String,
    /// Sum of study slot durations; kept consistent with `slots`.
    pub total_study_minutes: u32,
}

impl DailySchedule {
    /// Build a schedule from a boolean grid, computing the total.
    pub fn from_grid(grid: &[bool; SLOTS_PER_DAY], rationale: String) -> Self {
        let slots: BTreeMap<String, bool> = grid
            .iter()
            .enumerate()
            .map(|(i, &study)| (slot_key(i), study))
            .collect();
        let total_study_minutes = grid.iter().filter(|&&s| s).count() as u32 * SLOT_MINUTES;
        Self {
            id: Uuid::new_v4().to_string(),
            generated_at: Local::now().fixed_offset(),
            slots,
            rationale,
            total_study_minutes,
        }
    }

    /// Study slot keys in ascending time order.
    pub fn study_slots(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|(_, &study)| study)
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// Render the schedule as an ICS calendar for one date.
    ///
    /// Each study slot becomes one 30-minute VEVENT titled `summary`.
    pub fn to_ics(&self, date: NaiveDate, summary: &str) -> String {
        let mut out = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//lockin//EN\r\n");
        let stamp = self.generated_at.format("%Y%m%dT%H%M%S");

        for (index, key) in self.study_slots().iter().enumerate() {
            // Keys come from slot_key; a hand-edited record may not
            // parse and is skipped.
            let Some(start) = NaiveTime::parse_from_str(key, "%H:%M").ok() else {
                continue;
            };
            let start = date.and_time(start);
            let end = start + Duration::minutes(SLOT_MINUTES as i64);
            out.push_str("BEGIN:VEVENT\r\n");
            out.push_str(&format!("UID:{}-{}@lockin\r\n", self.id, index));
            out.push_str(&format!("DTSTAMP:{stamp}\r\n"));
            out.push_str(&format!("DTSTART:{}\r\n", start.format("%Y%m%dT%H%M%S")));
            out.push_str(&format!("DTEND:{}\r\n", end.format("%Y%m%dT%H%M%S")));
            out.push_str(&format!("SUMMARY:{summary}\r\n"));
            out.push_str("END:VEVENT\r\n");
        }

        out.push_str("END:VCALENDAR\r\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_keys_cover_the_day() {
        assert_eq!(slot_key(0), "00:00");
        assert_eq!(slot_key(1), "00:30");
        assert_eq!(slot_key(19), "09:30");
        assert_eq!(slot_key(47), "23:30");
    }

    #[test]
    fn slot_index_roundtrips() {
        for i in 0..SLOTS_PER_DAY {
            assert_eq!(slot_index(&slot_key(i)), Some(i));
        }
        assert_eq!(slot_index("24:00"), None);
        assert_eq!(slot_index("10:15"), None);
        assert_eq!(slot_index("abc"), None);
    }

    #[test]
    fn from_grid_builds_complete_ordered_grid() {
        let mut grid = [false; SLOTS_PER_DAY];
        grid[18] = true; // 09:00
        grid[19] = true; // 09:30
        let schedule = DailySchedule::from_grid(&grid, "test".into());

        assert_eq!(schedule.slots.len(), SLOTS_PER_DAY);
        assert_eq!(schedule.total_study_minutes, 60);
        assert_eq!(schedule.study_slots(), vec!["09:00", "09:30"]);

        // BTreeMap iteration is ascending time of day.
        let keys: Vec<_> = schedule.slots.keys().cloned().collect();
        let expected: Vec<_> = (0..SLOTS_PER_DAY).map(slot_key).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn ics_renders_one_event_per_study_slot() {
        let mut grid = [false; SLOTS_PER_DAY];
        grid[20] = true; // 10:00
        grid[28] = true; // 14:00
        let schedule = DailySchedule::from_grid(&grid, "test".into());

        let date = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        let ics = schedule.to_ics(date, "Study: linear algebra");

        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        assert!(ics.contains("DTSTART:20250210T100000"));
        assert!(ics.contains("DTEND:20250210T103000"));
        assert!(ics.contains("DTSTART:20250210T140000"));
        assert!(ics.contains("SUMMARY:Study: linear algebra"));
        assert!(ics.starts_with("BEGIN:VCALENDAR"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }
}
