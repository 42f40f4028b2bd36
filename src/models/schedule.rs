//! Timetable (decoded solution) model.
//!
//! A timetable is the human-readable view of a candidate: one entry per
//! block with the slot, room and teacher resolved to their records. It is
//! what the reporting layer consumes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::{Day, RoomKind};

/// A decoded weekly timetable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timetable {
    /// One entry per block, in block order.
    pub entries: Vec<TimetableEntry>,
}

/// One scheduled session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub subject_id: String,
    pub subject_name: String,
    /// Group label, e.g. `"1/2"`.
    pub group: String,
    pub students: u32,
    pub day: Day,
    /// Time label, e.g. `"07:00-09:00"`.
    pub time: String,
    pub start_hour: u32,
    pub end_hour: u32,
    pub room_id: String,
    pub room_capacity: u32,
    pub room_kind: RoomKind,
    pub teacher_id: String,
    pub teacher_name: String,
    /// Room kind the block asked for.
    pub required_kind: RoomKind,
}

impl TimetableEntry {
    /// Session length in hours.
    #[inline]
    pub fn hours(&self) -> u32 {
        self.end_hour - self.start_hour
    }

    /// Grouping key, e.g. `"Monday - 07:00-09:00"`.
    pub fn slot_key(&self) -> String {
        format!("{} - {}", self.day, self.time)
    }
}

impl Timetable {
    /// Creates an empty timetable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    pub fn add_entry(&mut self, entry: TimetableEntry) {
        self.entries.push(entry);
    }

    /// Number of entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Entries taught by a teacher.
    pub fn entries_for_teacher(&self, teacher_id: &str) -> Vec<&TimetableEntry> {
        self.entries
            .iter()
            .filter(|e| e.teacher_id == teacher_id)
            .collect()
    }

    /// Entries held in a room.
    pub fn entries_for_room(&self, room_id: &str) -> Vec<&TimetableEntry> {
        self.entries.iter().filter(|e| e.room_id == room_id).collect()
    }

    /// Entries belonging to a subject.
    pub fn entries_for_subject(&self, subject_id: &str) -> Vec<&TimetableEntry> {
        self.entries
            .iter()
            .filter(|e| e.subject_id == subject_id)
            .collect()
    }

    /// Entries grouped by their slot key, ordered by day then start.
    pub fn by_slot(&self) -> BTreeMap<(Day, u32, u32), Vec<&TimetableEntry>> {
        let mut grouped: BTreeMap<(Day, u32, u32), Vec<&TimetableEntry>> = BTreeMap::new();
        for e in &self.entries {
            grouped
                .entry((e.day, e.start_hour, e.end_hour))
                .or_default()
                .push(e);
        }
        grouped
    }

    /// Weekly hours per teacher id.
    pub fn teacher_hours(&self) -> HashMap<String, u32> {
        let mut hours: HashMap<String, u32> = HashMap::new();
        for e in &self.entries {
            *hours.entry(e.teacher_id.clone()).or_insert(0) += e.hours();
        }
        hours
    }
}
