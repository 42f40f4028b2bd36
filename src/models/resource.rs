//! Teaching resources: teachers and rooms.
//!
//! Both are immutable input records produced by the normalization layer.
//! All spelling and locale cleanup happens before these types are built;
//! the core only sees canonical values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Day, TimeWindow};

/// Contract tier of a teacher.
///
/// Drives hour targets and priority in the workload heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeacherCategory {
    /// Tenured staff: highest priority, has a minimum-hour target.
    Top,
    /// Fixed-term salaried staff: has its own minimum-hour target.
    Second,
    /// Paid per hour: no target, no balancing.
    Hourly,
}

impl TeacherCategory {
    /// Whether the category carries a salaried hour target.
    #[inline]
    pub fn is_salaried(self) -> bool {
        matches!(self, TeacherCategory::Top | TeacherCategory::Second)
    }
}

/// A teacher who can be assigned to blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Contract tier.
    pub category: TeacherCategory,
    /// Weekly-hour ceiling. `None` = use the configured default.
    pub max_weekly_hours: Option<u32>,
    /// Specialty tags.
    #[serde(default)]
    pub specialties: Vec<String>,
    /// Permitted clock-time intervals per day. A day with no entry means
    /// the teacher is not available at all that day.
    #[serde(default)]
    pub availability: BTreeMap<Day, Vec<TimeWindow>>,
}

impl Teacher {
    /// Creates a teacher with no availability declared.
    pub fn new(id: impl Into<String>, category: TeacherCategory) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            category,
            max_weekly_hours: None,
            specialties: Vec::new(),
            availability: BTreeMap::new(),
        }
    }

    /// Sets the teacher name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the weekly-hour ceiling.
    pub fn with_max_hours(mut self, hours: u32) -> Self {
        self.max_weekly_hours = Some(hours);
        self
    }

    /// Adds a specialty tag.
    pub fn with_specialty(mut self, tag: impl Into<String>) -> Self {
        self.specialties.push(tag.into());
        self
    }

    /// Adds an availability window on `day`.
    pub fn with_window(mut self, day: Day, window: TimeWindow) -> Self {
        self.availability.entry(day).or_default().push(window);
        self
    }

    /// Adds the same availability window on every day in `days`.
    pub fn with_window_on(mut self, days: &[Day], window: TimeWindow) -> Self {
        for &day in days {
            self.availability.entry(day).or_default().push(window);
        }
        self
    }

    /// Declared windows for `day` (empty if none).
    #[inline]
    pub fn windows_on(&self, day: Day) -> &[TimeWindow] {
        self.availability
            .get(&day)
            .map(|w| w.as_slice())
            .unwrap_or(&[])
    }

    /// Number of specialty tags shared with `tags`.
    pub fn specialty_overlap(&self, tags: &[String]) -> usize {
        let mut shared: Vec<&String> = tags
            .iter()
            .filter(|t| self.specialties.contains(t))
            .collect();
        shared.sort();
        shared.dedup();
        shared.len()
    }
}

/// Kind of teaching space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    /// Theory classroom.
    #[default]
    Lecture,
    /// Practical room / laboratory.
    Lab,
    /// Usable for both.
    Mixed,
}

/// A room that can host blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Seats.
    pub capacity: u32,
    /// Kind of space.
    pub kind: RoomKind,
}

impl Room {
    /// Creates a new room.
    pub fn new(id: impl Into<String>, capacity: u32, kind: RoomKind) -> Self {
        Self {
            id: id.into(),
            capacity,
            kind,
        }
    }

    /// Creates a lecture room.
    pub fn lecture(id: impl Into<String>, capacity: u32) -> Self {
        Self::new(id, capacity, RoomKind::Lecture)
    }

    /// Creates a lab.
    pub fn lab(id: impl Into<String>, capacity: u32) -> Self {
        Self::new(id, capacity, RoomKind::Lab)
    }
}
