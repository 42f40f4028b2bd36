//! Timetable quality metrics (KPIs).
//!
//! Computes summary indicators from a decoded timetable.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Sessions | Scheduled blocks |
//! | Distinct teachers / rooms / days | Resources actually used |
//! | Teacher load | Hours and sessions per teacher |
//! | Avg gap | Mean idle hours between same-day sessions |
//!
//! The mean gap is averaged over teachers, counting a teacher with no
//! same-day pair as zero.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{Day, Timetable};

/// Load carried by one teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherLoad {
    pub teacher_id: String,
    pub teacher_name: String,
    pub hours: u32,
    pub sessions: usize,
    /// Mean idle hours between consecutive same-day sessions.
    pub avg_gap_hours: f64,
}

/// Timetable indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableKpi {
    pub sessions: usize,
    pub total_hours: u32,
    pub distinct_teachers: usize,
    pub distinct_rooms: usize,
    pub distinct_days: usize,
    /// Per-teacher load, by teacher id.
    pub teacher_loads: Vec<TeacherLoad>,
    pub avg_gap_hours: f64,
}

impl TimetableKpi {
    /// Computes KPIs from a decoded timetable.
    pub fn calculate(timetable: &Timetable) -> Self {
        let rooms: HashSet<&str> = timetable.entries.iter().map(|e| e.room_id.as_str()).collect();
        let days: HashSet<Day> = timetable.entries.iter().map(|e| e.day).collect();

        // teacher → (name, day → intervals)
        let mut by_teacher: BTreeMap<&str, (&str, BTreeMap<Day, Vec<(u32, u32)>>)> =
            BTreeMap::new();
        for e in &timetable.entries {
            by_teacher
                .entry(e.teacher_id.as_str())
                .or_insert_with(|| (e.teacher_name.as_str(), BTreeMap::new()))
                .1
                .entry(e.day)
                .or_default()
                .push((e.start_hour, e.end_hour));
        }

        let teacher_loads: Vec<TeacherLoad> = by_teacher
            .into_iter()
            .map(|(id, (name, mut per_day))| {
                let mut hours = 0;
                let mut sessions = 0;
                let mut gap_total = 0u32;
                let mut pairs = 0u32;
                for intervals in per_day.values_mut() {
                    intervals.sort_unstable();
                    sessions += intervals.len();
                    hours += intervals.iter().map(|(s, e)| e - s).sum::<u32>();
                    for pair in intervals.windows(2) {
                        gap_total += pair[1].0.saturating_sub(pair[0].1);
                        pairs += 1;
                    }
                }
                TeacherLoad {
                    teacher_id: id.to_string(),
                    teacher_name: name.to_string(),
                    hours,
                    sessions,
                    avg_gap_hours: if pairs == 0 {
                        0.0
                    } else {
                        f64::from(gap_total) / f64::from(pairs)
                    },
                }
            })
            .collect();

        let avg_gap_hours = if teacher_loads.is_empty() {
            0.0
        } else {
            teacher_loads.iter().map(|l| l.avg_gap_hours).sum::<f64>() / teacher_loads.len() as f64
        };

        Self {
            sessions: timetable.entry_count(),
            total_hours: timetable.entries.iter().map(|e| e.hours()).sum(),
            distinct_teachers: teacher_loads.len(),
            distinct_rooms: rooms.len(),
            distinct_days: days.len(),
            teacher_loads,
            avg_gap_hours,
        }
    }

    /// Load of one teacher, if it teaches anything.
    pub fn teacher_load(&self, teacher_id: &str) -> Option<&TeacherLoad> {
        self.teacher_loads.iter().find(|l| l.teacher_id == teacher_id)
    }
}
