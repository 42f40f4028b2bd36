//! Teaching blocks and the subject decomposer.
//!
//! A block is the smallest schedulable unit: one session of one group of
//! one subject. The ordered block list is fixed for a run and indexes every
//! candidate schedule.
//!
//! # Decomposition
//!
//! - Weekly hours become a duration pattern: 2→[2], 4→[2,2], 5→[2,3],
//!   6→[3,3], otherwise threes first, switching to twos when a three would
//!   leave a remainder of one (7→[3,2,2], 11→[3,3,3,2]).
//! - Enrollment is split into `ceil(enrollment / max_group_size)` groups,
//!   remainder students going to the first groups.
//! - Mixed subjects alternate lecture/lab across the pattern.

use serde::{Deserialize, Serialize};

use super::{RoomKind, SlotDuration, Subject};

/// An atomic schedulable session derived from a subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Parent subject ID.
    pub subject_id: String,
    /// Parent subject name.
    pub subject_name: String,
    /// Group number within the subject (1-based).
    pub group: u32,
    /// Number of groups the subject was split into.
    pub group_count: u32,
    /// Session length.
    pub duration: SlotDuration,
    /// Room kind this block requires (never `Mixed` for mixed subjects).
    pub kind: RoomKind,
    /// Room kind declared on the subject.
    pub subject_kind: RoomKind,
    /// Students attending.
    pub students: u32,
    /// Specialty tags inherited from the subject.
    pub specialties: Vec<String>,
    /// Eligible teacher ids inherited from the subject.
    pub eligible_teachers: Vec<String>,
}

impl Block {
    /// Session length in hours.
    #[inline]
    pub fn hours(&self) -> u32 {
        self.duration.hours()
    }

    /// Group label, e.g. `"2/3"`.
    pub fn group_label(&self) -> String {
        format!("{}/{}", self.group, self.group_count)
    }
}

/// Splits weekly hours into session durations.
///
/// A single weekly hour cannot be expressed with 2h/3h sessions and is
/// rounded up to one two-hour session. Zero hours yields no sessions.
pub fn duration_pattern(weekly_hours: u32) -> Vec<SlotDuration> {
    use SlotDuration::{Three, Two};

    match weekly_hours {
        0 => Vec::new(),
        2 => vec![Two],
        4 => vec![Two, Two],
        5 => vec![Two, Three],
        6 => vec![Three, Three],
        _ => {
            let mut pattern = Vec::new();
            let mut remaining = weekly_hours;
            while remaining > 0 {
                if remaining == 3 || remaining >= 5 {
                    pattern.push(Three);
                    remaining -= 3;
                } else {
                    pattern.push(Two);
                    remaining = remaining.saturating_sub(2);
                }
            }
            pattern
        }
    }
}

/// Splits enrollment into group sizes of at most `max_group_size`.
///
/// Always returns at least one group.
pub fn group_sizes(enrollment: u32, max_group_size: u32) -> Vec<u32> {
    let cap = max_group_size.max(1);
    let groups = enrollment.div_ceil(cap).max(1);
    let base = enrollment / groups;
    let remainder = enrollment % groups;
    (0..groups)
        .map(|g| base + u32::from(g < remainder))
        .collect()
}

/// Expands subjects into the ordered block sequence.
///
/// Order: subject, then group, then pattern position. Deterministic.
pub fn decompose(subjects: &[Subject], max_group_size: u32) -> Vec<Block> {
    let mut blocks = Vec::new();

    for subject in subjects {
        let pattern = duration_pattern(subject.weekly_hours);
        let sizes = group_sizes(subject.enrollment, max_group_size);
        let specialties = subject.effective_specialties();
        let group_count = sizes.len() as u32;

        for (g, &students) in sizes.iter().enumerate() {
            for (pos, &duration) in pattern.iter().enumerate() {
                let kind = match subject.kind {
                    RoomKind::Mixed if pos % 2 == 0 => RoomKind::Lecture,
                    RoomKind::Mixed => RoomKind::Lab,
                    other => other,
                };
                blocks.push(Block {
                    subject_id: subject.id.clone(),
                    subject_name: subject.name.clone(),
                    group: g as u32 + 1,
                    group_count,
                    duration,
                    kind,
                    subject_kind: subject.kind,
                    students,
                    specialties: specialties.clone(),
                    eligible_teachers: subject.eligible_teachers.clone(),
                });
            }
        }
    }

    blocks
}
