//! Weekly calendar: days, availability windows and the slot catalog.
//!
//! # Time Model
//! Availability windows are expressed in minutes since midnight so that
//! declared ranges like `07:30-12:00` survive normalization. Catalog slots
//! always start and end on the hour.
//!
//! # Overlap
//! Slots of different duration classes on the same day routinely overlap
//! (e.g. Mon 07-09 and Mon 08-11). The catalog does not exclude this; use
//! [`SlotCatalog::overlaps`] at run time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A teaching day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    /// Monday through Saturday, in week order.
    pub const WEEK: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    /// Position within the week (Monday = 0).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
        };
        f.write_str(name)
    }
}

/// A clock-time interval [start, end) within one day, in minutes.
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    /// Interval start (minutes since midnight, inclusive).
    pub start_min: u32,
    /// Interval end (minutes since midnight, exclusive).
    pub end_min: u32,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start_min: u32, end_min: u32) -> Self {
        Self { start_min, end_min }
    }

    /// Creates a window from whole hours, e.g. `hours(7, 22)` = 07:00-22:00.
    pub fn hours(start_hour: u32, end_hour: u32) -> Self {
        Self::new(start_hour * 60, end_hour * 60)
    }

    /// Duration of this window (minutes).
    #[inline]
    pub fn duration_min(&self) -> u32 {
        self.end_min.saturating_sub(self.start_min)
    }

    /// Whether `other` lies entirely inside this window.
    #[inline]
    pub fn covers(&self, other: &Self) -> bool {
        self.start_min <= other.start_min && other.end_min <= self.end_min
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_min < other.end_min && other.start_min < self.end_min
    }

    /// Whether the window is well formed (non-empty, within one day).
    pub fn is_well_formed(&self) -> bool {
        self.start_min < self.end_min && self.end_min <= 24 * 60
    }
}

/// Duration class of a slot (and of the block it can host).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotDuration {
    /// Two-hour session.
    Two,
    /// Three-hour session.
    Three,
}

impl SlotDuration {
    /// Both duration classes, shortest first.
    pub const ALL: [SlotDuration; 2] = [SlotDuration::Two, SlotDuration::Three];

    /// Length in hours.
    #[inline]
    pub fn hours(self) -> u32 {
        match self {
            SlotDuration::Two => 2,
            SlotDuration::Three => 3,
        }
    }

    #[inline]
    fn class_index(self) -> usize {
        match self {
            SlotDuration::Two => 0,
            SlotDuration::Three => 1,
        }
    }
}

/// A fixed (day, start, end, duration) window from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub day: Day,
    /// Start hour (inclusive).
    pub start_hour: u32,
    /// End hour (exclusive).
    pub end_hour: u32,
    pub duration: SlotDuration,
}

impl Slot {
    /// Same-day half-open hour intersection.
    #[inline]
    pub fn overlaps(&self, other: &Slot) -> bool {
        self.day == other.day
            && self.start_hour < other.end_hour
            && other.start_hour < self.end_hour
    }

    /// The slot as a clock-time window.
    #[inline]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::hours(self.start_hour, self.end_hour)
    }

    /// Display label, e.g. `"07:00-09:00"`.
    pub fn label(&self) -> String {
        format!("{:02}:00-{:02}:00", self.start_hour, self.end_hour)
    }
}

/// Precomputed catalog of addressable slots.
///
/// Every hour start in `[first_hour, last_hour)` that fits before
/// `last_hour` is generated for each day and duration class. Slot indices
/// are stable for the lifetime of the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotCatalog {
    slots: Vec<Slot>,
    by_duration: [Vec<usize>; 2],
}

impl SlotCatalog {
    /// Default daily window start.
    pub const FIRST_HOUR: u32 = 7;
    /// Default daily window end.
    pub const LAST_HOUR: u32 = 22;

    /// Builds the catalog for the given days and daily hour bounds.
    ///
    /// Per day, two-hour slots are emitted before three-hour slots.
    pub fn build(days: &[Day], first_hour: u32, last_hour: u32) -> Self {
        let mut slots = Vec::new();
        for &day in days {
            for duration in SlotDuration::ALL {
                let len = duration.hours();
                let mut start = first_hour;
                while start + len <= last_hour {
                    slots.push(Slot {
                        day,
                        start_hour: start,
                        end_hour: start + len,
                        duration,
                    });
                    start += 1;
                }
            }
        }

        let mut by_duration: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
        for (idx, slot) in slots.iter().enumerate() {
            by_duration[slot.duration.class_index()].push(idx);
        }

        Self { slots, by_duration }
    }

    /// Monday–Saturday, 07:00–22:00.
    pub fn standard() -> Self {
        Self::build(&Day::WEEK, Self::FIRST_HOUR, Self::LAST_HOUR)
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the catalog has no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range; gene indices are always produced
    /// from this catalog.
    #[inline]
    pub fn slot(&self, index: usize) -> &Slot {
        &self.slots[index]
    }

    /// All slots in index order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Indices of slots of the given duration class, in catalog order.
    #[inline]
    pub fn indices_for(&self, duration: SlotDuration) -> &[usize] {
        &self.by_duration[duration.class_index()]
    }

    /// Whether two catalog slots overlap in wall-clock time.
    #[inline]
    pub fn overlaps(&self, a: usize, b: usize) -> bool {
        self.slots[a].overlaps(&self.slots[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_window() {
        let w = TimeWindow::hours(7, 22);
        assert_eq!(w.duration_min(), 15 * 60);
        assert!(w.covers(&TimeWindow::hours(7, 9)));
        assert!(w.covers(&TimeWindow::hours(19, 22)));
        assert!(!w.covers(&TimeWindow::hours(20, 23)));
        assert!(!w.covers(&TimeWindow::hours(6, 8)));
    }

    #[test]
    fn test_time_window_overlap() {
        let a = TimeWindow::new(0, 100);
        let b = TimeWindow::new(50, 150);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));

        let c = TimeWindow::new(100, 200); // touching but not overlapping
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_malformed_window() {
        assert!(TimeWindow::hours(8, 12).is_well_formed());
        assert!(!TimeWindow::hours(12, 8).is_well_formed());
        assert!(!TimeWindow::hours(20, 25).is_well_formed());
    }

    #[test]
    fn test_standard_catalog_size() {
        let catalog = SlotCatalog::standard();
        // 14 two-hour starts (07..=20) + 13 three-hour starts (07..=19) per day.
        assert_eq!(catalog.len(), 6 * (14 + 13));
        assert_eq!(catalog.indices_for(SlotDuration::Two).len(), 6 * 14);
        assert_eq!(catalog.indices_for(SlotDuration::Three).len(), 6 * 13);
    }

    #[test]
    fn test_duration_index_is_consistent() {
        let catalog = SlotCatalog::standard();
        for duration in SlotDuration::ALL {
            for &idx in catalog.indices_for(duration) {
                let slot = catalog.slot(idx);
                assert_eq!(slot.duration, duration);
                assert_eq!(slot.end_hour - slot.start_hour, duration.hours());
                assert!(slot.start_hour >= 7 && slot.end_hour <= 22);
            }
        }
    }

    #[test]
    fn test_slot_overlap() {
        let a = Slot {
            day: Day::Monday,
            start_hour: 7,
            end_hour: 9,
            duration: SlotDuration::Two,
        };
        let b = Slot {
            day: Day::Monday,
            start_hour: 8,
            end_hour: 11,
            duration: SlotDuration::Three,
        };
        let c = Slot {
            day: Day::Monday,
            start_hour: 9,
            end_hour: 11,
            duration: SlotDuration::Two,
        };
        let d = Slot { day: Day::Tuesday, ..a };

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c)); // touching
        assert!(!a.overlaps(&d)); // different day
        assert_eq!(a.label(), "07:00-09:00");
    }

    #[test]
    fn test_custom_bounds() {
        let catalog = SlotCatalog::build(&[Day::Friday], 8, 12);
        // 2h: 8,9,10 ; 3h: 8,9
        assert_eq!(catalog.len(), 5);
        assert!(catalog.slots().iter().all(|s| s.day == Day::Friday));
    }
}
