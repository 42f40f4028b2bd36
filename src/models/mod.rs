//! Timetabling domain models.
//!
//! Provides the immutable input records (teachers, rooms, subjects),
//! the fixed slot catalog, the block decomposition derived from subjects,
//! and the decoded timetable view of a solution.
//!
//! # Domain Mappings
//!
//! | u-timetable | Job-shop analogue |
//! |-------------|-------------------|
//! | Subject | Task |
//! | Block | Activity |
//! | Teacher / Room | Resource |
//! | Slot | Time window |
//! | Timetable | Schedule |

mod block;
mod calendar;
mod resource;
mod schedule;
mod subject;

pub use block::{decompose, duration_pattern, group_sizes, Block};
pub use calendar::{Day, Slot, SlotCatalog, SlotDuration, TimeWindow};
pub use resource::{Room, RoomKind, Teacher, TeacherCategory};
pub use schedule::{Timetable, TimetableEntry};
pub use subject::Subject;
