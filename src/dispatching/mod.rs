//! Compatibility matchers and selection heuristics.
//!
//! - [`matchers`]: pure room-kind and teacher-availability predicates.
//! - [`WorkloadContext`]: running hours per teacher, owned by one stage.
//! - [`rules`]: room choice and the teacher ranking shared by the
//!   generator, mutation and repair.
//!
//! # Usage
//!
//! ```
//! use u_timetable::dispatching::{TeacherRoster, WorkloadContext};
//! use u_timetable::models::{Teacher, TeacherCategory};
//! use u_timetable::SchedulerConfig;
//!
//! let roster = TeacherRoster::new(
//!     vec![
//!         Teacher::new("D1", TeacherCategory::Hourly),
//!         Teacher::new("D2", TeacherCategory::Top),
//!     ],
//!     &SchedulerConfig::default(),
//! );
//! let load = WorkloadContext::new(roster.len());
//! assert_eq!(roster.choose(&[0, 1], &load, 2, true), Some(1));
//! ```

mod context;
pub mod matchers;
pub mod rules;

pub use context::WorkloadContext;
pub use matchers::{room_fits, room_kind_matches, teacher_available};
pub use rules::{choose_room, TeacherRoster};
