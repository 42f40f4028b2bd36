//! End-to-end solving and timetable KPIs.
//!
//! # Pipeline
//!
//! `TimetableScheduler::solve` validates the request, builds the problem,
//! runs the GA and decodes the winner.
//!
//! # KPI
//!
//! `TimetableKpi` summarizes a decoded timetable: sessions, resources
//! used, per-teacher load and idle gaps.

mod kpi;
mod simple;

pub use kpi::{TeacherLoad, TimetableKpi};
pub use simple::{ScheduleOutcome, ScheduleRequest, TimetableScheduler};
