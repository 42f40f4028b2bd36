//! Weekly academic timetabling for the U-Engine ecosystem.
//!
//! Assigns teaching sessions to time slots, rooms and teachers under hard
//! constraints (availability, capacity, room kind, no double-booking) and
//! soft preferences (teacher continuity, specialty match, workload
//! targets, few idle gaps). The search is a generational genetic algorithm
//! with purpose-built repair heuristics; it is heuristic, not exact, and
//! always returns a timetable, degrading the score under infeasible input.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Teacher`, `Room`, `Subject`, the slot
//!   catalog, `Block` decomposition and the decoded `Timetable`
//! - **`dispatching`**: Compatibility predicates and the room / teacher
//!   selection heuristics
//! - **`ga`**: Candidate encoding, operators, fitness, repair and the GA loop
//! - **`scheduler`**: End-to-end `TimetableScheduler` and timetable KPIs
//! - **`validation`**: Input integrity checks (duplicate IDs, malformed
//!   windows, zero hours or seats)
//!
//! # Architecture
//!
//! Loading and normalizing raw records, writing result files and charts
//! belong to the caller. The crate only sees canonical records and returns
//! in-memory results.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

pub mod config;
pub mod dispatching;
pub mod error;
pub mod ga;
pub mod models;
pub mod scheduler;
pub mod validation;

#[cfg(test)]
mod testing;

pub use config::SchedulerConfig;
pub use error::TimetableError;
