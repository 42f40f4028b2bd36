//! Input validation for timetabling problems.
//!
//! Checks structural integrity of teachers, rooms and subjects before
//! the search starts. Detects:
//! - Duplicate IDs
//! - Empty teacher or room catalogs
//! - Malformed availability windows
//! - Subjects with no weekly hours
//! - Rooms with no seats
//!
//! Unknown ids in a subject's eligible-teacher list are *not* errors: the
//! core drops them and falls back to the full teacher pool.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use thiserror::Error;

use crate::models::{Room, Subject, Teacher};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// No teachers or no rooms were supplied.
    EmptyCatalog,
    /// An availability window is empty, inverted or spills past midnight.
    InvalidAvailability,
    /// A subject declares zero weekly hours.
    InvalidHours,
    /// A room has zero capacity.
    InvalidCapacity,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input records for a timetabling problem.
///
/// Checks:
/// 1. At least one teacher and one room
/// 2. No duplicate teacher, room or subject IDs
/// 3. Every availability window is well formed
/// 4. Every subject has weekly hours
/// 5. Every room has seats
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(teachers: &[Teacher], rooms: &[Room], subjects: &[Subject]) -> ValidationResult {
    let mut errors = Vec::new();

    if teachers.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyCatalog,
            "No teachers supplied",
        ));
    }
    if rooms.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyCatalog,
            "No rooms supplied",
        ));
    }

    let mut teacher_ids = HashSet::new();
    for t in teachers {
        if !teacher_ids.insert(t.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate teacher ID: {}", t.id),
            ));
        }
        for (day, windows) in &t.availability {
            for w in windows {
                if !w.is_well_formed() {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidAvailability,
                        format!(
                            "Teacher '{}' has malformed window on {day}: {}-{} min",
                            t.id, w.start_min, w.end_min
                        ),
                    ));
                }
            }
        }
    }

    let mut room_ids = HashSet::new();
    for r in rooms {
        if !room_ids.insert(r.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room ID: {}", r.id),
            ));
        }
        if r.capacity == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCapacity,
                format!("Room '{}' has zero capacity", r.id),
            ));
        }
    }

    let mut subject_ids = HashSet::new();
    for s in subjects {
        if !subject_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate subject ID: {}", s.id),
            ));
        }
        if s.weekly_hours == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidHours,
                format!("Subject '{}' has no weekly hours", s.id),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
