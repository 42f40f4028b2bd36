//! Crate error type.

use std::fmt;

use thiserror::Error;

use crate::validation::ValidationError;

/// Which fixed catalog was found empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Slots,
    Rooms,
    Teachers,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CatalogKind::Slots => "slot",
            CatalogKind::Rooms => "room",
            CatalogKind::Teachers => "teacher",
        })
    }
}

/// Errors raised before the search starts.
///
/// Once a [`TimetableProblem`](crate::ga::TimetableProblem) exists the engine
/// never fails: infeasibility degrades the score instead.
#[derive(Debug, Error)]
pub enum TimetableError {
    /// Every heuristic needs at least one slot, room and teacher.
    #[error("{0} catalog is empty")]
    EmptyCatalog(CatalogKind),

    /// Structural problems in the input records.
    #[error("invalid input: {} issue(s), first: {}", .0.len(), .0.first().map(|e| e.message.as_str()).unwrap_or(""))]
    InvalidInput(Vec<ValidationError>),

    /// Out-of-range configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_display() {
        assert_eq!(
            TimetableError::EmptyCatalog(CatalogKind::Rooms).to_string(),
            "room catalog is empty"
        );

        let err = TimetableError::InvalidInput(vec![ValidationError::new(
            ValidationErrorKind::DuplicateId,
            "Duplicate room ID: A1",
        )]);
        assert_eq!(
            err.to_string(),
            "invalid input: 1 issue(s), first: Duplicate room ID: A1"
        );
    }
}
