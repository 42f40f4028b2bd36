//! Problem-level configuration.
//!
//! Supplied by the normalization layer alongside the input records.
//! Search parameters live in [`GaConfig`](crate::ga::GaConfig).

use serde::{Deserialize, Serialize};

use crate::error::TimetableError;
use crate::models::TeacherCategory;

/// Configuration shared by the decomposer, the heuristics and the evaluator.
///
/// # Examples
///
/// ```
/// use u_timetable::SchedulerConfig;
///
/// let config = SchedulerConfig::default()
///     .with_max_group_size(30)
///     .with_hard_limit_factor(1.1);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Largest group a subject's enrollment is split into.
    pub max_group_size: u32,
    /// Multiplier on a teacher's ceiling giving the feasibility threshold
    /// used by the heuristics (1.0 = never exceed the ceiling).
    pub hard_limit_factor: f64,
    /// Minimum weekly hours a top-category teacher should carry.
    pub top_target_hours: u32,
    /// Minimum weekly hours a second-category teacher should carry.
    pub second_target_hours: u32,
    /// Ceiling used for teachers that declare none.
    pub default_max_hours: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_group_size: 28,
            hard_limit_factor: 1.0,
            top_target_hours: 15,
            second_target_hours: 23,
            default_max_hours: 16,
        }
    }
}

impl SchedulerConfig {
    pub fn with_max_group_size(mut self, size: u32) -> Self {
        self.max_group_size = size;
        self
    }

    pub fn with_hard_limit_factor(mut self, factor: f64) -> Self {
        self.hard_limit_factor = factor;
        self
    }

    pub fn with_top_target_hours(mut self, hours: u32) -> Self {
        self.top_target_hours = hours;
        self
    }

    pub fn with_second_target_hours(mut self, hours: u32) -> Self {
        self.second_target_hours = hours;
        self
    }

    pub fn with_default_max_hours(mut self, hours: u32) -> Self {
        self.default_max_hours = hours;
        self
    }

    /// Hour target for a category (`None` for hourly staff).
    #[inline]
    pub fn target_hours(&self, category: TeacherCategory) -> Option<u32> {
        match category {
            TeacherCategory::Top => Some(self.top_target_hours),
            TeacherCategory::Second => Some(self.second_target_hours),
            TeacherCategory::Hourly => None,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), TimetableError> {
        if self.max_group_size == 0 {
            return Err(TimetableError::InvalidConfig(
                "max_group_size must be at least 1".into(),
            ));
        }
        if !self.hard_limit_factor.is_finite() || self.hard_limit_factor <= 0.0 {
            return Err(TimetableError::InvalidConfig(format!(
                "hard_limit_factor must be positive, got {}",
                self.hard_limit_factor
            )));
        }
        if self.default_max_hours == 0 {
            return Err(TimetableError::InvalidConfig(
                "default_max_hours must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.max_group_size, 28);
        assert!((config.hard_limit_factor - 1.0).abs() < 1e-10);
        assert_eq!(config.target_hours(TeacherCategory::Top), Some(15));
        assert_eq!(config.target_hours(TeacherCategory::Second), Some(23));
        assert_eq!(config.target_hours(TeacherCategory::Hourly), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_group() {
        let config = SchedulerConfig::default().with_max_group_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_factor() {
        assert!(SchedulerConfig::default()
            .with_hard_limit_factor(0.0)
            .validate()
            .is_err());
        assert!(SchedulerConfig::default()
            .with_hard_limit_factor(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SchedulerConfig =
            serde_json::from_str(r#"{ "hard_limit_factor": 1.2, "top_target_hours": 12 }"#)
                .unwrap();
        assert_eq!(config.top_target_hours, 12);
        assert_eq!(config.max_group_size, 28);
        assert!((config.hard_limit_factor - 1.2).abs() < 1e-10);
    }
}
