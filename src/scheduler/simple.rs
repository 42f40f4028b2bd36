//! End-to-end timetable solver.
//!
//! # Pipeline
//!
//! 1. Validate input records (all issues reported at once).
//! 2. Build the [`TimetableProblem`] (slot catalog, blocks, indices).
//! 3. Run the GA.
//! 4. Decode the winning candidate and compute KPIs.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::kpi::TimetableKpi;
use crate::config::SchedulerConfig;
use crate::error::TimetableError;
use crate::ga::{FitnessReport, FitnessWeights, GaConfig, GaResult, GaRunner, TimetableProblem};
use crate::models::{Room, Subject, Teacher, Timetable};
use crate::validation::validate_input;

/// Input container for one timetabling run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleRequest {
    pub teachers: Vec<Teacher>,
    pub rooms: Vec<Room>,
    pub subjects: Vec<Subject>,
    pub config: SchedulerConfig,
    pub ga: GaConfig,
    pub weights: FitnessWeights,
}

impl ScheduleRequest {
    /// Creates a request with default configuration.
    pub fn new(teachers: Vec<Teacher>, rooms: Vec<Room>, subjects: Vec<Subject>) -> Self {
        Self {
            teachers,
            rooms,
            subjects,
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_ga(mut self, ga: GaConfig) -> Self {
        self.ga = ga;
        self
    }

    pub fn with_weights(mut self, weights: FitnessWeights) -> Self {
        self.weights = weights;
        self
    }
}

/// Result of [`TimetableScheduler::solve`].
#[derive(Debug, Clone)]
pub struct ScheduleOutcome {
    /// Decoded winning candidate.
    pub timetable: Timetable,
    /// Score breakdown of the winner.
    pub report: FitnessReport,
    pub kpi: TimetableKpi,
    /// Raw GA output: winner genes, archive, statistics.
    pub ga: GaResult,
}

/// Validates, searches and decodes in one call.
///
/// # Example
///
/// ```
/// use u_timetable::ga::GaConfig;
/// use u_timetable::models::{Day, Room, Subject, Teacher, TeacherCategory, TimeWindow};
/// use u_timetable::scheduler::{ScheduleRequest, TimetableScheduler};
///
/// let request = ScheduleRequest::new(
///     vec![Teacher::new("D1", TeacherCategory::Top)
///         .with_max_hours(16)
///         .with_window_on(&Day::WEEK[..5], TimeWindow::hours(7, 22))],
///     vec![Room::lecture("A1", 30)],
///     vec![Subject::new("S1", 6, 20)],
/// )
/// .with_ga(GaConfig::default().with_population_size(10).with_max_generations(3).with_seed(7));
///
/// let outcome = TimetableScheduler::solve(&request).unwrap();
/// assert_eq!(outcome.timetable.entry_count(), 2);
/// ```
pub struct TimetableScheduler;

impl TimetableScheduler {
    pub fn solve(request: &ScheduleRequest) -> Result<ScheduleOutcome, TimetableError> {
        validate_input(&request.teachers, &request.rooms, &request.subjects)
            .map_err(TimetableError::InvalidInput)?;

        let problem = TimetableProblem::new(
            request.teachers.clone(),
            request.rooms.clone(),
            &request.subjects,
            request.config.clone(),
        )?
        .with_weights(request.weights.clone());

        let ga = GaRunner::run(&problem, &request.ga)?;
        let timetable = problem.decode(&ga.best);
        let report = problem.evaluate_detailed(&ga.best);
        let kpi = TimetableKpi::calculate(&timetable);

        info!(
            sessions = kpi.sessions,
            score = report.score,
            hard_violations = report.hard_violations(),
            "timetable solved"
        );

        Ok(ScheduleOutcome {
            timetable,
            report,
            kpi,
            ga,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RoomKind, TeacherCategory};
    use crate::testing::weekday_teacher;

    fn quick_ga() -> GaConfig {
        GaConfig::default()
            .with_population_size(12)
            .with_max_generations(5)
            .with_seed(42)
    }

    #[test]
    fn test_solve_single_teacher() {
        let request = ScheduleRequest::new(
            vec![weekday_teacher("D1", TeacherCategory::Top, 16)],
            vec![Room::lecture("A1", 30)],
            vec![Subject::new("S1", 6, 20)],
        )
        .with_ga(quick_ga());

        let outcome = TimetableScheduler::solve(&request).unwrap();
        assert_eq!(outcome.timetable.entry_count(), 2);
        assert_eq!(outcome.kpi.sessions, 2);
        assert_eq!(outcome.kpi.distinct_days, 2);
        assert_eq!(outcome.kpi.teacher_load("D1").unwrap().hours, 6);
        assert!(outcome.report.is_hard_feasible());
        assert_eq!(outcome.report.score, outcome.ga.best_fitness);
    }

    #[test]
    fn test_solve_mixed_subject() {
        let request = ScheduleRequest::new(
            vec![
                weekday_teacher("D1", TeacherCategory::Top, 16),
                weekday_teacher("D2", TeacherCategory::Hourly, 10),
            ],
            vec![Room::lecture("A1", 30), Room::lab("L1", 30)],
            vec![Subject::new("S1", 6, 40).with_kind(RoomKind::Mixed)],
        )
        .with_ga(quick_ga());

        let outcome = TimetableScheduler::solve(&request).unwrap();
        // 40 students → two groups of 20, each 3h + 3h.
        assert_eq!(outcome.timetable.entry_count(), 4);
        let kinds: Vec<RoomKind> = outcome
            .timetable
            .entries_for_subject("S1")
            .iter()
            .map(|e| e.required_kind)
            .collect();
        assert_eq!(
            kinds,
            vec![RoomKind::Lecture, RoomKind::Lab, RoomKind::Lecture, RoomKind::Lab]
        );
    }

    #[test]
    fn test_solve_rejects_duplicates() {
        let request = ScheduleRequest::new(
            vec![
                weekday_teacher("D1", TeacherCategory::Top, 16),
                weekday_teacher("D1", TeacherCategory::Top, 16),
            ],
            vec![Room::lecture("A1", 30)],
            vec![Subject::new("S1", 6, 20)],
        );
        let err = TimetableScheduler::solve(&request).unwrap_err();
        assert!(matches!(err, TimetableError::InvalidInput(ref errs) if errs.len() == 1));
    }

    #[test]
    fn test_solve_rejects_empty_rooms() {
        let request = ScheduleRequest::new(
            vec![weekday_teacher("D1", TeacherCategory::Top, 16)],
            vec![],
            vec![Subject::new("S1", 6, 20)],
        );
        assert!(TimetableScheduler::solve(&request).is_err());
    }

    #[test]
    fn test_request_from_json() {
        let json = r#"{
            "teachers": [{
                "id": "D1",
                "category": "top",
                "max_weekly_hours": 16,
                "availability": { "Monday": [{ "start_min": 420, "end_min": 1320 }] }
            }],
            "rooms": [{ "id": "A1", "capacity": 30, "kind": "lecture" }],
            "subjects": [{ "id": "S1", "weekly_hours": 4, "enrollment": 20 }],
            "ga": { "population_size": 10, "max_generations": 2, "seed": 1 }
        }"#;
        let request: ScheduleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.ga.population_size, 10);
        assert_eq!(request.config.max_group_size, 28);

        let outcome = TimetableScheduler::solve(&request).unwrap();
        assert_eq!(outcome.timetable.entry_count(), 2);
    }
}
