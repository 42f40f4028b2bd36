//! Timetable fitness evaluation.
//!
//! Starts from a positive baseline and applies every rule as a penalty
//! or a reward. Weights keep the ordering
//! hard clashes ≫ workload shaping ≫ soft preferences.
//!
//! # Rules
//!
//! | Group    | Rule                                                    |
//! |----------|---------------------------------------------------------|
//! | hard     | teacher unavailable, room too small, room kind mismatch |
//! | hard     | teacher / room double-booked on overlapping slots       |
//! | group    | repeated day, extra teachers (exponential), one teacher |
//! | workload | under target, target reached, over ceiling, overload    |
//! | workload | imbalance vs mean, too few salaried teachers loaded     |
//! | soft     | eligible list, specialty overlap, top category, gaps    |

use serde::{Deserialize, Serialize};

use super::chromosome::TimetableChromosome;
use super::problem::TimetableProblem;
use crate::dispatching::{room_kind_matches, WorkloadContext};
use crate::models::TeacherCategory;

/// Penalty and reward constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    /// Starting score.
    pub baseline: f64,
    /// Per pair of genes sharing a teacher on overlapping slots.
    pub teacher_clash: f64,
    /// Per pair of genes sharing a room on overlapping slots.
    pub room_clash: f64,
    /// Per gene whose teacher is unavailable at its slot.
    pub teacher_unavailable: f64,
    /// Per gene placed in a room smaller than its group.
    pub room_capacity: f64,
    /// Per gene placed in a room of the wrong kind.
    pub room_kind: f64,
    /// Per repeated day within a (subject, group).
    pub same_day: f64,
    /// Scaled by `extra × 2^extra` for `extra` additional teachers in a group.
    pub multi_teacher_group: f64,
    /// Per block of a group served by a single teacher.
    pub same_teacher_bonus: f64,
    /// Per hour over the personal ceiling (before category factor).
    pub over_ceiling: f64,
    pub top_over_ceiling_factor: f64,
    pub second_over_ceiling_factor: f64,
    /// Per hour over the hard limit, and again per hour over 2× ceiling.
    pub overload: f64,
    /// Per hour of deviation beyond half the mean load.
    pub imbalance: f64,
    /// Floor of the minimum number of loaded salaried teachers.
    pub min_core_teachers: usize,
    /// Per hour of salaried shortfall below target.
    pub under_target: f64,
    /// Top category: doubled when the target is reached.
    pub target_bonus: f64,
    /// Per gene taught by a top-category teacher.
    pub top_assignment_bonus: f64,
    /// Reward or penalty per gene depending on eligible-list membership.
    pub preferred_teacher: f64,
    /// Per overlapping specialty tag; also the penalty for zero overlap.
    pub specialty_match: f64,
    /// Per idle hour between two same-day sessions of a teacher.
    pub gap_per_hour: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            baseline: 500_000.0,
            teacher_clash: 50_000.0,
            room_clash: 50_000.0,
            teacher_unavailable: 50_000.0,
            room_capacity: 750.0,
            room_kind: 750.0,
            same_day: 750.0,
            multi_teacher_group: 50_000.0,
            same_teacher_bonus: 500.0,
            over_ceiling: 500.0,
            top_over_ceiling_factor: 2.0,
            second_over_ceiling_factor: 1.5,
            overload: 30_000.0,
            imbalance: 500.0,
            min_core_teachers: 3,
            under_target: 50_000.0,
            target_bonus: 20_000.0,
            top_assignment_bonus: 20_000.0,
            preferred_teacher: 300.0,
            specialty_match: 200.0,
            gap_per_hour: 50.0,
        }
    }
}

/// Per-rule breakdown of one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessReport {
    /// `baseline - penalties + reward`.
    pub score: f64,
    pub hard_penalty: f64,
    pub group_penalty: f64,
    pub workload_penalty: f64,
    pub soft_penalty: f64,
    pub reward: f64,
    /// Gene pairs double-booking a teacher.
    pub teacher_clashes: usize,
    /// Gene pairs double-booking a room.
    pub room_clashes: usize,
    pub unavailable: usize,
    pub capacity_violations: usize,
    pub kind_mismatches: usize,
    /// Teachers above `ceiling × hard_limit_factor`.
    pub overloaded_teachers: usize,
}

impl FitnessReport {
    /// Total count of hard-rule violations.
    pub fn hard_violations(&self) -> usize {
        self.teacher_clashes
            + self.room_clashes
            + self.unavailable
            + self.capacity_violations
            + self.kind_mismatches
    }

    pub fn is_hard_feasible(&self) -> bool {
        self.hard_violations() == 0
    }
}

/// Scores a candidate.
pub fn evaluate(problem: &TimetableProblem, chromosome: &TimetableChromosome) -> FitnessReport {
    let w = problem.weights();
    let mut report = FitnessReport::default();

    let teacher_count = problem.teacher_count();
    let mut teacher_slots: Vec<Vec<usize>> = vec![Vec::new(); teacher_count];
    let mut room_slots: Vec<Vec<usize>> = vec![Vec::new(); problem.rooms().len()];
    let mut load = WorkloadContext::new(teacher_count);

    for (i, gene) in chromosome.genes.iter().enumerate() {
        let block = problem.block(i);
        let room = problem.room(gene.room);
        let teacher = problem.teacher(gene.teacher);

        teacher_slots[gene.teacher].push(gene.slot);
        room_slots[gene.room].push(gene.slot);
        load.add(gene.teacher, block.hours());

        if !problem.is_available(gene.teacher, gene.slot) {
            report.hard_penalty += w.teacher_unavailable;
            report.unavailable += 1;
        }
        if room.capacity < block.students {
            report.hard_penalty += w.room_capacity;
            report.capacity_violations += 1;
        }
        if !room_kind_matches(room.kind, block.kind) {
            report.hard_penalty += w.room_kind;
            report.kind_mismatches += 1;
        }

        let eligible = problem.eligible(i);
        if !eligible.is_empty() {
            if eligible.contains(&gene.teacher) {
                report.reward += w.preferred_teacher;
            } else {
                report.soft_penalty += w.preferred_teacher;
            }
        }

        if teacher.category == TeacherCategory::Top {
            report.reward += w.top_assignment_bonus;
        }

        if !block.specialties.is_empty() {
            let overlap = teacher.specialty_overlap(&block.specialties);
            if overlap > 0 {
                report.reward += w.specialty_match * overlap as f64;
            } else {
                report.soft_penalty += w.specialty_match;
            }
        }
    }

    group_rules(problem, chromosome, &mut report);

    for slots in &teacher_slots {
        let clashes = count_overlaps(problem, slots);
        report.teacher_clashes += clashes;
        report.hard_penalty += clashes as f64 * w.teacher_clash;
    }
    for slots in &room_slots {
        let clashes = count_overlaps(problem, slots);
        report.room_clashes += clashes;
        report.hard_penalty += clashes as f64 * w.room_clash;
    }

    workload_rules(problem, &load, &mut report);

    for slots in &teacher_slots {
        report.soft_penalty += idle_gap_hours(problem, slots) as f64 * w.gap_per_hour;
    }

    report.score = w.baseline - report.hard_penalty - report.group_penalty
        - report.workload_penalty
        - report.soft_penalty
        + report.reward;
    report
}

fn group_rules(
    problem: &TimetableProblem,
    chromosome: &TimetableChromosome,
    report: &mut FitnessReport,
) {
    let w = problem.weights();
    for members in problem.groups() {
        let mut day_seen = 0u8;
        let mut repeats = 0usize;
        let mut teachers: Vec<usize> = Vec::with_capacity(members.len());
        for &b in members {
            let gene = &chromosome.genes[b];
            let bit = 1u8 << problem.slot(gene.slot).day.index();
            if day_seen & bit != 0 {
                repeats += 1;
            }
            day_seen |= bit;
            if !teachers.contains(&gene.teacher) {
                teachers.push(gene.teacher);
            }
        }

        report.group_penalty += repeats as f64 * w.same_day;
        if teachers.len() > 1 {
            let extra = teachers.len() - 1;
            report.group_penalty += extra as f64 * w.multi_teacher_group * 2f64.powi(extra as i32);
        } else {
            report.reward += members.len() as f64 * w.same_teacher_bonus;
        }
    }
}

fn workload_rules(problem: &TimetableProblem, load: &WorkloadContext, report: &mut FitnessReport) {
    let w = problem.weights();
    let roster = problem.roster();

    let active: Vec<(usize, u32)> = load.loaded().collect();
    if active.is_empty() {
        return;
    }
    let mean = f64::from(load.total_hours()) / active.len() as f64;

    let mut core_active = 0usize;
    for &(t, hours) in &active {
        let category = roster.category(t);
        let h = f64::from(hours);
        let ceiling = f64::from(roster.ceiling(t));

        match (category, roster.target(t)) {
            (TeacherCategory::Top, Some(target)) => {
                let target = f64::from(target).min(ceiling);
                if h < target {
                    report.workload_penalty += (target - h) * w.under_target;
                } else if h <= ceiling {
                    report.reward += w.target_bonus * 2.0;
                } else {
                    report.workload_penalty +=
                        (h - ceiling) * w.over_ceiling * w.top_over_ceiling_factor;
                }
            }
            (TeacherCategory::Second, Some(target)) => {
                let target = f64::from(target).min(ceiling);
                let upper = ceiling.min(target + 1.0);
                if h < target {
                    report.workload_penalty += (target - h) * w.under_target;
                } else if h <= upper {
                    report.reward += w.target_bonus;
                } else if h > ceiling {
                    report.workload_penalty +=
                        (h - ceiling) * w.over_ceiling * w.second_over_ceiling_factor;
                }
            }
            _ => {
                if h > ceiling {
                    report.workload_penalty += (h - ceiling) * w.over_ceiling;
                }
            }
        }

        let hard_limit = roster.hard_limit(t);
        if h > hard_limit {
            report.workload_penalty += (h - hard_limit) * w.overload;
            report.overloaded_teachers += 1;
        }
        if h > ceiling * 2.0 {
            report.workload_penalty += (h - ceiling * 2.0) * w.overload;
        }

        if category != TeacherCategory::Hourly {
            let deviation = (h - mean).abs();
            if mean > 0.0 && deviation > mean * 0.5 {
                report.workload_penalty += (deviation - mean * 0.5) * w.imbalance;
            }
        }

        if category.is_salaried() {
            core_active += 1;
        }
    }

    let min_core = w.min_core_teachers.max(problem.salaried_count() / 2);
    if core_active < min_core {
        report.workload_penalty += (min_core - core_active) as f64 * w.imbalance * 2.0;
    }
}

/// Pairs of slots in `slots` that overlap in wall-clock time.
fn count_overlaps(problem: &TimetableProblem, slots: &[usize]) -> usize {
    let catalog = problem.slots();
    let mut count = 0;
    for (a, &sa) in slots.iter().enumerate() {
        for &sb in &slots[a + 1..] {
            if catalog.overlaps(sa, sb) {
                count += 1;
            }
        }
    }
    count
}

/// Idle hours between consecutive same-day sessions.
fn idle_gap_hours(problem: &TimetableProblem, slots: &[usize]) -> u32 {
    if slots.len() < 2 {
        return 0;
    }
    let mut intervals: Vec<(usize, u32, u32)> = slots
        .iter()
        .map(|&s| {
            let slot = problem.slot(s);
            (slot.day.index(), slot.start_hour, slot.end_hour)
        })
        .collect();
    intervals.sort_unstable();

    intervals
        .windows(2)
        .filter(|pair| pair[0].0 == pair[1].0)
        .map(|pair| pair[1].1.saturating_sub(pair[0].2))
        .sum()
}
