//! Room and teacher selection heuristics.
//!
//! # Teacher ranking
//!
//! Candidates are ranked ascending by
//! `(below category target ? 0 : 1, running hours, top category ? 0 : 1)`;
//! ties keep pool order. The same ranking is used by the generator, the
//! mutation operator and the repair pipeline.
//!
//! # Room choice
//!
//! Uniform among rooms matching kind and capacity, relaxed to capacity
//! only, then to any room.

use rand::prelude::IndexedRandom;
use rand::Rng;

use super::matchers::{room_fits, teacher_available};
use super::WorkloadContext;
use crate::config::SchedulerConfig;
use crate::models::{Block, Room, Slot, Teacher, TeacherCategory};

/// Teachers with their resolved ceilings and hour targets.
///
/// Built once per problem; read-only afterwards.
#[derive(Debug, Clone)]
pub struct TeacherRoster {
    teachers: Vec<Teacher>,
    ceilings: Vec<u32>,
    targets: Vec<Option<u32>>,
    hard_limit_factor: f64,
}

impl TeacherRoster {
    /// Resolves ceilings (declared or default) and targets per teacher.
    pub fn new(teachers: Vec<Teacher>, config: &SchedulerConfig) -> Self {
        let ceilings = teachers
            .iter()
            .map(|t| t.max_weekly_hours.unwrap_or(config.default_max_hours))
            .collect();
        let targets = teachers
            .iter()
            .map(|t| config.target_hours(t.category))
            .collect();
        Self {
            teachers,
            ceilings,
            targets,
            hard_limit_factor: config.hard_limit_factor,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.teachers.len()
    }

    #[inline]
    pub fn teacher(&self, index: usize) -> &Teacher {
        &self.teachers[index]
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    #[inline]
    pub fn category(&self, index: usize) -> TeacherCategory {
        self.teachers[index].category
    }

    /// Weekly ceiling in hours.
    #[inline]
    pub fn ceiling(&self, index: usize) -> u32 {
        self.ceilings[index]
    }

    /// Category hour target, if any.
    #[inline]
    pub fn target(&self, index: usize) -> Option<u32> {
        self.targets[index]
    }

    /// `ceiling × hard_limit_factor`.
    #[inline]
    pub fn hard_limit(&self, index: usize) -> f64 {
        f64::from(self.ceilings[index]) * self.hard_limit_factor
    }

    /// Whether adding `extra` hours keeps the teacher within its hard limit.
    #[inline]
    pub fn within_hard_limit(&self, index: usize, load: &WorkloadContext, extra: u32) -> bool {
        f64::from(load.hours(index) + extra) <= self.hard_limit(index)
    }

    /// Availability of teacher `index` at `slot`.
    #[inline]
    pub fn is_available(&self, index: usize, slot: &Slot) -> bool {
        teacher_available(&self.teachers[index], slot)
    }

    /// Ranking key; lower is preferred.
    #[inline]
    pub fn rank_key(&self, index: usize, load: &WorkloadContext) -> (u8, u32, u8) {
        let hours = load.hours(index);
        let under_target = match self.targets[index] {
            Some(target) if hours < target => 0,
            _ => 1,
        };
        let top = u8::from(self.category(index) != TeacherCategory::Top);
        (under_target, hours, top)
    }

    /// Picks the best-ranked teacher from `pool`.
    ///
    /// With `respect_limit`, candidates that would pass their hard limit
    /// after taking `extra` hours are dropped first, unless that empties
    /// the pool. Returns `None` only for an empty pool.
    pub fn choose(
        &self,
        pool: &[usize],
        load: &WorkloadContext,
        extra: u32,
        respect_limit: bool,
    ) -> Option<usize> {
        let feasible: Vec<usize> = if respect_limit {
            pool.iter()
                .copied()
                .filter(|&t| self.within_hard_limit(t, load, extra))
                .collect()
        } else {
            Vec::new()
        };
        let candidates: &[usize] = if feasible.is_empty() { pool } else { &feasible };

        candidates
            .iter()
            .copied()
            .min_by_key(|&t| self.rank_key(t, load))
    }
}

/// Picks a room for `block`, progressively relaxing requirements.
///
/// Returns `None` only when `rooms` is empty.
pub fn choose_room<R: Rng>(rooms: &[Room], block: &Block, rng: &mut R) -> Option<usize> {
    let fitting: Vec<usize> = (0..rooms.len())
        .filter(|&r| room_fits(&rooms[r], block))
        .collect();
    if let Some(&r) = fitting.choose(rng) {
        return Some(r);
    }

    let large_enough: Vec<usize> = (0..rooms.len())
        .filter(|&r| rooms[r].capacity >= block.students)
        .collect();
    if let Some(&r) = large_enough.choose(rng) {
        return Some(r);
    }

    if rooms.is_empty() {
        None
    } else {
        Some(rng.random_range(0..rooms.len()))
    }
}
