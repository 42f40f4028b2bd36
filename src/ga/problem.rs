//! Timetabling GA problem definition.
//!
//! Holds the immutable catalogs (slots, rooms, teachers, blocks) and the
//! indices derived from them once at construction. Every pipeline stage
//! receives the problem by shared reference; nothing here is mutated
//! after [`TimetableProblem::new`] returns.

use std::collections::HashMap;

use rand::Rng;
use tracing::warn;

use super::chromosome::TimetableChromosome;
use super::fitness::{self, FitnessReport, FitnessWeights};
use crate::config::SchedulerConfig;
use crate::dispatching::{TeacherRoster, WorkloadContext};
use crate::error::{CatalogKind, TimetableError};
use crate::models::{
    decompose, Block, Room, Slot, SlotCatalog, Subject, Teacher, Timetable, TimetableEntry,
};

/// GA problem definition for weekly timetabling.
///
/// # Example
/// ```
/// use u_timetable::ga::TimetableProblem;
/// use u_timetable::models::{Day, Room, Subject, Teacher, TeacherCategory, TimeWindow};
/// use u_timetable::SchedulerConfig;
///
/// let teachers = vec![Teacher::new("D1", TeacherCategory::Top)
///     .with_max_hours(16)
///     .with_window_on(&Day::WEEK, TimeWindow::hours(7, 22))];
/// let rooms = vec![Room::lecture("A1", 30)];
/// let subjects = vec![Subject::new("S1", 6, 20)];
///
/// let problem =
///     TimetableProblem::new(teachers, rooms, &subjects, SchedulerConfig::default()).unwrap();
/// assert_eq!(problem.block_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TimetableProblem {
    slots: SlotCatalog,
    rooms: Vec<Room>,
    roster: TeacherRoster,
    blocks: Vec<Block>,
    config: SchedulerConfig,
    weights: FitnessWeights,
    /// Resolved eligible teachers per block (empty = none declared).
    eligible: Vec<Vec<usize>>,
    all_teachers: Vec<usize>,
    /// Block → (subject, group) index.
    group_of: Vec<usize>,
    /// (subject, group) index → member blocks, in block order.
    groups: Vec<Vec<usize>>,
    /// Row-major teacher × slot availability.
    availability: Vec<bool>,
    slot_has_teacher: Vec<bool>,
    salaried_count: usize,
}

impl TimetableProblem {
    /// Builds a problem over the standard Monday–Saturday 07–22 catalog.
    pub fn new(
        teachers: Vec<Teacher>,
        rooms: Vec<Room>,
        subjects: &[Subject],
        config: SchedulerConfig,
    ) -> Result<Self, TimetableError> {
        Self::with_catalog(SlotCatalog::standard(), teachers, rooms, subjects, config)
    }

    /// Builds a problem over a custom slot catalog.
    ///
    /// Fails if any catalog is empty, if the slot catalog lacks a duration
    /// class some block needs, or if the configuration is out of range.
    pub fn with_catalog(
        slots: SlotCatalog,
        teachers: Vec<Teacher>,
        rooms: Vec<Room>,
        subjects: &[Subject],
        config: SchedulerConfig,
    ) -> Result<Self, TimetableError> {
        config.validate()?;
        if slots.is_empty() {
            return Err(TimetableError::EmptyCatalog(CatalogKind::Slots));
        }
        if rooms.is_empty() {
            return Err(TimetableError::EmptyCatalog(CatalogKind::Rooms));
        }
        if teachers.is_empty() {
            return Err(TimetableError::EmptyCatalog(CatalogKind::Teachers));
        }

        let teacher_index: HashMap<&str, usize> = teachers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.as_str(), i))
            .collect();
        for subject in subjects {
            for id in &subject.eligible_teachers {
                if !teacher_index.contains_key(id.as_str()) {
                    warn!(subject = %subject.id, teacher = %id, "unknown eligible teacher dropped");
                }
            }
        }

        let blocks = decompose(subjects, config.max_group_size);
        if blocks
            .iter()
            .any(|b| slots.indices_for(b.duration).is_empty())
        {
            return Err(TimetableError::EmptyCatalog(CatalogKind::Slots));
        }

        let eligible: Vec<Vec<usize>> = blocks
            .iter()
            .map(|b| {
                let mut resolved: Vec<usize> = Vec::with_capacity(b.eligible_teachers.len());
                for id in &b.eligible_teachers {
                    if let Some(&t) = teacher_index.get(id.as_str()) {
                        if !resolved.contains(&t) {
                            resolved.push(t);
                        }
                    }
                }
                resolved
            })
            .collect();

        let mut group_keys: HashMap<(&str, u32), usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut group_of = Vec::with_capacity(blocks.len());
        for (i, b) in blocks.iter().enumerate() {
            let next = groups.len();
            let g = *group_keys
                .entry((b.subject_id.as_str(), b.group))
                .or_insert(next);
            if g == next {
                groups.push(Vec::new());
            }
            groups[g].push(i);
            group_of.push(g);
        }

        let roster = TeacherRoster::new(teachers, &config);

        let mut availability = vec![false; roster.len() * slots.len()];
        let mut slot_has_teacher = vec![false; slots.len()];
        for t in 0..roster.len() {
            for (s, slot) in slots.slots().iter().enumerate() {
                if roster.is_available(t, slot) {
                    availability[t * slots.len() + s] = true;
                    slot_has_teacher[s] = true;
                }
            }
        }

        let salaried_count = roster
            .teachers()
            .iter()
            .filter(|t| t.category.is_salaried())
            .count();
        let all_teachers = (0..roster.len()).collect();

        Ok(Self {
            slots,
            rooms,
            roster,
            blocks,
            config,
            weights: FitnessWeights::default(),
            eligible,
            all_teachers,
            group_of,
            groups,
            availability,
            slot_has_teacher,
            salaried_count,
        })
    }

    /// Replaces the fitness weights.
    pub fn with_weights(mut self, weights: FitnessWeights) -> Self {
        self.weights = weights;
        self
    }

    // ---------------------------------------------------------------- catalogs

    pub fn slots(&self) -> &SlotCatalog {
        &self.slots
    }

    #[inline]
    pub fn slot(&self, index: usize) -> &Slot {
        self.slots.slot(index)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    #[inline]
    pub fn room(&self, index: usize) -> &Room {
        &self.rooms[index]
    }

    pub fn roster(&self) -> &TeacherRoster {
        &self.roster
    }

    #[inline]
    pub fn teacher(&self, index: usize) -> &Teacher {
        self.roster.teacher(index)
    }

    #[inline]
    pub fn teacher_count(&self) -> usize {
        self.roster.len()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[inline]
    pub fn block(&self, index: usize) -> &Block {
        &self.blocks[index]
    }

    #[inline]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    // ---------------------------------------------------------------- indices

    /// Cached [`teacher_available`](crate::dispatching::teacher_available).
    #[inline]
    pub fn is_available(&self, teacher: usize, slot: usize) -> bool {
        self.availability[teacher * self.slots.len() + slot]
    }

    /// Whether at least one teacher can teach during `slot`.
    #[inline]
    pub fn slot_has_available_teacher(&self, slot: usize) -> bool {
        self.slot_has_teacher[slot]
    }

    /// Resolved eligible teachers of a block (empty if none declared).
    #[inline]
    pub fn eligible(&self, block: usize) -> &[usize] {
        &self.eligible[block]
    }

    /// Eligible teachers of a block, or every teacher when none declared.
    #[inline]
    pub fn pool_for(&self, block: usize) -> &[usize] {
        let eligible = &self.eligible[block];
        if eligible.is_empty() {
            &self.all_teachers
        } else {
            eligible
        }
    }

    /// Whether `teacher` may take `block` under its eligibility list.
    #[inline]
    pub fn is_eligible(&self, block: usize, teacher: usize) -> bool {
        let eligible = &self.eligible[block];
        eligible.is_empty() || eligible.contains(&teacher)
    }

    /// Index of the (subject, group) a block belongs to.
    #[inline]
    pub fn group_of(&self, block: usize) -> usize {
        self.group_of[block]
    }

    /// Member blocks per (subject, group).
    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    /// Number of salaried (top + second) teachers in the catalog.
    #[inline]
    pub fn salaried_count(&self) -> usize {
        self.salaried_count
    }

    /// Hours per teacher implied by a candidate.
    pub fn workload(&self, chromosome: &TimetableChromosome) -> WorkloadContext {
        WorkloadContext::from_assignments(
            self.teacher_count(),
            chromosome
                .genes
                .iter()
                .enumerate()
                .map(|(i, g)| (g.teacher, self.blocks[i].hours())),
        )
    }

    // ---------------------------------------------------------------- GA hooks

    /// Builds one candidate with the constructive generator.
    pub fn create_individual<R: Rng>(&self, rng: &mut R) -> TimetableChromosome {
        TimetableChromosome::generate(self, rng)
    }

    /// Scores a candidate. Higher is better.
    pub fn evaluate(&self, chromosome: &TimetableChromosome) -> f64 {
        fitness::evaluate(self, chromosome).score
    }

    /// Scores a candidate with a per-rule breakdown.
    pub fn evaluate_detailed(&self, chromosome: &TimetableChromosome) -> FitnessReport {
        fitness::evaluate(self, chromosome)
    }

    /// Evaluates only if the candidate's fitness is invalid.
    pub fn ensure_evaluated(&self, chromosome: &mut TimetableChromosome) {
        if !chromosome.is_evaluated() {
            let score = self.evaluate(chromosome);
            chromosome.set_fitness(score);
        }
    }

    /// Decodes a candidate into a readable timetable.
    pub fn decode(&self, chromosome: &TimetableChromosome) -> Timetable {
        let mut timetable = Timetable::new();
        for (i, gene) in chromosome.genes.iter().enumerate() {
            let block = &self.blocks[i];
            let slot = self.slot(gene.slot);
            let room = self.room(gene.room);
            let teacher = self.teacher(gene.teacher);
            timetable.add_entry(TimetableEntry {
                subject_id: block.subject_id.clone(),
                subject_name: block.subject_name.clone(),
                group: block.group_label(),
                students: block.students,
                day: slot.day,
                time: slot.label(),
                start_hour: slot.start_hour,
                end_hour: slot.end_hour,
                room_id: room.id.clone(),
                room_capacity: room.capacity,
                room_kind: room.kind,
                teacher_id: teacher.id.clone(),
                teacher_name: teacher.name.clone(),
                required_kind: block.kind,
            });
        }
        timetable
    }
}
