//! Fixed-arity gene encoding for timetables.
//!
//! # Encoding
//!
//! A candidate holds one [`Gene`] per block, positionally aligned with
//! [`TimetableProblem::blocks`]. Every gene is a triple of catalog indices
//! (slot, room, teacher); catalogs never change during a run, so genes
//! stay valid references for the whole search.
//!
//! # Operators
//!
//! - [`TimetableChromosome::generate`]: constructive generator.
//! - [`uniform_crossover`]: per-gene swap between two parents, in place.
//! - [`schedule_mutation`]: per-gene resample of slot, room or teacher.

use rand::prelude::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::problem::TimetableProblem;
use crate::dispatching::{choose_room, WorkloadContext};
use crate::models::SlotDuration;

/// A teacher already serving a group is kept for the group's next block
/// while it stays below `ceiling × GROUP_REUSE_FACTOR`.
pub const GROUP_REUSE_FACTOR: f64 = 1.5;

/// Assignment of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gene {
    /// Index into the slot catalog.
    pub slot: usize,
    /// Index into the room catalog.
    pub room: usize,
    /// Index into the teacher catalog.
    pub teacher: usize,
}

impl Gene {
    pub fn new(slot: usize, room: usize, teacher: usize) -> Self {
        Self {
            slot,
            room,
            teacher,
        }
    }
}

/// A complete candidate timetable.
///
/// Higher fitness = better timetable (maximization convention).
/// `fitness` is `None` whenever the genes changed since the last
/// evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableChromosome {
    /// One gene per block.
    pub genes: Vec<Gene>,
    /// Fitness of the current genes, if evaluated.
    pub fitness: Option<f64>,
}

impl TimetableChromosome {
    /// Wraps genes into an unevaluated candidate.
    pub fn new(genes: Vec<Gene>) -> Self {
        Self {
            genes,
            fitness: None,
        }
    }

    /// Builds one candidate block by block.
    ///
    /// Per block: a slot of the block's duration where at least one
    /// teacher is available, on a day the block's group has not used yet
    /// (each filter dropped when it leaves nothing); a room from
    /// [`choose_room`]; then the group's earlier teacher when still
    /// available and below [`GROUP_REUSE_FACTOR`] × ceiling, else the
    /// roster's best available candidate from the block's pool.
    pub fn generate<R: Rng>(problem: &TimetableProblem, rng: &mut R) -> Self {
        let roster = problem.roster();
        let group_count = problem.groups().len();
        let mut used_days: Vec<u8> = vec![0; group_count];
        let mut group_teacher: Vec<Option<usize>> = vec![None; group_count];
        let mut load = WorkloadContext::new(problem.teacher_count());
        let mut genes = Vec::with_capacity(problem.block_count());

        for (i, block) in problem.blocks().iter().enumerate() {
            let group = problem.group_of(i);
            let hours = block.hours();

            let slot = pick_slot(problem, block.duration, used_days[group], rng);
            used_days[group] |= 1 << problem.slot(slot).day.index();

            let room = choose_room(problem.rooms(), block, rng).unwrap_or(0);

            let reuse_ok = |t: usize, load: &WorkloadContext| {
                f64::from(load.hours(t) + hours)
                    <= f64::from(roster.ceiling(t)) * GROUP_REUSE_FACTOR
            };

            let previous = group_teacher[group]
                .filter(|&t| problem.is_available(t, slot) && reuse_ok(t, &load));
            let teacher = match previous {
                Some(t) => t,
                None => {
                    let pool = problem.pool_for(i);
                    let available: Vec<usize> = pool
                        .iter()
                        .copied()
                        .filter(|&t| problem.is_available(t, slot))
                        .collect();
                    let candidates: &[usize] = if available.is_empty() {
                        pool
                    } else {
                        &available
                    };
                    let t = roster.choose(candidates, &load, hours, true).unwrap_or(0);
                    if reuse_ok(t, &load) {
                        group_teacher[group] = Some(t);
                    }
                    t
                }
            };

            load.add(teacher, hours);
            genes.push(Gene::new(slot, room, teacher));
        }

        Self::new(genes)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Whether the stored fitness matches the current genes.
    #[inline]
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    #[inline]
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Marks the fitness stale.
    #[inline]
    pub fn invalidate(&mut self) {
        self.fitness = None;
    }

    /// Fitness for ranking; unevaluated candidates rank last.
    #[inline]
    pub fn score(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }

    /// Checks length, index ranges and slot durations against the problem.
    pub fn is_valid(&self, problem: &TimetableProblem) -> bool {
        self.genes.len() == problem.block_count()
            && self.genes.iter().enumerate().all(|(i, g)| {
                g.slot < problem.slots().len()
                    && g.room < problem.rooms().len()
                    && g.teacher < problem.teacher_count()
                    && problem.slot(g.slot).duration == problem.block(i).duration
            })
    }
}

fn pick_slot<R: Rng>(
    problem: &TimetableProblem,
    duration: SlotDuration,
    used_days: u8,
    rng: &mut R,
) -> usize {
    let by_duration = problem.slots().indices_for(duration);

    let viable: Vec<usize> = by_duration
        .iter()
        .copied()
        .filter(|&s| problem.slot_has_available_teacher(s))
        .collect();
    let viable = if viable.is_empty() {
        by_duration.to_vec()
    } else {
        viable
    };

    let fresh: Vec<usize> = viable
        .iter()
        .copied()
        .filter(|&s| used_days & (1 << problem.slot(s).day.index()) == 0)
        .collect();
    let candidates = if fresh.is_empty() { &viable } else { &fresh };

    // Never empty: the problem rejects catalogs missing a block's duration.
    candidates
        .choose(rng)
        .copied()
        .unwrap_or_else(|| by_duration[0])
}

// ======================== Crossover ========================

/// Uniform crossover: swaps gene `i` between the parents with probability
/// `gene_prob`, independently per position. Both parents become children
/// and their fitness is invalidated.
pub fn uniform_crossover<R: Rng>(
    a: &mut TimetableChromosome,
    b: &mut TimetableChromosome,
    gene_prob: f64,
    rng: &mut R,
) {
    for (x, y) in a.genes.iter_mut().zip(b.genes.iter_mut()) {
        if rng.random::<f64>() < gene_prob {
            std::mem::swap(x, y);
        }
    }
    a.invalidate();
    b.invalidate();
}

// ======================== Mutation ========================

/// Gene component resampled by [`schedule_mutation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationTarget {
    Slot,
    Room,
    Teacher,
}

impl MutationTarget {
    pub const ALL: [MutationTarget; 3] = [
        MutationTarget::Slot,
        MutationTarget::Room,
        MutationTarget::Teacher,
    ];

    fn sample<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Schedule mutation.
///
/// Each gene is hit with probability `gene_prob`; a hit resamples one
/// uniformly chosen component:
/// - slot: uniform among slots of the block's duration;
/// - room: [`choose_room`];
/// - teacher: another group member's teacher if available at the slot,
///   else the roster's best candidate (eligible teachers listed first,
///   filtered by availability) against an hours snapshot taken before
///   this mutation.
///
/// Returns whether any gene was hit; fitness is invalidated if so.
pub fn schedule_mutation<R: Rng>(
    chromosome: &mut TimetableChromosome,
    problem: &TimetableProblem,
    gene_prob: f64,
    rng: &mut R,
) -> bool {
    let mut snapshot = problem.workload(chromosome);
    let mut mutated = false;

    for i in 0..chromosome.genes.len() {
        if rng.random::<f64>() >= gene_prob {
            continue;
        }
        mutated = true;
        let block = problem.block(i);

        match MutationTarget::sample(rng) {
            MutationTarget::Slot => {
                if let Some(&s) = problem.slots().indices_for(block.duration).choose(rng) {
                    chromosome.genes[i].slot = s;
                }
            }
            MutationTarget::Room => {
                if let Some(r) = choose_room(problem.rooms(), block, rng) {
                    chromosome.genes[i].room = r;
                }
            }
            MutationTarget::Teacher => {
                let teacher = mutate_teacher(problem, &chromosome.genes, i, &mut snapshot);
                chromosome.genes[i].teacher = teacher;
            }
        }
    }

    if mutated {
        chromosome.invalidate();
    }
    mutated
}

fn mutate_teacher(
    problem: &TimetableProblem,
    genes: &[Gene],
    index: usize,
    snapshot: &mut WorkloadContext,
) -> usize {
    let slot = genes[index].slot;

    let sibling = problem.groups()[problem.group_of(index)]
        .iter()
        .filter(|&&j| j != index)
        .map(|&j| genes[j].teacher)
        .find(|&t| problem.is_available(t, slot));
    if let Some(t) = sibling {
        return t;
    }

    let eligible = problem.eligible(index);
    let mut ordered: Vec<usize> = eligible.to_vec();
    ordered.extend((0..problem.teacher_count()).filter(|t| !eligible.contains(t)));

    let available: Vec<usize> = ordered
        .iter()
        .copied()
        .filter(|&t| problem.is_available(t, slot))
        .collect();
    let candidates = if available.is_empty() {
        &ordered
    } else {
        &available
    };

    let hours = problem.block(index).hours();
    let teacher = problem
        .roster()
        .choose(candidates, snapshot, hours, true)
        .unwrap_or(genes[index].teacher);
    snapshot.add(teacher, hours);
    teacher
}
