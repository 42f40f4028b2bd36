//! GA-based timetable search.
//!
//! Candidates use a positional encoding: one (slot, room, teacher) gene
//! per block of the fixed block sequence. The loop alternates selection,
//! uniform crossover, schedule mutation, a deterministic repair pipeline
//! and re-evaluation.
//!
//! # Submodules
//!
//! - [`operators`]: per-gene crossover and mutation probabilities
//! - [`fitness`]: weighted penalty/reward evaluation
//! - [`repair`]: group unification, overload rebalancing, top-hour
//!   promotion, conflict elimination
//!
//! # Reference
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and Machine Learning"

mod chromosome;
pub mod fitness;
pub mod operators;
mod problem;
pub mod repair;
mod runner;

pub use chromosome::{
    schedule_mutation, uniform_crossover, Gene, MutationTarget, TimetableChromosome,
    GROUP_REUSE_FACTOR,
};
pub use fitness::{FitnessReport, FitnessWeights};
pub use problem::TimetableProblem;
pub use repair::{repair, RepairReport};
pub use runner::{EliteArchive, GaConfig, GaResult, GaRunner, GenerationStats};
