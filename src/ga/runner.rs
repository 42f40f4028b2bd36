//! Generational GA loop.
//!
//! # Algorithm
//!
//! 1. Seed `population_size` candidates with the constructive generator
//!    and evaluate them.
//! 2. Per generation: tournament selection, pairwise uniform crossover
//!    with probability `crossover_prob`, then per offspring: mutation
//!    with probability `mutation_prob`, the full repair pipeline, and
//!    re-evaluation if the fitness went stale.
//! 3. Replace the population, then update the elite archive and the
//!    statistics series.
//!
//! # Randomness
//!
//! A master [`ChaCha8Rng`] seeded from [`GaConfig::seed`] drives selection
//! and crossover. Before seeding and before each offspring phase it also
//! hands one `u64` per candidate, in index order, to a private per-candidate
//! stream. Results are identical with `parallel` on or off.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::chromosome::TimetableChromosome;
use super::operators::GeneticOperators;
use super::problem::TimetableProblem;
use super::repair::repair;
use crate::error::TimetableError;

/// GA loop configuration.
///
/// # Examples
///
/// ```
/// use u_timetable::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(200)
///     .with_max_generations(100)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    pub population_size: usize,
    pub max_generations: usize,
    /// Probability that a selected pair is recombined.
    pub crossover_prob: f64,
    /// Probability that an offspring is mutated.
    pub mutation_prob: f64,
    pub tournament_size: usize,
    /// Number of best-ever candidates kept.
    pub archive_size: usize,
    /// Random seed for reproducibility (`None` draws one from the OS).
    pub seed: Option<u64>,
    /// Whether to process offspring on the rayon pool.
    pub parallel: bool,
    pub operators: GeneticOperators,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 1000,
            max_generations: 500,
            crossover_prob: 0.8,
            mutation_prob: 0.4,
            tournament_size: 3,
            archive_size: 10,
            seed: None,
            parallel: true,
            operators: GeneticOperators::default(),
        }
    }
}

impl GaConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    pub fn with_crossover_prob(mut self, p: f64) -> Self {
        self.crossover_prob = p.clamp(0.0, 1.0);
        self
    }

    pub fn with_mutation_prob(mut self, p: f64) -> Self {
        self.mutation_prob = p.clamp(0.0, 1.0);
        self
    }

    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    pub fn with_archive_size(mut self, k: usize) -> Self {
        self.archive_size = k;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_operators(mut self, operators: GeneticOperators) -> Self {
        self.operators = operators;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), TimetableError> {
        let fail = |msg: String| Err(TimetableError::InvalidConfig(msg));
        if self.population_size < 2 {
            return fail("population_size must be at least 2".into());
        }
        if self.max_generations == 0 {
            return fail("max_generations must be at least 1".into());
        }
        if self.tournament_size == 0 {
            return fail("tournament_size must be at least 1".into());
        }
        if self.archive_size == 0 {
            return fail("archive_size must be at least 1".into());
        }
        for (name, p) in [
            ("crossover_prob", self.crossover_prob),
            ("mutation_prob", self.mutation_prob),
            ("crossover_gene_prob", self.operators.crossover_gene_prob),
            ("mutation_gene_prob", self.operators.mutation_gene_prob),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return fail(format!("{name} must be in [0, 1], got {p}"));
            }
        }
        Ok(())
    }
}

/// Best-ever candidates, sorted by fitness descending.
///
/// Equal fitness keeps insertion order; a candidate whose genes are
/// already archived is skipped.
#[derive(Debug, Clone, Default)]
pub struct EliteArchive {
    capacity: usize,
    entries: Vec<TimetableChromosome>,
}

impl EliteArchive {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity + 1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<&TimetableChromosome> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[TimetableChromosome] {
        &self.entries
    }

    /// Offers every evaluated candidate in order.
    pub fn update<'a, I>(&mut self, candidates: I)
    where
        I: IntoIterator<Item = &'a TimetableChromosome>,
    {
        for candidate in candidates {
            self.offer(candidate);
        }
    }

    fn offer(&mut self, candidate: &TimetableChromosome) {
        if !candidate.is_evaluated() || self.capacity == 0 {
            return;
        }
        let score = candidate.score();
        let pos = self
            .entries
            .iter()
            .position(|e| e.score() < score)
            .unwrap_or(self.entries.len());
        if pos >= self.capacity {
            return;
        }
        if self.entries.iter().any(|e| e.genes == candidate.genes) {
            return;
        }
        self.entries.insert(pos, candidate.clone());
        self.entries.truncate(self.capacity);
    }

    pub fn into_vec(self) -> Vec<TimetableChromosome> {
        self.entries
    }
}

/// Fitness distribution of one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation.
    pub std: f64,
}

impl GenerationStats {
    pub fn from_population(generation: usize, population: &[TimetableChromosome]) -> Self {
        let scores: Vec<f64> = population.iter().map(|c| c.score()).collect();
        if scores.is_empty() {
            return Self {
                generation,
                mean: 0.0,
                min: 0.0,
                max: 0.0,
                std: 0.0,
            };
        }
        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let var = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        Self {
            generation,
            mean,
            min: scores.iter().copied().fold(f64::INFINITY, f64::min),
            max: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            std: var.sqrt(),
        }
    }
}

/// Outcome of one GA run.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// Top archive entry.
    pub best: TimetableChromosome,
    pub best_fitness: f64,
    /// Best-ever candidates, best first.
    pub archive: Vec<TimetableChromosome>,
    /// One entry per generation.
    pub stats: Vec<GenerationStats>,
    pub generations: usize,
    /// Seed actually used (drawn from the OS when not configured).
    pub seed: u64,
}

/// Generational GA over a [`TimetableProblem`].
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA to completion.
    ///
    /// Fails only on an invalid configuration.
    #[tracing::instrument(
        level = "debug",
        name = "ga_run",
        skip(problem, config),
        fields(blocks = problem.block_count(), population = config.population_size)
    )]
    pub fn run(problem: &TimetableProblem, config: &GaConfig) -> Result<GaResult, TimetableError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let mut master = ChaCha8Rng::seed_from_u64(seed);
        let n = config.population_size;

        info!(
            seed,
            population = n,
            generations = config.max_generations,
            blocks = problem.block_count(),
            "timetable search started"
        );

        let seeds = draw_seeds(&mut master, n);
        let mut population: Vec<TimetableChromosome> = if config.parallel {
            seeds.into_par_iter().map(|s| seed_candidate(problem, s)).collect()
        } else {
            seeds.into_iter().map(|s| seed_candidate(problem, s)).collect()
        };

        let mut archive = EliteArchive::new(config.archive_size);
        archive.update(&population);
        let mut stats = Vec::with_capacity(config.max_generations);

        let mutation_prob = config.mutation_prob;
        let operators = &config.operators;
        let develop = |candidate: &mut TimetableChromosome, s: u64| {
            let mut rng = ChaCha8Rng::seed_from_u64(s);
            if rng.random::<f64>() < mutation_prob {
                operators.mutate(candidate, problem, &mut rng);
            }
            repair(problem, candidate);
            problem.ensure_evaluated(candidate);
        };

        for generation in 0..config.max_generations {
            let mut offspring: Vec<TimetableChromosome> = (0..n)
                .map(|_| tournament(&population, config.tournament_size, &mut master).clone())
                .collect();

            for pair in offspring.chunks_exact_mut(2) {
                if master.random::<f64>() < config.crossover_prob {
                    let (a, b) = pair.split_at_mut(1);
                    operators.crossover(&mut a[0], &mut b[0], &mut master);
                }
            }

            let seeds = draw_seeds(&mut master, n);
            if config.parallel {
                offspring
                    .par_iter_mut()
                    .zip(seeds.into_par_iter())
                    .for_each(|(c, s)| develop(c, s));
            } else {
                offspring
                    .iter_mut()
                    .zip(seeds)
                    .for_each(|(c, s)| develop(c, s));
            }

            population = offspring;
            archive.update(&population);
            let record = GenerationStats::from_population(generation, &population);

            if generation % 10 == 0 || generation + 1 == config.max_generations {
                debug!(
                    generation,
                    max = record.max,
                    mean = record.mean,
                    min = record.min,
                    "generation complete"
                );
            }
            stats.push(record);
        }

        let best = archive
            .best()
            .cloned()
            .ok_or_else(|| TimetableError::InvalidConfig("empty population".into()))?;
        let best_fitness = best.score();
        info!(best_fitness, archived = archive.len(), "timetable search finished");

        Ok(GaResult {
            best,
            best_fitness,
            archive: archive.into_vec(),
            stats,
            generations: config.max_generations,
            seed,
        })
    }
}

fn draw_seeds(master: &mut ChaCha8Rng, n: usize) -> Vec<u64> {
    (0..n).map(|_| master.random()).collect()
}

fn seed_candidate(problem: &TimetableProblem, seed: u64) -> TimetableChromosome {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut candidate = problem.create_individual(&mut rng);
    problem.ensure_evaluated(&mut candidate);
    candidate
}

/// Tournament with replacement; the first strictly best contender wins.
fn tournament<'a, R: Rng>(
    population: &'a [TimetableChromosome],
    size: usize,
    rng: &mut R,
) -> &'a TimetableChromosome {
    let mut best = &population[rng.random_range(0..population.len())];
    for _ in 1..size {
        let contender = &population[rng.random_range(0..population.len())];
        if contender.score() > best.score() {
            best = contender;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::chromosome::Gene;
    use crate::ga::repair::rebalance_overloaded;
    use crate::testing::{overloaded_problem, single_teacher_problem, slack_problem};
    use rand::rngs::SmallRng;

    fn small_config() -> GaConfig {
        GaConfig::default()
            .with_population_size(16)
            .with_max_generations(8)
            .with_seed(42)
    }

    fn scored(genes: Vec<Gene>, fitness: f64) -> TimetableChromosome {
        let mut c = TimetableChromosome::new(genes);
        c.set_fitness(fitness);
        c
    }

    #[test]
    fn test_default_config() {
        let config = GaConfig::default();
        assert_eq!(config.population_size, 1000);
        assert_eq!(config.max_generations, 500);
        assert!((config.crossover_prob - 0.8).abs() < 1e-10);
        assert!((config.mutation_prob - 0.4).abs() < 1e-10);
        assert_eq!(config.tournament_size, 3);
        assert_eq!(config.archive_size, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects() {
        assert!(GaConfig::default().with_population_size(1).validate().is_err());
        assert!(GaConfig::default().with_max_generations(0).validate().is_err());
        assert!(GaConfig::default().with_tournament_size(0).validate().is_err());
        let mut config = GaConfig::default();
        config.mutation_prob = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_archive_order_and_capacity() {
        let mut archive = EliteArchive::new(2);
        archive.update(&[
            scored(vec![Gene::new(0, 0, 0)], 1.0),
            scored(vec![Gene::new(1, 0, 0)], 3.0),
            scored(vec![Gene::new(2, 0, 0)], 3.0),
            scored(vec![Gene::new(3, 0, 0)], 2.0),
        ]);
        assert_eq!(archive.len(), 2);
        // Ties keep insertion order.
        assert_eq!(archive.entries()[0].genes[0].slot, 1);
        assert_eq!(archive.entries()[1].genes[0].slot, 2);
    }

    #[test]
    fn test_archive_skips_duplicates_and_unevaluated() {
        let mut archive = EliteArchive::new(5);
        let a = scored(vec![Gene::new(0, 0, 0)], 1.0);
        archive.update([&a, &a]);
        archive.update([&TimetableChromosome::new(vec![Gene::new(9, 0, 0)])]);
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_stats() {
        let pop = vec![
            scored(vec![], 1.0),
            scored(vec![], 2.0),
            scored(vec![], 3.0),
        ];
        let s = GenerationStats::from_population(4, &pop);
        assert_eq!(s.generation, 4);
        assert!((s.mean - 2.0).abs() < 1e-10);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 3.0);
        assert!((s.std - (2.0f64 / 3.0).sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_tournament_picks_best_of_full_sample() {
        let pop = vec![scored(vec![], 5.0), scored(vec![], 5.0)];
        let mut rng = SmallRng::seed_from_u64(42);
        let winner = tournament(&pop, 3, &mut rng);
        assert_eq!(winner.score(), 5.0);
    }

    #[test]
    fn test_run_basic() {
        let problem = slack_problem();
        let result = GaRunner::run(&problem, &small_config()).unwrap();

        assert_eq!(result.generations, 8);
        assert_eq!(result.stats.len(), 8);
        assert_eq!(result.seed, 42);
        assert!(result.best.is_valid(&problem));
        assert!(!result.archive.is_empty());
        assert!(result.archive.len() <= 10);
        assert_eq!(result.best_fitness, result.archive[0].score());
        for pair in result.archive.windows(2) {
            assert!(pair[0].score() >= pair[1].score());
        }
        for s in &result.stats {
            assert!(result.best_fitness >= s.max);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let problem = slack_problem();
        let seq = GaRunner::run(&problem, &small_config().with_parallel(false)).unwrap();
        let par = GaRunner::run(&problem, &small_config().with_parallel(true)).unwrap();

        assert_eq!(seq.best.genes, par.best.genes);
        assert_eq!(seq.stats, par.stats);
    }

    #[test]
    fn test_run_rejects_invalid_config() {
        let problem = slack_problem();
        let err = GaRunner::run(&problem, &GaConfig::default().with_population_size(0));
        assert!(matches!(err, Err(TimetableError::InvalidConfig(_))));
    }

    #[test]
    fn test_single_teacher_scenario() {
        let problem = single_teacher_problem();
        let result = GaRunner::run(&problem, &small_config()).unwrap();
        let best = &result.best;

        assert_eq!(problem.block_count(), 2);
        let d0 = problem.slot(best.genes[0].slot).day;
        let d1 = problem.slot(best.genes[1].slot).day;
        assert_ne!(d0, d1);

        let report = problem.evaluate_detailed(best);
        assert_eq!(report.hard_penalty, 0.0);
        assert!(report.score > 0.0);
    }

    #[test]
    fn test_overloaded_teacher_keeps_residual_penalty() {
        let problem = overloaded_problem();
        let result = GaRunner::run(&problem, &small_config()).unwrap();

        let mut best = result.best.clone();
        assert!(!rebalance_overloaded(&problem, &mut best));

        let report = problem.evaluate_detailed(&best);
        assert_eq!(report.overloaded_teachers, 1);
        assert!(report.workload_penalty > 0.0);
    }
}
