//! Configurable genetic operators for timetables.
//!
//! Bundles the per-gene probabilities of uniform crossover and schedule
//! mutation so the runner can be tuned from configuration.
//!
//! # Usage
//!
//! ```
//! use u_timetable::ga::operators::GeneticOperators;
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.crossover_gene_prob, 0.5);
//! assert_eq!(ops.mutation_gene_prob, 0.2);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chromosome::{schedule_mutation, uniform_crossover, TimetableChromosome};
use super::problem::TimetableProblem;

/// Per-gene operator probabilities.
///
/// # Example
///
/// ```
/// use u_timetable::ga::operators::GeneticOperators;
///
/// let ops = GeneticOperators::default()
///     .with_crossover_gene_prob(0.3)
///     .with_mutation_gene_prob(0.05);
/// assert_eq!(ops.mutation_gene_prob, 0.05);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticOperators {
    /// Probability that uniform crossover swaps a given position.
    pub crossover_gene_prob: f64,
    /// Probability that mutation resamples a given gene.
    pub mutation_gene_prob: f64,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self {
            crossover_gene_prob: 0.5,
            mutation_gene_prob: 0.2,
        }
    }
}

impl GeneticOperators {
    pub fn with_crossover_gene_prob(mut self, p: f64) -> Self {
        self.crossover_gene_prob = p.clamp(0.0, 1.0);
        self
    }

    pub fn with_mutation_gene_prob(mut self, p: f64) -> Self {
        self.mutation_gene_prob = p.clamp(0.0, 1.0);
        self
    }

    /// Uniform crossover, in place on both parents.
    pub fn crossover<R: Rng>(
        &self,
        a: &mut TimetableChromosome,
        b: &mut TimetableChromosome,
        rng: &mut R,
    ) {
        uniform_crossover(a, b, self.crossover_gene_prob, rng);
    }

    /// Schedule mutation. Returns whether any gene was resampled.
    pub fn mutate<R: Rng>(
        &self,
        chromosome: &mut TimetableChromosome,
        problem: &TimetableProblem,
        rng: &mut R,
    ) -> bool {
        schedule_mutation(chromosome, problem, self.mutation_gene_prob, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::slack_problem;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_operators() {
        let ops = GeneticOperators::default();
        assert!((ops.crossover_gene_prob - 0.5).abs() < 1e-10);
        assert!((ops.mutation_gene_prob - 0.2).abs() < 1e-10);
    }

    #[test]
    fn test_builders_clamp() {
        let ops = GeneticOperators::default()
            .with_crossover_gene_prob(1.7)
            .with_mutation_gene_prob(-0.1);
        assert_eq!(ops.crossover_gene_prob, 1.0);
        assert_eq!(ops.mutation_gene_prob, 0.0);
    }

    #[test]
    fn test_crossover_preserves_genes_per_position() {
        let problem = slack_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let p1 = problem.create_individual(&mut rng);
        let p2 = problem.create_individual(&mut rng);

        let ops = GeneticOperators::default();
        let mut c1 = p1.clone();
        let mut c2 = p2.clone();
        ops.crossover(&mut c1, &mut c2, &mut rng);

        for i in 0..problem.block_count() {
            let mut pair = [c1.genes[i], c2.genes[i]];
            let mut orig = [p1.genes[i], p2.genes[i]];
            pair.sort_by_key(|g| (g.slot, g.room, g.teacher));
            orig.sort_by_key(|g| (g.slot, g.room, g.teacher));
            assert_eq!(pair, orig);
        }
    }

    #[test]
    fn test_mutate_changes_something_eventually() {
        let problem = slack_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let original = problem.create_individual(&mut rng);
        let ops = GeneticOperators::default().with_mutation_gene_prob(1.0);

        let mut ch = original.clone();
        assert!(ops.mutate(&mut ch, &problem, &mut rng));
        assert!(ch.is_valid(&problem));
        assert!(!ch.is_evaluated());
    }

    #[test]
    fn test_from_json() {
        let ops: GeneticOperators = serde_json::from_str(r#"{ "mutation_gene_prob": 0.1 }"#).unwrap();
        assert_eq!(ops.mutation_gene_prob, 0.1);
        assert_eq!(ops.crossover_gene_prob, 0.5);
    }
}
