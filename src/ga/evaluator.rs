//! Batch chromosome evaluator.
//!
//! Bridges the GA driver and the timeline simulator: a batch of chromosomes
//! goes in, one fitness per chromosome comes out, in input order.
//!
//! Each chromosome is simulated independently against the same read-only
//! [`EvaluationContext`], so a batch can be split across threads without
//! synchronization. Infeasible chromosomes get [`INFEASIBLE`] and do not
//! stop the batch. A malformed chromosome does.
//!
//! # Reference
//! Hartmann (1998), "A competitive genetic algorithm for resource-constrained
//! project scheduling"

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, trace};

use super::{Chromosome, EvaluatorConfig};
use crate::duration::DurationModel;
use crate::error::{Error, Result};
use crate::models::{ResourcePool, TaskGraph, WorkerCount};
use crate::timeline::{simulate_with, EvaluationContext, Fitness, Outcome, INFEASIBLE};

/// Evaluates chromosome batches against one graph, pool and duration model.
///
/// # Example
/// ```
/// use u_timeline::duration::VolumeDuration;
/// use u_timeline::ga::{Chromosome, ChromosomeEvaluator};
/// use u_timeline::models::{ResourcePool, TaskGraph};
///
/// let graph = TaskGraph::new(vec![vec![], vec![0]], vec![]).unwrap();
/// let pool = ResourcePool::new(vec![vec![4]]).unwrap();
/// let durations = VolumeDuration::uniform(2, 1, 8.0);
/// let evaluator = ChromosomeEvaluator::new(&graph, &pool, &durations);
///
/// let chromosome = Chromosome::new(vec![0, 1], vec![vec![4, 0], vec![2, 0]]);
/// assert_eq!(evaluator.evaluate(&[chromosome]).unwrap(), vec![6]);
/// ```
pub struct ChromosomeEvaluator<'a, D: ?Sized> {
    ctx: EvaluationContext<'a, D>,
    config: EvaluatorConfig,
    thread_pool: Option<ThreadPool>,
}

impl<'a, D: DurationModel + ?Sized> ChromosomeEvaluator<'a, D> {
    /// Creates a sequential evaluator with the default horizon.
    pub fn new(graph: &'a TaskGraph, pool: &'a ResourcePool, durations: &'a D) -> Self {
        Self {
            ctx: EvaluationContext::new(graph, pool, durations),
            config: EvaluatorConfig::default(),
            thread_pool: None,
        }
    }

    /// Applies a configuration.
    ///
    /// # Errors
    /// [`Error::ThreadPool`] if a dedicated pool was requested and could not
    /// be built.
    pub fn with_config(mut self, config: EvaluatorConfig) -> Result<Self> {
        self.thread_pool = match config.num_threads {
            Some(n) if config.parallel => Some(ThreadPoolBuilder::new().num_threads(n).build()?),
            _ => None,
        };
        self.config = config;
        Ok(self)
    }

    /// Active configuration.
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Shared inputs.
    pub fn context(&self) -> EvaluationContext<'a, D> {
        self.ctx
    }

    /// Fitness of every chromosome, in input order.
    ///
    /// # Errors
    /// [`Error::MalformedChromosome`] for the first chromosome (by index)
    /// whose shape does not match the graph and pool.
    pub fn evaluate(&self, chromosomes: &[Chromosome]) -> Result<Vec<Fitness>> {
        let fitness = self.run_batch(chromosomes, |index, chromosome| {
            self.simulate_at(index, chromosome).map(|outcome| outcome.fitness())
        })?;
        debug!(
            batch = fitness.len(),
            infeasible = fitness.iter().filter(|&&f| f == INFEASIBLE).count(),
            "batch evaluated"
        );
        Ok(fitness)
    }

    /// Full outcome of every chromosome, in input order.
    ///
    /// # Errors
    /// Same as [`evaluate`](Self::evaluate).
    pub fn evaluate_outcomes(&self, chromosomes: &[Chromosome]) -> Result<Vec<Outcome>> {
        self.run_batch(chromosomes, |index, chromosome| self.simulate_at(index, chromosome))
    }

    /// Simulates a single chromosome.
    ///
    /// # Errors
    /// [`Error::MalformedChromosome`] with index 0 on a shape mismatch.
    pub fn simulate(&self, chromosome: &Chromosome) -> Result<Outcome> {
        self.simulate_at(0, chromosome)
    }

    /// Fitness of a single order/resource pair without contractor borders.
    ///
    /// # Errors
    /// Same as [`simulate`](Self::simulate).
    pub fn evaluate_one(&self, order: &[usize], resources: &[Vec<WorkerCount>]) -> Result<Fitness> {
        let chromosome = Chromosome::new(order.to_vec(), resources.to_vec());
        self.simulate(&chromosome).map(|outcome| outcome.fitness())
    }

    fn simulate_at(&self, index: usize, chromosome: &Chromosome) -> Result<Outcome> {
        let outcome =
            simulate_with(&self.ctx, chromosome, self.config.horizon, self.config.placement)
                .map_err(|source| Error::MalformedChromosome { index, source })?;
        match &outcome {
            Outcome::Scheduled(schedule) => {
                trace!(index, makespan = schedule.makespan(), "chromosome scheduled");
            }
            Outcome::Infeasible(reason) => {
                debug!(index, %reason, "chromosome infeasible");
            }
        }
        Ok(outcome)
    }

    fn run_batch<T, F>(&self, chromosomes: &[Chromosome], eval: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize, &Chromosome) -> Result<T> + Sync + Send,
    {
        debug!(
            batch = chromosomes.len(),
            parallel = self.config.parallel,
            "evaluating batch"
        );
        if !self.config.parallel {
            return chromosomes
                .iter()
                .enumerate()
                .map(|(index, chromosome)| eval(index, chromosome))
                .collect();
        }

        // Folded in input order: the lowest failing index is reported.
        let run = || {
            chromosomes
                .par_iter()
                .enumerate()
                .map(|(index, chromosome)| eval(index, chromosome))
                .collect::<Vec<Result<T>>>()
        };
        let results = match &self.thread_pool {
            Some(pool) => pool.install(run),
            None => run(),
        };
        results.into_iter().collect()
    }
}

/// Evaluates a batch with the default configuration.
///
/// # Errors
/// Same as [`ChromosomeEvaluator::evaluate`].
pub fn evaluate<D: DurationModel + ?Sized>(
    graph: &TaskGraph,
    pool: &ResourcePool,
    durations: &D,
    chromosomes: &[Chromosome],
) -> Result<Vec<Fitness>> {
    ChromosomeEvaluator::new(graph, pool, durations).evaluate(chromosomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::VolumeDuration;
    use crate::timeline::Placement;
    use crate::validation::ValidationErrorKind;

    fn fixture() -> (TaskGraph, ResourcePool, VolumeDuration) {
        let graph = TaskGraph::with_works_count(
            6,
            vec![vec![], vec![0], vec![1], vec![2], vec![2], vec![4]],
            vec![vec![0], vec![1], vec![2], vec![3], vec![4], vec![5]],
        )
        .unwrap();
        let pool = ResourcePool::new(vec![vec![50; 6]]).unwrap();
        (graph, pool, VolumeDuration::uniform(6, 6, 100.0))
    }

    fn uniform_chromosome(count: WorkerCount) -> Chromosome {
        let mut row = vec![count; 6];
        row.push(0);
        Chromosome::new(vec![0, 1, 2, 3, 4, 5], vec![row; 6])
    }

    #[test]
    fn test_fixture_positive_makespan() {
        let (graph, pool, durations) = fixture();
        let evaluator = ChromosomeEvaluator::new(&graph, &pool, &durations);
        let fitness = evaluator.evaluate(&[uniform_chromosome(49)]).unwrap();
        assert_eq!(fitness, vec![18]);
    }

    #[test]
    fn test_evaluate_one_matches_batch() {
        let (graph, pool, durations) = fixture();
        let evaluator = ChromosomeEvaluator::new(&graph, &pool, &durations);
        let ch = uniform_chromosome(49);
        let single = evaluator.evaluate_one(&ch.order, &ch.resources).unwrap();
        assert_eq!(single, evaluator.evaluate(&[ch]).unwrap()[0]);
    }

    #[test]
    fn test_infeasible_does_not_stop_batch() {
        let (graph, pool, durations) = fixture();
        let batch = vec![uniform_chromosome(10), uniform_chromosome(51), uniform_chromosome(20)];
        let fitness = evaluate(&graph, &pool, &durations, &batch).unwrap();
        assert_eq!(fitness, vec![50, INFEASIBLE, 25]);
    }

    #[test]
    fn test_more_workers_not_slower() {
        let (graph, pool, durations) = fixture();
        let fitness = evaluate(
            &graph,
            &pool,
            &durations,
            &[uniform_chromosome(10), uniform_chromosome(20)],
        )
        .unwrap();
        assert!(fitness[0] > 0);
        assert!(fitness[1] > 0 && fitness[1] <= fitness[0]);
    }

    #[test]
    fn test_malformed_reports_index() {
        let (graph, pool, durations) = fixture();
        let mut bad = uniform_chromosome(10);
        bad.resources[3].pop();
        let batch = vec![uniform_chromosome(10), bad];

        let err = evaluate(&graph, &pool, &durations, &batch).unwrap_err();
        match err {
            Error::MalformedChromosome { index, source } => {
                assert_eq!(index, 1);
                assert_eq!(source.kind, ValidationErrorKind::ResourceShape);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (graph, pool, durations) = fixture();
        let batch: Vec<Chromosome> = (1..=50).map(uniform_chromosome).collect();

        let sequential = ChromosomeEvaluator::new(&graph, &pool, &durations)
            .evaluate(&batch)
            .unwrap();
        let parallel = ChromosomeEvaluator::new(&graph, &pool, &durations)
            .with_config(EvaluatorConfig::default().with_parallel(true))
            .unwrap()
            .evaluate(&batch)
            .unwrap();
        let dedicated = ChromosomeEvaluator::new(&graph, &pool, &durations)
            .with_config(EvaluatorConfig::default().with_threads(3))
            .unwrap()
            .evaluate(&batch)
            .unwrap();

        assert_eq!(sequential, parallel);
        assert_eq!(sequential, dedicated);
    }

    #[test]
    fn test_outcomes_expose_schedules() {
        let (graph, pool, durations) = fixture();
        let evaluator = ChromosomeEvaluator::new(&graph, &pool, &durations);
        let outcomes = evaluator
            .evaluate_outcomes(&[uniform_chromosome(49), uniform_chromosome(51)])
            .unwrap();
        assert_eq!(outcomes[0].schedule().map(|s| s.len()), Some(6));
        assert!(!outcomes[1].is_feasible());
    }

    #[test]
    fn test_horizon_from_config() {
        let (graph, pool, durations) = fixture();
        let evaluator = ChromosomeEvaluator::new(&graph, &pool, &durations)
            .with_config(EvaluatorConfig::default().with_horizon(18))
            .unwrap();
        // Makespan 18 reaches the horizon; 20 workers finish at 25.
        let fitness = evaluator
            .evaluate(&[uniform_chromosome(49), uniform_chromosome(20)])
            .unwrap();
        assert_eq!(fitness, vec![INFEASIBLE, INFEASIBLE]);

        let relaxed = ChromosomeEvaluator::new(&graph, &pool, &durations)
            .with_config(EvaluatorConfig::default().with_horizon(19))
            .unwrap();
        assert_eq!(relaxed.evaluate(&[uniform_chromosome(49)]).unwrap(), vec![18]);
    }

    #[test]
    fn test_placement_from_config() {
        // 0 (10 ticks) → 1 (1 tick), 2 (5 ticks) independent; two workers.
        let graph = TaskGraph::new(vec![vec![], vec![0], vec![]], vec![]).unwrap();
        let pool = ResourcePool::new(vec![vec![2]]).unwrap();
        let durations = VolumeDuration::new(vec![vec![10.0], vec![1.0], vec![5.0]]);
        let batch = [Chromosome::new(vec![0, 1, 2], vec![vec![1, 0]; 3])];

        let jit = ChromosomeEvaluator::new(&graph, &pool, &durations);
        assert_eq!(jit.evaluate(&batch).unwrap(), vec![15]);

        let window = ChromosomeEvaluator::new(&graph, &pool, &durations)
            .with_config(EvaluatorConfig::default().with_placement(Placement::EarliestWindow))
            .unwrap();
        assert_eq!(window.evaluate(&batch).unwrap(), vec![11]);
    }

    #[test]
    fn test_empty_batch() {
        let (graph, pool, durations) = fixture();
        assert!(evaluate(&graph, &pool, &durations, &[]).unwrap().is_empty());
    }
}
