//! Timeline simulator.
//!
//! # Algorithm
//!
//! 1. Contract each inseparable chain into a block. A block's priority is
//!    the earliest position of any of its members in the chromosome order.
//! 2. Among blocks whose external parents are all committed, commit the one
//!    with the smallest priority. The order does not have to be
//!    topological: a block listed before its parents waits until they are
//!    committed.
//! 3. A block runs on its head's resource row. Its start is the latest of
//!    - the precedence bound: for each member, the latest external parent
//!      finish minus the member's offset within the block,
//!    - the earliest time the [`Timeline`] can host the team for the whole
//!      block (see [`Placement`]).
//! 4. Members run back-to-back from the start. The team is reserved until
//!    the block finishes.
//!
//! A request above the contractor's capacity fails at once. A block that
//! would finish at or beyond the horizon, or never, fails too.
//!
//! # Complexity
//! O(n log n + e + n·p) where n=works, e=precedence edges, p=cost of one
//! timeline search.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use thiserror::Error;
use tracing::trace;

use super::{JustInTimeTimeline, Placement, Timeline, WindowTimeline};
use crate::duration::DurationModel;
use crate::ga::Chromosome;
use crate::models::{
    is_inf, saturating_add, Assignment, ResourcePool, Schedule, TaskGraph, Time, WorkerCount,
};
use crate::validation::{validate_chromosome, ValidationError, ValidationErrorKind};

/// Scalar fitness returned to the GA driver: a makespan or [`INFEASIBLE`].
pub type Fitness = i64;

/// Failure sentinel. Makespans are never negative.
pub const INFEASIBLE: Fitness = -1;

/// Shared read-only inputs of a simulation run.
///
/// Borrowed by every run in a batch, never copied or mutated.
#[derive(Debug)]
pub struct EvaluationContext<'a, D: ?Sized> {
    /// Precedence graph.
    pub graph: &'a TaskGraph,
    /// Worker capacities.
    pub pool: &'a ResourcePool,
    /// Duration model.
    pub durations: &'a D,
}

impl<D: ?Sized> Clone for EvaluationContext<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: ?Sized> Copy for EvaluationContext<'_, D> {}

impl<'a, D: DurationModel + ?Sized> EvaluationContext<'a, D> {
    /// Bundles the shared inputs.
    pub fn new(graph: &'a TaskGraph, pool: &'a ResourcePool, durations: &'a D) -> Self {
        Self {
            graph,
            pool,
            durations,
        }
    }
}

/// Result of simulating one chromosome.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Every work was scheduled.
    Scheduled(Schedule),
    /// The chromosome cannot be scheduled.
    Infeasible(Infeasibility),
}

/// Why a chromosome cannot be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Infeasibility {
    /// A team asks for more workers than the contractor will ever have.
    #[error(
        "work {work} requests {requested} workers of type {worker_type} \
         from contractor {contractor}, capacity is {capacity}"
    )]
    CapacityExceeded {
        /// Chain head whose row carries the request.
        work: usize,
        /// Selected contractor.
        contractor: usize,
        /// Worker type in shortfall.
        worker_type: usize,
        /// Requested count.
        requested: WorkerCount,
        /// Effective capacity.
        capacity: WorkerCount,
    },
    /// A block would finish at or beyond the horizon.
    #[error("block headed by work {work} would finish at {finish}, horizon is {horizon}")]
    HorizonExceeded {
        /// Chain head.
        work: usize,
        /// Saturated finish time.
        finish: Time,
        /// Configured horizon.
        horizon: Time,
    },
}

impl Outcome {
    /// Makespan, or [`INFEASIBLE`].
    pub fn fitness(&self) -> Fitness {
        match self {
            Outcome::Scheduled(schedule) => schedule.makespan(),
            Outcome::Infeasible(_) => INFEASIBLE,
        }
    }

    /// Makespan of a feasible outcome.
    pub fn makespan(&self) -> Option<Time> {
        self.schedule().map(Schedule::makespan)
    }

    /// Simulated schedule of a feasible outcome.
    pub fn schedule(&self) -> Option<&Schedule> {
        match self {
            Outcome::Scheduled(schedule) => Some(schedule),
            Outcome::Infeasible(_) => None,
        }
    }

    /// Whether every work was scheduled.
    pub fn is_feasible(&self) -> bool {
        matches!(self, Outcome::Scheduled(_))
    }
}

/// Simulates one chromosome on the just-in-time timeline.
///
/// # Errors
/// A [`ValidationError`] if the chromosome's shape does not match the graph
/// and pool. Infeasibility is not an error; it is an [`Outcome`].
pub fn simulate<D: DurationModel + ?Sized>(
    ctx: &EvaluationContext<'_, D>,
    chromosome: &Chromosome,
    horizon: Time,
) -> Result<Outcome, ValidationError> {
    simulate_with(ctx, chromosome, horizon, Placement::JustInTime)
}

/// Simulates one chromosome with the given block placement.
///
/// # Errors
/// Same as [`simulate`].
pub fn simulate_with<D: DurationModel + ?Sized>(
    ctx: &EvaluationContext<'_, D>,
    chromosome: &Chromosome,
    horizon: Time,
    placement: Placement,
) -> Result<Outcome, ValidationError> {
    validate_chromosome(ctx.graph, ctx.pool, chromosome)?;

    let capacities = ctx.pool.effective_capacities(chromosome.contractor_borders.as_deref());
    match placement {
        Placement::JustInTime => run(ctx, chromosome, horizon, JustInTimeTimeline::new(capacities)),
        Placement::EarliestWindow => run(ctx, chromosome, horizon, WindowTimeline::new(capacities)),
    }
}

/// Decodes a shape-checked chromosome on `timeline`.
fn run<D: DurationModel + ?Sized, T: Timeline>(
    ctx: &EvaluationContext<'_, D>,
    chromosome: &Chromosome,
    horizon: Time,
    mut timeline: T,
) -> Result<Outcome, ValidationError> {
    let graph = ctx.graph;
    let chain_count = graph.chain_count();

    let mut priority = vec![usize::MAX; chain_count];
    for (pos, &work) in chromosome.order.iter().enumerate() {
        let chain = graph.chain_of(work);
        priority[chain] = priority[chain].min(pos);
    }

    let mut in_degree: Vec<usize> = (0..chain_count).map(|c| graph.block_in_degree(c)).collect();
    let mut ready: BinaryHeap<Reverse<(usize, usize)>> = (0..chain_count)
        .filter(|&c| in_degree[c] == 0)
        .map(|c| Reverse((priority[c], c)))
        .collect();

    let mut finish: Vec<Time> = vec![0; graph.len()];
    let mut assignments = Vec::with_capacity(graph.len());
    let mut durations = Vec::new();

    while let Some(Reverse((_, chain))) = ready.pop() {
        let members = graph.chain(chain);
        let head = members[0];
        let team = chromosome.assignment(head).ok_or_else(|| {
            ValidationError::new(
                ValidationErrorKind::ResourceShape,
                format!("work {head} has no resource row"),
            )
        })?;

        if let Some(shortfall) = timeline.capacity_shortfall(team.contractor, team.workers) {
            return Ok(Outcome::Infeasible(Infeasibility::CapacityExceeded {
                work: head,
                contractor: team.contractor,
                worker_type: shortfall.worker_type,
                requested: shortfall.requested,
                capacity: shortfall.capacity,
            }));
        }

        durations.clear();
        let mut offset: Time = 0;
        let mut precedence_bound: Time = 0;
        for &member in members {
            let parents_done = graph
                .parents(member)
                .iter()
                .filter(|&&p| graph.chain_of(p) != chain)
                .map(|&p| finish[p])
                .max()
                .unwrap_or(0);
            precedence_bound = precedence_bound.max(parents_done - offset);

            let duration = ctx.durations.duration(member, team.workers).max(0);
            durations.push(duration);
            offset = saturating_add(offset, duration);
        }

        let start = timeline.find_start(team.contractor, team.workers, precedence_bound, offset);
        let block_finish = saturating_add(start, offset);
        if is_inf(block_finish) || block_finish >= horizon {
            return Ok(Outcome::Infeasible(Infeasibility::HorizonExceeded {
                work: head,
                finish: block_finish,
                horizon,
            }));
        }

        let mut t = start;
        for (&member, &duration) in members.iter().zip(&durations) {
            finish[member] = t + duration;
            assignments.push(Assignment {
                work: member,
                contractor: team.contractor,
                workers: team.workers.to_vec(),
                start: t,
                finish: t + duration,
            });
            t += duration;
        }
        timeline.commit(team.contractor, team.workers, start, block_finish);
        trace!(chain, head, start, finish = block_finish, "block committed");

        for &next in graph.block_successors(chain) {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse((priority[next], next)));
            }
        }
    }

    Ok(Outcome::Scheduled(Schedule::from_assignments(assignments)))
}
