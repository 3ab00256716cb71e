//! Input and schedule validation.
//!
//! Three layers of checks:
//! - **Graph**: dangling parent or chain references, duplicate chain
//!   membership, empty chains, precedence cycles (chains contracted).
//! - **Chromosome**: order and resource-matrix shape against a graph and
//!   pool. A failure here is an input-shape error for the evaluation call.
//! - **Schedule**: an independent feasibility check of a simulated schedule
//!   (precedence, inseparability, team consistency, capacity).
//!
//! # Reference
//! Kahn (1962), "Topological sorting of large networks"

use std::collections::HashSet;

use thiserror::Error;

use crate::ga::Chromosome;
use crate::models::{
    block_topological_order, Assignment, ChainPartition, ResourcePool, Schedule, TaskGraph, Time,
    Violation, ViolationType, WorkerCount,
};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A parent index does not name a work.
    InvalidParent,
    /// Precedence (including chain order) contains a cycle.
    CyclicDependency,
    /// A chain member does not name a work.
    InvalidChainMember,
    /// A work appears in more than one chain slot.
    DuplicateChainMember,
    /// An inseparable chain has no members.
    EmptyChain,
    /// The parent lists disagree with the declared work count.
    WorksCountMismatch,
    /// Chromosome order length differs from the work count.
    OrderLengthMismatch,
    /// Chromosome order is not a permutation of the works.
    InvalidOrder,
    /// A resource row or capacity matrix has the wrong dimensions.
    ResourceShape,
    /// A resource row selects a contractor outside the pool.
    UnknownContractor,
    /// Contractor borders do not match the pool's shape.
    BorderShape,
}

impl ValidationError {
    /// Creates an error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a precedence relation and its inseparable-chain partition.
///
/// Checks:
/// 1. Every parent index names a work, and no work is its own parent
/// 2. Every chain is non-empty and its members name works
/// 3. No work appears twice across chains
/// 4. The block graph (chains contracted, chain order as edges) is acyclic
///
/// Cycle detection only runs when 1-3 pass.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_graph(parents: &[Vec<usize>], inseparables: &[Vec<usize>]) -> ValidationResult {
    let works_count = parents.len();
    let mut errors = Vec::new();

    for (work, ps) in parents.iter().enumerate() {
        for &p in ps {
            if p >= works_count {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidParent,
                    format!("work {work} references unknown parent {p}"),
                ));
            } else if p == work {
                errors.push(ValidationError::new(
                    ValidationErrorKind::CyclicDependency,
                    format!("work {work} depends on itself"),
                ));
            }
        }
    }

    let mut grouped = HashSet::new();
    for (idx, chain) in inseparables.iter().enumerate() {
        if chain.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyChain,
                format!("inseparable chain {idx} is empty"),
            ));
        }
        for &member in chain {
            if member >= works_count {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidChainMember,
                    format!("inseparable chain {idx} references unknown work {member}"),
                ));
            } else if !grouped.insert(member) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateChainMember,
                    format!("work {member} appears in more than one chain slot"),
                ));
            }
        }
    }

    if errors.is_empty() {
        if let Some(cycle_err) = detect_cycles(parents, inseparables) {
            errors.push(cycle_err);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects cycles in the block graph.
///
/// # Algorithm
/// Contract each chain to one node, then run Kahn's algorithm. Blocks left
/// unprocessed lie on or behind a cycle. A parent placed at or after its
/// child inside the same chain is a cycle with the chain order.
fn detect_cycles(parents: &[Vec<usize>], inseparables: &[Vec<usize>]) -> Option<ValidationError> {
    let partition = ChainPartition::new(parents.len(), inseparables);

    let edges = match partition.block_edges(parents) {
        Ok(edges) => edges,
        Err(work) => {
            return Some(ValidationError::new(
                ValidationErrorKind::CyclicDependency,
                format!("work {work} depends on a later member of its own inseparable chain"),
            ))
        }
    };

    let order = block_topological_order(partition.chains.len(), &edges);
    if order.len() == partition.chains.len() {
        return None;
    }

    let mut processed = vec![false; partition.chains.len()];
    for &block in &order {
        processed[block] = true;
    }
    let stuck = processed.iter().position(|&done| !done)?;
    Some(ValidationError::new(
        ValidationErrorKind::CyclicDependency,
        format!(
            "circular dependency detected involving work {}",
            partition.chains[stuck][0]
        ),
    ))
}

/// Validates a chromosome's shape against a graph and pool.
///
/// Checks:
/// 1. The order has one entry per work and is a permutation
/// 2. There is one resource row per work
/// 3. Each row has `worker_type_count + 1` entries
/// 4. Each row's contractor index names a contractor
/// 5. Contractor borders, if present, have the pool's shape
pub fn validate_chromosome(
    graph: &TaskGraph,
    pool: &ResourcePool,
    chromosome: &Chromosome,
) -> Result<(), ValidationError> {
    let works_count = graph.len();

    if chromosome.order.len() != works_count {
        return Err(ValidationError::new(
            ValidationErrorKind::OrderLengthMismatch,
            format!(
                "order has {} entries, graph has {works_count} works",
                chromosome.order.len()
            ),
        ));
    }

    let mut seen = vec![false; works_count];
    for &work in &chromosome.order {
        if work >= works_count {
            return Err(ValidationError::new(
                ValidationErrorKind::InvalidOrder,
                format!("order references unknown work {work}"),
            ));
        }
        if std::mem::replace(&mut seen[work], true) {
            return Err(ValidationError::new(
                ValidationErrorKind::InvalidOrder,
                format!("order lists work {work} more than once"),
            ));
        }
    }

    if chromosome.resources.len() != works_count {
        return Err(ValidationError::new(
            ValidationErrorKind::ResourceShape,
            format!(
                "resource matrix has {} rows, graph has {works_count} works",
                chromosome.resources.len()
            ),
        ));
    }

    let row_width = pool.worker_type_count() + 1;
    for (work, row) in chromosome.resources.iter().enumerate() {
        if row.len() != row_width {
            return Err(ValidationError::new(
                ValidationErrorKind::ResourceShape,
                format!(
                    "resource row of work {work} has {} entries, expected {row_width}",
                    row.len()
                ),
            ));
        }
        let contractor = row[row_width - 1] as usize;
        if contractor >= pool.contractor_count() {
            return Err(ValidationError::new(
                ValidationErrorKind::UnknownContractor,
                format!(
                    "work {work} selects contractor {contractor}, pool has {}",
                    pool.contractor_count()
                ),
            ));
        }
    }

    if let Some(borders) = &chromosome.contractor_borders {
        let shape_ok = borders.len() == pool.contractor_count()
            && borders.iter().all(|row| row.len() == pool.worker_type_count());
        if !shape_ok {
            return Err(ValidationError::new(
                ValidationErrorKind::BorderShape,
                format!(
                    "contractor borders must be {}×{}",
                    pool.contractor_count(),
                    pool.worker_type_count()
                ),
            ));
        }
    }

    Ok(())
}

/// Checks a simulated schedule against every feasibility invariant.
///
/// Checks:
/// 1. Every work has an assignment
/// 2. Precedence: start ≥ finish of every parent
/// 3. Inseparability: consecutive chain members touch (next start = previous finish)
/// 4. Every chain member runs on the chain head's row (contractor and team)
/// 5. Capacity: at no instant does concurrent usage exceed the effective
///    capacity of a contractor for a worker type
///
/// The chromosome must already pass [`validate_chromosome`].
pub fn validate_schedule(
    graph: &TaskGraph,
    pool: &ResourcePool,
    chromosome: &Chromosome,
    schedule: &Schedule,
) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    let slots: Vec<Option<&Assignment>> =
        (0..graph.len()).map(|w| schedule.assignment(w)).collect();
    let missing: Vec<Violation> = slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.is_none())
        .map(|(w, _)| {
            let message = format!("work {w} was not scheduled");
            Violation::new(ViolationType::MissingAssignment, w, message)
        })
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }
    let slots: Vec<&Assignment> = slots.into_iter().flatten().collect();
    let at = |w: usize| slots[w];

    for work in 0..graph.len() {
        let start = at(work).start;
        for &p in graph.parents(work) {
            if start < at(p).finish {
                violations.push(Violation::new(
                    ViolationType::PrecedenceViolation,
                    work,
                    format!(
                        "work {work} starts at {start} before parent {p} finishes at {}",
                        at(p).finish
                    ),
                ));
            }
        }
    }

    for chain in graph.chains() {
        let head_row = chromosome.assignment(chain[0]);
        for &member in chain {
            let a = at(member);
            let matches_head = head_row.is_some_and(|row| {
                row.contractor == a.contractor && row.workers == a.workers.as_slice()
            });
            if !matches_head {
                violations.push(Violation::new(
                    ViolationType::ContractorMismatch,
                    member,
                    format!("work {member} does not run on the team of chain head {}", chain[0]),
                ));
            }
        }
        for pair in chain.windows(2) {
            let (prev, next) = (at(pair[0]), at(pair[1]));
            if next.start != prev.finish {
                violations.push(Violation::new(
                    ViolationType::InseparableGap,
                    pair[1],
                    format!(
                        "work {} starts at {} but chain predecessor {} finishes at {}",
                        pair[1], next.start, pair[0], prev.finish
                    ),
                ));
            }
        }
    }

    let capacities = pool.effective_capacities(chromosome.contractor_borders.as_deref());
    for (contractor, row) in capacities.iter().enumerate() {
        for (worker_type, &capacity) in row.iter().enumerate() {
            if let Some(work) = first_overload(schedule, contractor, worker_type, capacity) {
                violations.push(Violation::new(
                    ViolationType::CapacityExceeded,
                    work,
                    format!(
                        "contractor {contractor} worker type {worker_type} exceeds \
                         capacity {capacity} when work {work} starts"
                    ),
                ));
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Sweeps start/finish events of one contractor and worker type.
///
/// Returns the work whose start first pushes usage above `capacity`.
/// Releases at an instant are applied before acquisitions, and zero-length
/// intervals occupy no instant.
fn first_overload(
    schedule: &Schedule,
    contractor: usize,
    worker_type: usize,
    capacity: WorkerCount,
) -> Option<usize> {
    // (time, delta, work); negative deltas sort first at equal times.
    let mut events: Vec<(Time, i64, usize)> = Vec::new();
    for a in schedule.assignments() {
        let count = a.workers.get(worker_type).copied().unwrap_or(0);
        if a.contractor != contractor || count == 0 || a.finish <= a.start {
            continue;
        }
        events.push((a.start, i64::from(count), a.work));
        events.push((a.finish, -i64::from(count), a.work));
    }
    events.sort_unstable();

    let mut in_use: i64 = 0;
    for (_, delta, work) in events {
        in_use += delta;
        if in_use > i64::from(capacity) {
            return Some(work);
        }
    }
    None
}
