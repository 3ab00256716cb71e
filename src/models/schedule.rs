//! Simulated schedule.
//!
//! The result of simulating one chromosome: a start/finish interval and a
//! worker team for every work unit. Also holds the violation types reported
//! by [`validate_schedule`](crate::validation::validate_schedule).

use serde::{Deserialize, Serialize};

use super::{Time, WorkerCount};

/// A simulated schedule, one assignment per work indexed by work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    assignments: Vec<Assignment>,
}

/// A work's simulated interval `[start, finish)` and its worker team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Work index.
    pub work: usize,
    /// Supplying contractor.
    pub contractor: usize,
    /// Worker counts per type.
    pub workers: Vec<WorkerCount>,
    /// Start time.
    pub start: Time,
    /// Finish time.
    pub finish: Time,
}

/// A feasibility violation found in a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Work the violation was detected on.
    pub work: usize,
    /// Human-readable description.
    pub message: String,
}

/// Classification of schedule violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A work started before one of its parents finished.
    PrecedenceViolation,
    /// Consecutive chain members do not touch.
    InseparableGap,
    /// Concurrent usage exceeds a contractor's capacity.
    CapacityExceeded,
    /// A chain member does not run on the chain head's team.
    ContractorMismatch,
    /// A work has no assignment.
    MissingAssignment,
}

impl Assignment {
    /// Duration (finish - start).
    #[inline]
    pub fn duration(&self) -> Time {
        self.finish - self.start
    }
}

impl Violation {
    /// Creates a violation.
    pub fn new(violation_type: ViolationType, work: usize, message: impl Into<String>) -> Self {
        Self {
            violation_type,
            work,
            message: message.into(),
        }
    }
}

impl Schedule {
    /// Builds a schedule from assignments sorted by work index.
    pub fn from_assignments(mut assignments: Vec<Assignment>) -> Self {
        assignments.sort_by_key(|a| a.work);
        Self { assignments }
    }

    /// Makespan: latest finish across all works (0 when empty).
    pub fn makespan(&self) -> Time {
        self.assignments.iter().map(|a| a.finish).max().unwrap_or(0)
    }

    /// Assignment of a work.
    pub fn assignment(&self, work: usize) -> Option<&Assignment> {
        self.assignments
            .get(work)
            .filter(|a| a.work == work)
            .or_else(|| self.assignments.iter().find(|a| a.work == work))
    }

    /// All assignments, by work index.
    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Number of assignments.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the schedule is empty.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Utilization of one worker type at one contractor:
    /// busy worker-ticks / (capacity × makespan).
    ///
    /// Returns `None` if capacity or makespan is zero.
    pub fn utilization(
        &self,
        contractor: usize,
        worker_type: usize,
        capacity: WorkerCount,
    ) -> Option<f64> {
        let horizon = self.makespan();
        if horizon <= 0 || capacity == 0 {
            return None;
        }
        let busy: i64 = self
            .assignments
            .iter()
            .filter(|a| a.contractor == contractor)
            .map(|a| a.duration() * i64::from(a.workers.get(worker_type).copied().unwrap_or(0)))
            .sum();
        Some(busy as f64 / (horizon as f64 * f64::from(capacity)))
    }
}
