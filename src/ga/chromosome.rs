//! Order/resource chromosome.
//!
//! # Encoding
//!
//! A chromosome consists of:
//! - **Order**: permutation of work indices. It is a priority list and need
//!   not be topological. The simulator enforces precedence itself.
//! - **Resources**: one row per work. The first `worker_type_count` entries
//!   are worker counts per type. The trailing entry is the index of the
//!   contractor that supplies them.
//! - **Contractor borders** (optional): a per-chromosome capacity matrix
//!   with the pool's shape, capping what each contractor may supply.
//!
//! Chromosomes are produced by the GA driver. The evaluator only reads them.

use serde::{Deserialize, Serialize};

use crate::models::WorkerCount;

/// Candidate schedule encoding evaluated by the timeline simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chromosome {
    /// Work indices in priority order.
    pub order: Vec<usize>,
    /// Per-work rows: worker counts per type, then the contractor index.
    pub resources: Vec<Vec<WorkerCount>>,
    /// Optional per-contractor capacity caps for this chromosome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contractor_borders: Option<Vec<Vec<WorkerCount>>>,
}

/// Worker team requested by one resource row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceAssignment<'a> {
    /// Worker counts per type.
    pub workers: &'a [WorkerCount],
    /// Supplying contractor.
    pub contractor: usize,
}

impl Chromosome {
    /// Creates a chromosome without contractor borders.
    pub fn new(order: Vec<usize>, resources: Vec<Vec<WorkerCount>>) -> Self {
        Self {
            order,
            resources,
            contractor_borders: None,
        }
    }

    /// Sets per-contractor capacity caps.
    pub fn with_contractor_borders(mut self, borders: Vec<Vec<WorkerCount>>) -> Self {
        self.contractor_borders = Some(borders);
        self
    }

    /// Decodes the resource row of a work.
    ///
    /// Returns `None` if the work has no row or the row is empty.
    pub fn assignment(&self, work: usize) -> Option<ResourceAssignment<'_>> {
        let row = self.resources.get(work)?;
        let (&contractor, workers) = row.split_last()?;
        Some(ResourceAssignment {
            workers,
            contractor: contractor as usize,
        })
    }

    /// Number of works in the order.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the order is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl ResourceAssignment<'_> {
    /// Total number of workers in the team.
    pub fn team_size(&self) -> u64 {
        self.workers.iter().map(|&c| u64::from(c)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_decodes_trailing_contractor() {
        let ch = Chromosome::new(vec![1, 0], vec![vec![3, 4, 1], vec![0, 2, 0]]);
        let a = ch.assignment(0).unwrap();
        assert_eq!(a.workers, &[3, 4]);
        assert_eq!(a.contractor, 1);
        assert_eq!(a.team_size(), 7);

        let b = ch.assignment(1).unwrap();
        assert_eq!(b.workers, &[0, 2]);
        assert_eq!(b.contractor, 0);
        assert_eq!(ch.len(), 2);
    }

    #[test]
    fn test_assignment_missing_row() {
        let ch = Chromosome::new(vec![0, 1], vec![vec![]]);
        assert!(ch.assignment(0).is_none());
        assert!(ch.assignment(1).is_none());
    }

    #[test]
    fn test_serde_borders_optional() {
        let ch: Chromosome =
            serde_json::from_str(r#"{"order": [0], "resources": [[49, 0]]}"#).unwrap();
        assert!(ch.contractor_borders.is_none());
        assert!(!ch.is_empty());

        let with_borders = ch.clone().with_contractor_borders(vec![vec![20]]);
        let json = serde_json::to_value(&with_borders).unwrap();
        assert_eq!(json["contractor_borders"], serde_json::json!([[20]]));
        assert!(serde_json::to_value(&ch).unwrap().get("contractor_borders").is_none());
    }
}
