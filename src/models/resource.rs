//! Resource pool model.
//!
//! Worker capacity per contractor and worker type. The pool is shared by
//! every chromosome in a batch and never changes during evaluation.
//! Transient usage is tracked by the timeline, not here.

use serde::{Deserialize, Serialize};

use super::WorkerCount;
use crate::error::{Error, Result};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Fixed worker capacities: `capacity[contractor][worker_type]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<WorkerCount>>", into = "Vec<Vec<WorkerCount>>")]
pub struct ResourcePool {
    capacities: Vec<Vec<WorkerCount>>,
    worker_types: usize,
}

impl ResourcePool {
    /// Creates a pool from a capacity matrix (one row per contractor).
    ///
    /// # Errors
    /// [`Error::InvalidPool`] if contractors list different numbers of
    /// worker types.
    pub fn new(capacities: Vec<Vec<WorkerCount>>) -> Result<Self> {
        let worker_types = capacities.first().map_or(0, Vec::len);
        if let Some((idx, row)) = capacities
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != worker_types)
        {
            return Err(Error::InvalidPool(ValidationError::new(
                ValidationErrorKind::ResourceShape,
                format!(
                    "contractor {idx} lists {} worker types, expected {worker_types}",
                    row.len()
                ),
            )));
        }
        Ok(Self {
            capacities,
            worker_types,
        })
    }

    /// Capacity of a contractor for a worker type (0 if out of range).
    pub fn capacity(&self, contractor: usize, worker_type: usize) -> WorkerCount {
        self.capacities
            .get(contractor)
            .and_then(|row| row.get(worker_type))
            .copied()
            .unwrap_or(0)
    }

    /// Capacity row of one contractor.
    pub fn contractor(&self, contractor: usize) -> Option<&[WorkerCount]> {
        self.capacities.get(contractor).map(Vec::as_slice)
    }

    /// Number of contractors.
    pub fn contractor_count(&self) -> usize {
        self.capacities.len()
    }

    /// Number of worker types (same for every contractor).
    pub fn worker_type_count(&self) -> usize {
        self.worker_types
    }

    /// Largest capacity any contractor offers for a worker type.
    pub fn max_capacity(&self, worker_type: usize) -> WorkerCount {
        self.capacities
            .iter()
            .filter_map(|row| row.get(worker_type))
            .copied()
            .max()
            .unwrap_or(0)
    }

    /// The full capacity matrix.
    pub fn capacities(&self) -> &[Vec<WorkerCount>] {
        &self.capacities
    }

    /// Returns a copy with one capacity replaced.
    ///
    /// Out-of-range indices leave the pool unchanged.
    pub fn with_capacity(
        mut self,
        contractor: usize,
        worker_type: usize,
        count: WorkerCount,
    ) -> Self {
        if let Some(slot) = self
            .capacities
            .get_mut(contractor)
            .and_then(|row| row.get_mut(worker_type))
        {
            *slot = count;
        }
        self
    }

    /// Capacities in effect for one chromosome.
    ///
    /// With `borders`, each entry is `min(pool, border)`. Border shape must
    /// already be validated against the pool.
    pub fn effective_capacities(
        &self,
        borders: Option<&[Vec<WorkerCount>]>,
    ) -> Vec<Vec<WorkerCount>> {
        match borders {
            None => self.capacities.clone(),
            Some(borders) => self
                .capacities
                .iter()
                .zip(borders)
                .map(|(row, border)| row.iter().zip(border).map(|(&c, &b)| c.min(b)).collect())
                .collect(),
        }
    }
}

impl TryFrom<Vec<Vec<WorkerCount>>> for ResourcePool {
    type Error = Error;

    fn try_from(capacities: Vec<Vec<WorkerCount>>) -> Result<Self> {
        Self::new(capacities)
    }
}

impl From<ResourcePool> for Vec<Vec<WorkerCount>> {
    fn from(pool: ResourcePool) -> Self {
        pool.capacities
    }
}
