//! Just-in-time timeline simulation.
//!
//! Decodes a chromosome into a concrete schedule. Blocks (inseparable chains)
//! are committed one at a time in chromosome priority order, subject to
//! precedence, each as early as its worker team allows.
//!
//! # Placement
//!
//! How "as early as the team allows" is decided is a [`Timeline`]:
//!
//! | Placement | Timeline | Gap filling | More capacity never slower |
//! |-----------|----------|-------------|----------------------------|
//! | [`Placement::JustInTime`] (default) | [`JustInTimeTimeline`] | no | yes |
//! | [`Placement::EarliestWindow`] | [`WindowTimeline`] | yes | no |
//!
//! The just-in-time timeline hands workers on in release order and never
//! lends them backwards in time. With more capacity every release time can
//! only move earlier, so makespans never grow. The window timeline places a
//! block in the earliest window where its team fits for the whole block,
//! even before already-committed blocks, and is subject to the usual
//! list-scheduling anomalies.
//!
//! # Submodules
//!
//! - [`jit`]: Release-order worker stacks
//! - [`window`]: Interval usage profiles with earliest-window search
//! - [`simulator`]: Block-by-block decoding and fitness
//!
//! # Reference
//! - Kolisch (1996), "Serial and parallel resource-constrained project
//!   scheduling methods revisited: Theory and computation"
//! - Graham (1969), "Bounds on multiprocessing timing anomalies"

pub mod jit;
pub mod simulator;
pub mod window;

use serde::{Deserialize, Serialize};

use crate::models::{Time, WorkerCount};

pub use jit::JustInTimeTimeline;
pub use simulator::{
    simulate, simulate_with, EvaluationContext, Fitness, Infeasibility, Outcome, INFEASIBLE,
};
pub use window::WindowTimeline;

/// Which timeline places blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Workers are taken in release order and never lent backwards in time.
    #[default]
    JustInTime,
    /// Earliest window where the team fits for the whole block.
    EarliestWindow,
}

/// A worker type whose request exceeds what the contractor can ever supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityShortfall {
    /// Worker type.
    pub worker_type: usize,
    /// Requested count.
    pub requested: WorkerCount,
    /// Effective capacity of the contractor.
    pub capacity: WorkerCount,
}

/// Worker bookkeeping of one simulation run.
///
/// Committed reservations never move. Implementations only decide where
/// the next block fits.
pub trait Timeline {
    /// Effective capacities, `[contractor][worker_type]`.
    fn capacities(&self) -> &[Vec<WorkerCount>];

    /// Earliest start, no earlier than `not_before`, at which the team can
    /// run for `duration`.
    ///
    /// The request must not exceed capacity (see
    /// [`capacity_shortfall`](Self::capacity_shortfall)).
    fn find_start(
        &self,
        contractor: usize,
        workers: &[WorkerCount],
        not_before: Time,
        duration: Time,
    ) -> Time;

    /// Reserves the team over `[start, finish)`.
    fn commit(&mut self, contractor: usize, workers: &[WorkerCount], start: Time, finish: Time);

    /// First worker type whose request exceeds the contractor's capacity.
    ///
    /// Such a request can never be satisfied, no matter how long the work
    /// waits.
    fn capacity_shortfall(
        &self,
        contractor: usize,
        workers: &[WorkerCount],
    ) -> Option<CapacityShortfall> {
        let row = self.capacities().get(contractor).map_or(&[][..], Vec::as_slice);
        workers
            .iter()
            .enumerate()
            .find_map(|(worker_type, &requested)| {
                let capacity = row.get(worker_type).copied().unwrap_or(0);
                (requested > capacity).then_some(CapacityShortfall {
                    worker_type,
                    requested,
                    capacity,
                })
            })
    }
}
