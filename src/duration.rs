//! Work duration models.
//!
//! The simulator treats duration as a pure function of a work and the worker
//! team assigned to it. The cost model is supplied by the caller, so the
//! simulator never depends on how work volumes or productivity are encoded.
//!
//! # Built-in model
//!
//! [`VolumeDuration`] assigns each work a volume per worker type. The time
//! needed for one type is `ceil(volume / workers)`. The work's duration is
//! the slowest type. Each extra worker saves less time than the previous one.

use serde::{Deserialize, Serialize};

use crate::models::{Time, WorkerCount, TIME_INF};

/// Duration of a work under a given worker team.
///
/// Implementations must be pure and deterministic. The evaluator may call
/// them concurrently from several threads.
pub trait DurationModel: Send + Sync {
    /// Duration of `work` when run by `workers` (counts per worker type).
    fn duration(&self, work: usize, workers: &[WorkerCount]) -> Time;
}

impl<F> DurationModel for F
where
    F: Fn(usize, &[WorkerCount]) -> Time + Send + Sync,
{
    fn duration(&self, work: usize, workers: &[WorkerCount]) -> Time {
        self(work, workers)
    }
}

/// Volume-based duration: `max over types of ceil(volume / workers)`.
///
/// A type with positive volume and no assigned workers can never finish
/// ([`TIME_INF`]). Types with zero volume do not constrain the duration.
/// A NaN volume cannot be worked off either and also yields [`TIME_INF`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeDuration {
    volumes: Vec<Vec<f64>>,
}

impl VolumeDuration {
    /// Creates a model from `volumes[work][worker_type]`.
    pub fn new(volumes: Vec<Vec<f64>>) -> Self {
        Self { volumes }
    }

    /// Every work needs `volume` of every worker type.
    pub fn uniform(works: usize, worker_types: usize, volume: f64) -> Self {
        Self::new(vec![vec![volume; worker_types]; works])
    }

    /// Volume row of a work (empty if unknown).
    pub fn volumes(&self, work: usize) -> &[f64] {
        self.volumes.get(work).map_or(&[], Vec::as_slice)
    }
}

impl DurationModel for VolumeDuration {
    fn duration(&self, work: usize, workers: &[WorkerCount]) -> Time {
        let mut longest: Time = 0;
        for (worker_type, &volume) in self.volumes(work).iter().enumerate() {
            if volume.is_nan() {
                return TIME_INF;
            }
            if volume <= 0.0 {
                continue;
            }
            let count = workers.get(worker_type).copied().unwrap_or(0);
            if count == 0 {
                return TIME_INF;
            }
            let ticks = (volume / f64::from(count)).ceil();
            let ticks = if ticks >= TIME_INF as f64 { TIME_INF } else { ticks as Time };
            longest = longest.max(ticks);
        }
        longest
    }
}
