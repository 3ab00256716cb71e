//! Evaluator configuration.

use serde::{Deserialize, Serialize};

use crate::models::{Time, TIME_INF};
use crate::timeline::Placement;

/// Batch evaluation settings.
///
/// # Example
/// ```
/// use u_timeline::ga::EvaluatorConfig;
///
/// let config = EvaluatorConfig::default()
///     .with_parallel(true)
///     .with_threads(4)
///     .with_horizon(10_000);
/// assert_eq!(config.num_threads, Some(4));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Evaluate chromosomes of a batch concurrently.
    pub parallel: bool,
    /// Size of a dedicated thread pool. `None` uses rayon's global pool.
    pub num_threads: Option<usize>,
    /// A block finishing at or beyond this time makes the chromosome
    /// infeasible.
    pub horizon: Time,
    /// How blocks are placed on the worker timeline.
    pub placement: Placement,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            num_threads: None,
            horizon: TIME_INF,
            placement: Placement::JustInTime,
        }
    }
}

impl EvaluatorConfig {
    /// Enables or disables parallel batch evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Evaluates on a dedicated pool of `n` threads (implies parallel).
    pub fn with_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n.max(1));
        self.parallel = true;
        self
    }

    /// Sets the block placement.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Sets the scheduling horizon.
    pub fn with_horizon(mut self, horizon: Time) -> Self {
        self.horizon = horizon;
        self
    }
}
