//! Crate error type.
//!
//! Structural problems (a malformed graph, pool or chromosome) are errors and
//! abort the call. A chromosome that merely cannot be scheduled is not an
//! error: it is reported as [`Outcome::Infeasible`](crate::timeline::Outcome)
//! and mapped to the failure sentinel.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors returned by graph/pool construction and evaluation calls.
#[derive(Debug, Error)]
pub enum Error {
    /// The task graph failed validation (cycle, dangling reference, bad chain).
    #[error("invalid task graph: {}", join_messages(.0))]
    InvalidGraph(Vec<ValidationError>),

    /// The resource pool is not a rectangular capacity matrix.
    #[error("invalid resource pool: {0}")]
    InvalidPool(ValidationError),

    /// A chromosome does not match the graph or pool dimensions.
    #[error("malformed chromosome #{index}: {source}")]
    MalformedChromosome {
        /// Position of the chromosome in the evaluated batch.
        index: usize,
        #[source]
        source: ValidationError,
    },

    /// The dedicated evaluation thread pool could not be created.
    #[error("failed to build evaluation thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, Error>;

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
