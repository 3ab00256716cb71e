//! GA-facing evaluation.
//!
//! The evolutionary loop (selection, crossover, mutation) lives in the GA
//! driver. This module is the fitness side of it: the chromosome encoding
//! and the batch evaluator.
//!
//! # Encoding
//!
//! - **Order**: Permutation of work indices, read as a priority list.
//! - **Resources**: One row per work with worker counts per type, followed
//!   by the supplying contractor.
//! - **Borders** (optional): Per-chromosome contractor capacity caps.
//!
//! # Submodules
//!
//! - [`config`]: Evaluator settings (parallelism, horizon)
//! - [`evaluator`]: Batch fitness evaluation
//!
//! # Reference
//! - Hartmann (1998), "A competitive genetic algorithm for
//!   resource-constrained project scheduling"

mod chromosome;
pub mod config;
pub mod evaluator;

pub use chromosome::{Chromosome, ResourceAssignment};
pub use config::EvaluatorConfig;
pub use evaluator::{evaluate, ChromosomeEvaluator};
pub use crate::timeline::EvaluationContext;
