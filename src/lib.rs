//! Chromosome evaluation for GA-based project scheduling.
//!
//! Turns candidate schedules ("chromosomes") produced by a genetic algorithm
//! into makespans by simulating them on a just-in-time worker timeline. The
//! problem is a multi-mode RCPSP: works with precedence constraints,
//! inseparable chains, and teams of typed workers drawn from contractors with
//! finite capacity.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TaskGraph`, `ResourcePool`, `Schedule`,
//!   `Assignment`, time arithmetic
//! - **`duration`**: Pluggable work duration models
//! - **`timeline`**: Just-in-time timeline and block-by-block simulator
//! - **`ga`**: Chromosome encoding and the batch evaluator
//! - **`validation`**: Input shape checks and an independent schedule checker
//!
//! # Architecture
//!
//! The crate is the fitness function of a GA driver. The driver owns the
//! population and the evolutionary loop. It hands this crate batches of
//! chromosomes and receives one fitness per chromosome, in order. Evaluation
//! is deterministic and holds no state between calls.
//!
//! # Example
//! ```
//! use u_timeline::duration::VolumeDuration;
//! use u_timeline::ga::Chromosome;
//! use u_timeline::models::{ResourcePool, TaskGraph};
//! use u_timeline::INFEASIBLE;
//!
//! let graph = TaskGraph::new(vec![vec![], vec![0], vec![0]], vec![]).unwrap();
//! let pool = ResourcePool::new(vec![vec![10]]).unwrap();
//! let durations = VolumeDuration::uniform(3, 1, 20.0);
//!
//! let fits = Chromosome::new(vec![0, 1, 2], vec![vec![10, 0], vec![5, 0], vec![5, 0]]);
//! let too_big = Chromosome::new(vec![0, 2, 1], vec![vec![11, 0], vec![5, 0], vec![5, 0]]);
//!
//! let fitness = u_timeline::evaluate(&graph, &pool, &durations, &[fits, too_big]).unwrap();
//! assert_eq!(fitness, vec![6, INFEASIBLE]);
//! ```
//!
//! # References
//!
//! - Kolisch & Hartmann (2006), "Experimental investigation of heuristics for
//!   resource-constrained project scheduling: An update"
//! - Hartmann (1998), "A competitive genetic algorithm for
//!   resource-constrained project scheduling"
//! - Brucker et al. (1999), "Resource-constrained project scheduling:
//!   Notation, classification, models, and methods"

pub mod duration;
pub mod error;
pub mod ga;
pub mod models;
pub mod timeline;
pub mod validation;

pub use error::{Error, Result};
pub use ga::{evaluate, Chromosome, ChromosomeEvaluator, EvaluatorConfig};
pub use timeline::{Fitness, Outcome, Placement, INFEASIBLE};
