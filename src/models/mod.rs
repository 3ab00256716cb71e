//! Evaluation domain models.
//!
//! Provides the data types shared by the timeline simulator and the batch
//! evaluator: the precedence graph, the worker pool, simulated time, and the
//! simulated schedule.
//!
//! # Domain Mappings
//!
//! | u-timeline | Construction | Software | Manufacturing |
//! |------------|--------------|----------|---------------|
//! | Work | Work package | Ticket | Operation |
//! | Inseparable chain | Pour-and-cure sequence | Pairing session | Heat treatment line |
//! | Contractor | Subcontractor | Vendor team | Shop |
//! | Worker type | Trade | Role | Operator skill |

mod graph;
mod resource;
mod schedule;
mod time;

pub use graph::{GraphInput, TaskGraph};
pub(crate) use graph::{block_topological_order, ChainPartition};
pub use resource::ResourcePool;
pub use schedule::{Assignment, Schedule, Violation, ViolationType};
pub use time::{is_inf, saturating_add, Time, WorkerCount, TIME_INF};
