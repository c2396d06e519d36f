//! taskgrid-scheduler — turns a task batch and a VM pool into an assignment.
//!
//! Every policy implements [`SchedulingPolicy`], so the execution engine
//! never needs to know which one produced an assignment.
//!
//! # Policies
//!
//! ```text
//! SchedulingPolicy
//!   ├── Fcfs          cyclic, one pass, stateless
//!   ├── RoundRobin    same cyclic mapping as Fcfs
//!   ├── HillClimbing  random start + single-move strict improvement
//!   │     └── CostModel (taskgrid-core) scores every candidate
//!   └── external metaheuristics implement the trait directly
//! ```

pub mod baseline;
pub mod cursor;
pub mod error;
pub mod hill_climb;
pub mod policy;

pub use baseline::{Fcfs, RoundRobin};
pub use cursor::CyclicCursor;
pub use error::{SchedulerError, SchedulerResult};
pub use hill_climb::{HillClimbing, Optimized, optimize, random_assignment};
pub use policy::{PolicyKind, SchedulingPolicy};
