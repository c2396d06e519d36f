//! taskgrid-exec — dispatches an assignment against live workers.
//!
//! Every task becomes its own tokio task the moment a run starts. Per-VM
//! semaphores sized to `cpu_cores` are the only admission control; a task
//! waits at its VM's gate, then issues one remote call under a fixed
//! timeout. Failures are folded into the task's record and never abort
//! the batch.
//!
//! # Architecture
//!
//! ```text
//! ExecutionEngine::execute()
//!   ├── Assignment::validate()            fail fast, before dispatch
//!   ├── Semaphore per VM (cpu_cores)      built per run, dropped after
//!   ├── tokio::spawn per task
//!   │   ├── acquire permit                wait time
//!   │   ├── Worker::run() under timeout   exec time
//!   │   └── ExecutionRecord               Completed | Failed
//!   └── join all → BatchOutcome { records, wall_clock }
//! ```
//!
//! No retries and no batch-level deadline: a hung call is bounded only by
//! its own timeout.

pub mod engine;
pub mod record;
pub mod worker;

pub use engine::{BatchOutcome, DEFAULT_TIMEOUT, ExecutionEngine};
pub use record::{DispatchFailure, ExecutionRecord, TaskOutcome};
pub use worker::{HttpWorker, Worker};
