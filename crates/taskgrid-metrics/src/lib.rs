//! taskgrid-metrics — turns execution records into comparable numbers.
//!
//! # Architecture
//!
//! ```text
//! BatchOutcome (taskgrid-exec)
//!   └── summarize() → RunSummary            one run
//!         └── average() → RunMetrics         many runs, one policy
//!
//! Report tables
//!   ├── task_rows()   → Vec<TaskRow>         per-task table
//!   ├── SummaryRow    one row per policy
//!   └── render_summary() → text/plain table
//! ```
//!
//! Nothing here touches the filesystem; writing tables out is the
//! caller's job.

pub mod render;
pub mod report;
pub mod summary;

pub use render::render_summary;
pub use report::{SummaryRow, TaskRow, task_rows};
pub use summary::{RunMetrics, RunSummary, average, summarize};
