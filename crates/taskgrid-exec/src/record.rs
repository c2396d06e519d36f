//! Per-task execution records.

use std::time::Duration;

use thiserror::Error;

use taskgrid_core::{Task, TaskId};

/// Why a single task did not complete. Recorded, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchFailure {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("worker responded with status {0}")]
    Status(u16),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("admission gate closed")]
    GateClosed,

    #[error("unit of work aborted: {0}")]
    Aborted(String),
}

/// Result of one dispatched task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Completed { exec: Duration },
    Failed(DispatchFailure),
}

/// Timing of one dispatched task. Offsets are measured from the instant
/// the batch was released.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRecord {
    pub task_id: TaskId,
    pub task_name: String,
    pub task_index: u64,
    pub vm: String,
    /// When the task was admitted by its VM's gate. `None` if it never was.
    pub start: Option<Duration>,
    pub finish: Duration,
    /// Time spent waiting for admission.
    pub wait: Duration,
    pub outcome: TaskOutcome,
}

impl ExecutionRecord {
    /// Record for a unit of work that never reported back.
    pub(crate) fn aborted(task: &Task, vm: &str, finish: Duration, reason: String) -> Self {
        Self {
            task_id: task.id,
            task_name: task.name.clone(),
            task_index: task.index,
            vm: vm.to_string(),
            start: None,
            finish,
            wait: Duration::ZERO,
            outcome: TaskOutcome::Failed(DispatchFailure::Aborted(reason)),
        }
    }

    /// Execution duration, or `None` for failed tasks.
    pub fn exec_time(&self) -> Option<Duration> {
        match self.outcome {
            TaskOutcome::Completed { exec } => Some(exec),
            TaskOutcome::Failed(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Completed { .. })
    }

    pub fn failure(&self) -> Option<&DispatchFailure> {
        match &self.outcome {
            TaskOutcome::Failed(f) => Some(f),
            TaskOutcome::Completed { .. } => None,
        }
    }
}
