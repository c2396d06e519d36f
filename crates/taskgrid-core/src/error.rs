//! Structural errors shared by every taskgrid crate.

use thiserror::Error;

use crate::types::TaskId;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised when inputs are malformed. All of them are fatal and
/// surface before any optimization or dispatch begins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid assignment: {0}")]
    InvalidAssignment(String),

    #[error("task set is empty")]
    EmptyTaskSet,

    #[error("vm pool is empty")]
    EmptyVmPool,

    #[error("duplicate task id: {0}")]
    DuplicateTask(TaskId),

    #[error("duplicate vm name: {0}")]
    DuplicateVm(String),

    #[error("vm {0} has zero cpu cores")]
    NoCores(String),
}
