//! Scheduler error types.

use thiserror::Error;

use taskgrid_core::CoreError;

/// Errors that can occur while computing an assignment.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("unknown policy: {0}")]
    UnknownPolicy(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
