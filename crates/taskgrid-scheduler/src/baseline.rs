//! One-pass baseline policies.
//!
//! Both walk the batch in order and hand each task to the next VM in pool
//! order, wrapping around. Round-robin is kept as a separate name for
//! reporting but maps tasks exactly like FCFS.

use tracing::debug;

use taskgrid_core::{Assignment, TaskBatch, VmPool};

use crate::cursor::CyclicCursor;
use crate::error::SchedulerResult;
use crate::policy::SchedulingPolicy;

/// Task `i` (in batch order) → VM `i mod |pool|` (in pool order).
pub fn cyclic_assignment(tasks: &TaskBatch, vms: &VmPool) -> SchedulerResult<Assignment> {
    tasks.ensure_non_empty()?;
    vms.ensure_non_empty()?;

    let mut cursor = CyclicCursor::new();
    let mut assignment = Assignment::new();
    for task in tasks.iter() {
        if let Some(slot) = cursor.next(vms.len()) {
            assignment.assign(task.id, vms.as_slice()[slot].name.clone());
        }
    }

    debug!(tasks = assignment.len(), vms = vms.len(), "cyclic assignment built");
    Ok(assignment)
}

/// First-come-first-served.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fcfs;

impl SchedulingPolicy for Fcfs {
    fn name(&self) -> &str {
        "FCFS"
    }

    fn schedule(&mut self, tasks: &TaskBatch, vms: &VmPool) -> SchedulerResult<Assignment> {
        cyclic_assignment(tasks, vms)
    }
}

/// Round-robin.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobin;

impl SchedulingPolicy for RoundRobin {
    fn name(&self) -> &str {
        "RR"
    }

    fn schedule(&mut self, tasks: &TaskBatch, vms: &VmPool) -> SchedulerResult<Assignment> {
        cyclic_assignment(tasks, vms)
    }
}
