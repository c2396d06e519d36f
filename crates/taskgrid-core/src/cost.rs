//! Makespan cost model.
//!
//! Estimates how long an assignment would take without running it. Each
//! VM drains its tasks in parallel across its cores, so its finish time
//! is the summed load divided by `cpu_cores`. The batch finishes when the
//! slowest VM does, making the estimate the maximum per-VM value.
//!
//! This is the one place the formula lives. Optimizers consume it through
//! [`CostModel`] and never re-derive it.

use crate::error::{CoreError, CoreResult};
use crate::pool::{TaskBatch, VmPool};
use crate::types::Assignment;

/// Objective function over assignments. Lower is better.
///
/// Implementations must be pure: no I/O, no randomness, no interior
/// mutability, so independent optimizer runs can share one instance.
pub trait CostModel {
    fn estimate(&self, assignment: &Assignment, tasks: &TaskBatch, vms: &VmPool) -> CoreResult<f64>;
}

/// The default objective: estimated makespan.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakespanModel;

impl CostModel for MakespanModel {
    fn estimate(&self, assignment: &Assignment, tasks: &TaskBatch, vms: &VmPool) -> CoreResult<f64> {
        estimate_makespan(assignment, tasks, vms)
    }
}

impl<F> CostModel for F
where
    F: Fn(&Assignment, &TaskBatch, &VmPool) -> CoreResult<f64>,
{
    fn estimate(&self, assignment: &Assignment, tasks: &TaskBatch, vms: &VmPool) -> CoreResult<f64> {
        self(assignment, tasks, vms)
    }
}

/// Estimated finish time of every VM in pool order.
///
/// Idle VMs report `0.0`. Fails with [`CoreError::InvalidAssignment`] if
/// the assignment references a task or VM that does not exist.
pub fn per_vm_load(
    assignment: &Assignment,
    tasks: &TaskBatch,
    vms: &VmPool,
) -> CoreResult<Vec<(String, f64)>> {
    let mut load = vec![0.0_f64; vms.len()];
    let positions: std::collections::HashMap<&str, usize> = vms
        .iter()
        .enumerate()
        .map(|(i, vm)| (vm.name.as_str(), i))
        .collect();

    for (task_id, vm_name) in assignment.iter() {
        let task = tasks
            .get(task_id)
            .ok_or_else(|| CoreError::InvalidAssignment(format!("unknown task id {task_id}")))?;
        let slot = positions
            .get(vm_name)
            .ok_or_else(|| CoreError::InvalidAssignment(format!("unknown vm {vm_name}")))?;
        load[*slot] += task.cpu_load as f64;
    }

    Ok(vms
        .iter()
        .zip(load)
        .map(|(vm, total)| (vm.name.clone(), total / f64::from(vm.cpu_cores)))
        .collect())
}

/// Estimated makespan: the maximum per-VM finish time.
pub fn estimate_makespan(assignment: &Assignment, tasks: &TaskBatch, vms: &VmPool) -> CoreResult<f64> {
    Ok(per_vm_load(assignment, tasks, vms)?
        .into_iter()
        .map(|(_, t)| t)
        .fold(0.0, f64::max))
}
