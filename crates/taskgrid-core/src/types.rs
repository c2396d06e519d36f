//! Shared types used across taskgrid crates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::pool::{TaskBatch, VmPool};

/// Unique identifier for a task within a batch.
pub type TaskId = u64;

/// Load units per squared workload index.
pub const LOAD_SCALE: u64 = 10_000;

/// Derive the CPU load of a workload index (`index² × 10000`).
pub fn task_load(index: u64) -> u64 {
    index.saturating_mul(index).saturating_mul(LOAD_SCALE)
}

// ── VM ─────────────────────────────────────────────────────────────

/// A worker machine in the evaluation pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vm {
    /// Unique name within the pool (e.g. "vm1").
    pub name: String,
    /// Host name or IP address the worker listens on.
    pub address: String,
    /// Number of cores; also the admission capacity of the VM.
    pub cpu_cores: u32,
    /// Memory in GiB. Informational only.
    pub ram_gb: u32,
}

impl Vm {
    pub fn new(name: impl Into<String>, address: impl Into<String>, cpu_cores: u32, ram_gb: u32) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            cpu_cores,
            ram_gb,
        }
    }
}

// ── Task ───────────────────────────────────────────────────────────

/// A unit of work to be placed on a VM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    /// Workload index sent to the worker.
    pub index: u64,
    /// Relative CPU cost, monotonically increasing in `index`.
    pub cpu_load: u64,
}

impl Task {
    /// Create a task whose load is derived from its index.
    pub fn new(id: TaskId, name: impl Into<String>, index: u64) -> Self {
        Self {
            id,
            name: name.into(),
            index,
            cpu_load: task_load(index),
        }
    }
}

// ── Assignment ─────────────────────────────────────────────────────

/// Mapping of task id → VM name produced by a scheduling policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    slots: BTreeMap<TaskId, String>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `task` on `vm`, returning the previous VM if any.
    pub fn assign(&mut self, task: TaskId, vm: impl Into<String>) -> Option<String> {
        self.slots.insert(task, vm.into())
    }

    /// VM the task is placed on.
    pub fn vm_for(&self, task: TaskId) -> Option<&str> {
        self.slots.get(&task).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Iterate `(task, vm)` pairs in ascending task id order.
    pub fn iter(&self) -> impl Iterator<Item = (TaskId, &str)> {
        self.slots.iter().map(|(id, vm)| (*id, vm.as_str()))
    }

    /// Task ids placed on `vm`.
    pub fn tasks_on<'a>(&'a self, vm: &'a str) -> impl Iterator<Item = TaskId> + 'a {
        self.slots
            .iter()
            .filter(move |(_, v)| v.as_str() == vm)
            .map(|(id, _)| *id)
    }

    /// Check referential integrity against a task batch and VM pool.
    ///
    /// Every task of the batch must be placed exactly once and every
    /// placement must name a VM of the pool.
    pub fn validate(&self, tasks: &TaskBatch, vms: &VmPool) -> CoreResult<()> {
        tasks.ensure_non_empty()?;
        vms.ensure_non_empty()?;

        for (task, vm) in self.iter() {
            if tasks.get(task).is_none() {
                return Err(CoreError::InvalidAssignment(format!("unknown task id {task}")));
            }
            if !vms.contains(vm) {
                return Err(CoreError::InvalidAssignment(format!(
                    "task {task} placed on unknown vm {vm}"
                )));
            }
        }

        if let Some(missing) = tasks.iter().find(|t| self.vm_for(t.id).is_none()) {
            return Err(CoreError::InvalidAssignment(format!(
                "task {} has no placement",
                missing.id
            )));
        }

        Ok(())
    }
}

impl FromIterator<(TaskId, String)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (TaskId, String)>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}
