//! Indexed, read-only views over the VM pool and the task batch.
//!
//! Both keep the caller's ordering (policies such as FCFS depend on it)
//! and add name/id lookup for the cost model and the execution engine.

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::types::{Task, TaskId, Vm};

/// Ordered VM pool with lookup by name.
#[derive(Debug, Clone, Default)]
pub struct VmPool {
    vms: Vec<Vm>,
    by_name: HashMap<String, usize>,
}

impl VmPool {
    /// Build a pool, rejecting duplicate names and VMs without cores.
    ///
    /// An empty pool is allowed here; entry points reject it with
    /// [`CoreError::EmptyVmPool`].
    pub fn new(vms: Vec<Vm>) -> CoreResult<Self> {
        let mut by_name = HashMap::with_capacity(vms.len());
        for (i, vm) in vms.iter().enumerate() {
            if vm.cpu_cores == 0 {
                return Err(CoreError::NoCores(vm.name.clone()));
            }
            if by_name.insert(vm.name.clone(), i).is_some() {
                return Err(CoreError::DuplicateVm(vm.name.clone()));
            }
        }
        Ok(Self { vms, by_name })
    }

    pub fn get(&self, name: &str) -> Option<&Vm> {
        self.by_name.get(name).map(|&i| &self.vms[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vm> {
        self.vms.iter()
    }

    pub fn as_slice(&self) -> &[Vm] {
        &self.vms
    }

    pub fn len(&self) -> usize {
        self.vms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vms.is_empty()
    }

    /// Sum of `cpu_cores` across the pool.
    pub fn total_cores(&self) -> u64 {
        self.vms.iter().map(|vm| u64::from(vm.cpu_cores)).sum()
    }

    pub fn ensure_non_empty(&self) -> CoreResult<()> {
        if self.vms.is_empty() {
            Err(CoreError::EmptyVmPool)
        } else {
            Ok(())
        }
    }
}

/// Ordered task batch with lookup by id.
#[derive(Debug, Clone, Default)]
pub struct TaskBatch {
    tasks: Vec<Task>,
    by_id: HashMap<TaskId, usize>,
}

impl TaskBatch {
    /// Build a batch, rejecting duplicate ids.
    pub fn new(tasks: Vec<Task>) -> CoreResult<Self> {
        let mut by_id = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            if by_id.insert(task.id, i).is_some() {
                return Err(CoreError::DuplicateTask(task.id));
            }
        }
        Ok(Self { tasks, by_id })
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.by_id.get(&id).map(|&i| &self.tasks[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn ensure_non_empty(&self) -> CoreResult<()> {
        if self.tasks.is_empty() {
            Err(CoreError::EmptyTaskSet)
        } else {
            Ok(())
        }
    }
}
