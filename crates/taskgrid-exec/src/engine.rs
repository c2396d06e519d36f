//! Concurrent execution engine.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use taskgrid_core::{Assignment, CoreError, CoreResult, Task, TaskBatch, Vm, VmPool};

use crate::record::{DispatchFailure, ExecutionRecord, TaskOutcome};
use crate::worker::Worker;

/// Per-call timeout used unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// One record per assigned task, in ascending task id order.
    pub records: Vec<ExecutionRecord>,
    /// From releasing the batch to the last task completing.
    pub wall_clock: Duration,
}

impl BatchOutcome {
    pub fn failed(&self) -> usize {
        self.records.iter().filter(|r| !r.is_success()).count()
    }
}

/// Dispatches assignments through a [`Worker`].
///
/// Holds no per-run state: admission gates are created inside each
/// [`execute`](Self::execute) call and dropped when it returns.
pub struct ExecutionEngine<W> {
    worker: Arc<W>,
    timeout: Duration,
}

impl<W: Worker> ExecutionEngine<W> {
    pub fn new(worker: W) -> Self {
        Self {
            worker: Arc::new(worker),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run every task of `assignment` on its VM and wait for all of them.
    ///
    /// Fails only on structural problems (empty inputs, dangling
    /// references), before anything is dispatched. Per-task failures
    /// become `Failed` records.
    pub async fn execute(
        &self,
        assignment: &Assignment,
        tasks: &TaskBatch,
        vms: &VmPool,
    ) -> CoreResult<BatchOutcome> {
        assignment.validate(tasks, vms)?;

        let gates: HashMap<&str, Arc<Semaphore>> = vms
            .iter()
            .map(|vm| (vm.name.as_str(), Arc::new(Semaphore::new(vm.cpu_cores as usize))))
            .collect();

        // Resolve everything up front so no task is spawned for a batch
        // that would fail halfway through.
        let mut plan = Vec::with_capacity(assignment.len());
        for (task_id, vm_name) in assignment.iter() {
            let task = tasks
                .get(task_id)
                .ok_or_else(|| CoreError::InvalidAssignment(format!("unknown task id {task_id}")))?;
            let vm = vms
                .get(vm_name)
                .ok_or_else(|| CoreError::InvalidAssignment(format!("unknown vm {vm_name}")))?;
            let gate = gates
                .get(vm_name)
                .cloned()
                .ok_or_else(|| CoreError::InvalidAssignment(format!("no gate for vm {vm_name}")))?;
            plan.push((task.clone(), vm.clone(), gate));
        }

        info!(tasks = plan.len(), vms = vms.len(), timeout = ?self.timeout, "dispatching batch");

        let released = Instant::now();
        let units: Vec<_> = plan
            .into_iter()
            .map(|(task, vm, gate)| {
                let handle = tokio::spawn(run_unit(
                    self.worker.clone(),
                    gate,
                    task.clone(),
                    vm.clone(),
                    released,
                    self.timeout,
                ));
                (task, vm.name, handle)
            })
            .collect();

        let mut records = Vec::with_capacity(units.len());
        for (task, vm_name, handle) in units {
            match handle.await {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(task = task.id, vm = %vm_name, error = %e, "unit of work aborted");
                    records.push(ExecutionRecord::aborted(
                        &task,
                        &vm_name,
                        released.elapsed(),
                        e.to_string(),
                    ));
                }
            }
        }
        let wall_clock = released.elapsed();

        let outcome = BatchOutcome {
            records,
            wall_clock,
        };
        info!(
            tasks = outcome.records.len(),
            failed = outcome.failed(),
            wall_clock_secs = wall_clock.as_secs_f64(),
            "batch finished"
        );
        Ok(outcome)
    }
}

/// One task: wait for admission, call the worker, record timings.
async fn run_unit<W: Worker>(
    worker: Arc<W>,
    gate: Arc<Semaphore>,
    task: Task,
    vm: Vm,
    released: Instant,
    timeout: Duration,
) -> ExecutionRecord {
    let wait_start = Instant::now();

    let (start, wait, outcome) = match gate.acquire_owned().await {
        Ok(_permit) => {
            let admitted = Instant::now();
            let wait = admitted.duration_since(wait_start);
            debug!(task = task.id, vm = %vm.name, wait_ms = wait.as_millis() as u64, "task admitted");

            // A failed call's wait runs from queueing until the failure.
            let (wait, outcome) = match tokio::time::timeout(timeout, worker.run(&vm, &task)).await {
                Ok(Ok(())) => (
                    wait,
                    TaskOutcome::Completed {
                        exec: admitted.elapsed(),
                    },
                ),
                Ok(Err(failure)) => (wait_start.elapsed(), TaskOutcome::Failed(failure)),
                Err(_) => (
                    wait_start.elapsed(),
                    TaskOutcome::Failed(DispatchFailure::Timeout(timeout)),
                ),
            };
            (Some(admitted.duration_since(released)), wait, outcome)
        }
        Err(_) => (
            None,
            wait_start.elapsed(),
            TaskOutcome::Failed(DispatchFailure::GateClosed),
        ),
    };

    if let TaskOutcome::Failed(failure) = &outcome {
        warn!(task = task.id, vm = %vm.name, error = %failure, "task failed");
    }

    ExecutionRecord {
        task_id: task.id,
        task_name: task.name,
        task_index: task.index,
        vm: vm.name,
        start,
        finish: released.elapsed(),
        wait,
        outcome,
    }
}
