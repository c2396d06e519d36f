//! Per-run metrics and multi-run averages.
//!
//! Only completed records count. A run where every task failed yields
//! [`RunSummary::Empty`] instead of dividing by zero.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use taskgrid_core::VmPool;
use taskgrid_exec::ExecutionRecord;

/// Summary statistics of one run. Times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunMetrics {
    /// Wall-clock span of the whole batch.
    pub makespan: f64,
    pub avg_exec: f64,
    pub avg_wait: f64,
    /// Completed tasks per second.
    pub throughput: f64,
    /// `(max - min) / mean` of per-VM busy time.
    pub imbalance: f64,
    /// Busy CPU-time over available CPU-time.
    pub resource_util: f64,
}

/// Outcome of summarizing one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RunSummary {
    Metrics(RunMetrics),
    /// No task completed.
    Empty { failed: usize },
}

impl RunSummary {
    pub fn metrics(&self) -> Option<&RunMetrics> {
        match self {
            RunSummary::Metrics(m) => Some(m),
            RunSummary::Empty { .. } => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RunSummary::Empty { .. })
    }
}

/// Reduce one run's records to summary metrics.
///
/// `vms` is the whole pool: every VM's cores count as available capacity,
/// whether or not it completed anything.
pub fn summarize(records: &[ExecutionRecord], vms: &VmPool, wall_clock: Duration) -> RunSummary {
    let completed: Vec<(&ExecutionRecord, f64)> = records
        .iter()
        .filter_map(|r| r.exec_time().map(|exec| (r, exec.as_secs_f64())))
        .collect();

    if completed.is_empty() {
        warn!(records = records.len(), "no task completed; empty run summary");
        return RunSummary::Empty {
            failed: records.len(),
        };
    }

    let span = wall_clock.as_secs_f64();
    let count = completed.len() as f64;

    let avg_exec = completed.iter().map(|(_, exec)| exec).sum::<f64>() / count;
    let avg_wait = completed.iter().map(|(r, _)| r.wait.as_secs_f64()).sum::<f64>() / count;
    let throughput = ratio(count, span);

    let mut per_vm: BTreeMap<&str, f64> = BTreeMap::new();
    for (r, exec) in &completed {
        *per_vm.entry(r.vm.as_str()).or_default() += exec;
    }
    let busy: f64 = per_vm.values().sum();
    let max = per_vm.values().copied().fold(f64::MIN, f64::max);
    let min = per_vm.values().copied().fold(f64::MAX, f64::min);
    let mean = busy / per_vm.len() as f64;
    let imbalance = ratio(max - min, mean);

    let resource_util = ratio(busy, span * vms.total_cores() as f64);

    let metrics = RunMetrics {
        makespan: span,
        avg_exec,
        avg_wait,
        throughput,
        imbalance,
        resource_util,
    };
    debug!(
        completed = completed.len(),
        failed = records.len() - completed.len(),
        ?metrics,
        "run summarized"
    );
    RunSummary::Metrics(metrics)
}

/// Field-by-field mean over the non-empty runs. `None` if there are none.
pub fn average<'a>(runs: impl IntoIterator<Item = &'a RunSummary>) -> Option<RunMetrics> {
    let mut sum = RunMetrics {
        makespan: 0.0,
        avg_exec: 0.0,
        avg_wait: 0.0,
        throughput: 0.0,
        imbalance: 0.0,
        resource_util: 0.0,
    };
    let mut n = 0usize;

    for m in runs.into_iter().filter_map(RunSummary::metrics) {
        sum.makespan += m.makespan;
        sum.avg_exec += m.avg_exec;
        sum.avg_wait += m.avg_wait;
        sum.throughput += m.throughput;
        sum.imbalance += m.imbalance;
        sum.resource_util += m.resource_util;
        n += 1;
    }

    if n == 0 {
        return None;
    }
    let n = n as f64;
    Some(RunMetrics {
        makespan: sum.makespan / n,
        avg_exec: sum.avg_exec / n,
        avg_wait: sum.avg_wait / n,
        throughput: sum.throughput / n,
        imbalance: sum.imbalance / n,
        resource_util: sum.resource_util / n,
    })
}

/// `num / den`, or 0.0 when the denominator is not positive.
fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}
