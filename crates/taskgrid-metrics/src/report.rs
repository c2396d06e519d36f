//! Flat report tables handed to the persistence layer.

use serde::Serialize;

use taskgrid_core::TaskId;
use taskgrid_exec::ExecutionRecord;

use crate::summary::{RunSummary, average};

/// Execution time written for failed tasks.
pub const FAILED_EXEC_TIME: f64 = -1.0;

/// One row of the per-task table. Times are seconds; offsets are relative
/// to the earliest start in the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRow {
    pub index: TaskId,
    pub task_name: String,
    pub vm_assigned: String,
    pub start_time: Option<f64>,
    /// [`FAILED_EXEC_TIME`] for failed tasks.
    pub exec_time: f64,
    pub finish_time: f64,
    pub wait_time: f64,
}

/// Flatten records into table rows, normalising offsets so the earliest
/// admitted task starts at zero.
pub fn task_rows(records: &[ExecutionRecord]) -> Vec<TaskRow> {
    let origin = records
        .iter()
        .filter_map(|r| r.start)
        .min()
        .unwrap_or_default();

    records
        .iter()
        .map(|r| TaskRow {
            index: r.task_id,
            task_name: r.task_name.clone(),
            vm_assigned: r.vm.clone(),
            start_time: r.start.map(|s| s.saturating_sub(origin).as_secs_f64()),
            exec_time: r.exec_time().map_or(FAILED_EXEC_TIME, |d| d.as_secs_f64()),
            finish_time: r.finish.saturating_sub(origin).as_secs_f64(),
            wait_time: r.wait.as_secs_f64(),
        })
        .collect()
}

/// One row of the summary table: a policy's metrics averaged over runs.
///
/// Metric columns are empty when no run of the policy completed a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub policy: String,
    /// Runs that contributed to the averages.
    pub runs: usize,
    pub makespan: Option<f64>,
    pub avg_exec: Option<f64>,
    pub avg_wait: Option<f64>,
    pub throughput: Option<f64>,
    pub imbalance: Option<f64>,
    pub resource_util: Option<f64>,
}

impl SummaryRow {
    pub fn new(policy: impl Into<String>, runs: &[RunSummary]) -> Self {
        let avg = average(runs);
        Self {
            policy: policy.into(),
            runs: runs.iter().filter(|r| !r.is_empty()).count(),
            makespan: avg.map(|m| m.makespan),
            avg_exec: avg.map(|m| m.avg_exec),
            avg_wait: avg.map(|m| m.avg_wait),
            throughput: avg.map(|m| m.throughput),
            imbalance: avg.map(|m| m.imbalance),
            resource_util: avg.map(|m| m.resource_util),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use taskgrid_exec::{DispatchFailure, TaskOutcome};

    use crate::summary::RunMetrics;

    fn record(id: u64, start_ms: Option<u64>, finish_ms: u64, outcome: TaskOutcome) -> ExecutionRecord {
        ExecutionRecord {
            task_id: id,
            task_name: format!("task-{id}-{id}"),
            task_index: id,
            vm: "vm1".to_string(),
            start: start_ms.map(Duration::from_millis),
            finish: Duration::from_millis(finish_ms),
            wait: Duration::from_millis(250),
            outcome,
        }
    }

    #[test]
    fn offsets_are_relative_to_earliest_start() {
        let records = vec![
            record(
                0,
                Some(1500),
                2500,
                TaskOutcome::Completed {
                    exec: Duration::from_secs(1),
                },
            ),
            record(1, Some(1000), 1200, TaskOutcome::Failed(DispatchFailure::Status(502))),
        ];
        let rows = task_rows(&records);

        assert_eq!(rows[0].start_time, Some(0.5));
        assert_eq!(rows[0].finish_time, 1.5);
        assert_eq!(rows[0].exec_time, 1.0);
        assert_eq!(rows[0].wait_time, 0.25);

        assert_eq!(rows[1].start_time, Some(0.0));
        assert_eq!(rows[1].exec_time, FAILED_EXEC_TIME);
        assert_eq!(rows[1].task_name, "task-1-1");
    }

    #[test]
    fn unadmitted_tasks_have_no_start() {
        let records = vec![record(
            0,
            None,
            40,
            TaskOutcome::Failed(DispatchFailure::Aborted("panic".into())),
        )];
        let rows = task_rows(&records);
        assert_eq!(rows[0].start_time, None);
        assert_eq!(rows[0].finish_time, 0.04);
    }

    #[test]
    fn summary_row_counts_only_contributing_runs() {
        let m = RunMetrics {
            makespan: 10.0,
            avg_exec: 2.0,
            avg_wait: 1.0,
            throughput: 0.8,
            imbalance: 0.4,
            resource_util: 0.5,
        };
        let runs = vec![RunSummary::Metrics(m), RunSummary::Empty { failed: 8 }];
        let row = SummaryRow::new("SHC", &runs);

        assert_eq!(row.policy, "SHC");
        assert_eq!(row.runs, 1);
        assert_eq!(row.makespan, Some(10.0));
        assert_eq!(row.resource_util, Some(0.5));
    }

    #[test]
    fn summary_row_without_metrics_has_empty_columns() {
        let row = SummaryRow::new("FCFS", &[RunSummary::Empty { failed: 3 }]);
        assert_eq!(row.runs, 0);
        assert_eq!(row.makespan, None);
        assert_eq!(row.imbalance, None);
    }
}
