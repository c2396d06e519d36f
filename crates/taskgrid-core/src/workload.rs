//! Dataset loading.
//!
//! A dataset is a flat text file with one workload index per line. Line
//! `i` becomes task `i`; lines that do not parse as an index are skipped,
//! so task ids may have gaps.

use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use crate::pool::TaskBatch;
use crate::types::{Task, TaskId};

/// Parse dataset contents into tasks, in file order.
pub fn parse_tasks(content: &str) -> Vec<Task> {
    content
        .lines()
        .enumerate()
        .filter_map(|(line_no, line)| match line.trim().parse::<u64>() {
            Ok(index) => {
                let id = line_no as TaskId;
                Some(Task::new(id, format!("task-{index}-{id}"), index))
            }
            Err(_) => {
                debug!(line = line_no, content = line, "skipping unparsable dataset line");
                None
            }
        })
        .collect()
}

/// Load a dataset file into a task batch.
pub fn load_tasks(path: &Path) -> anyhow::Result<TaskBatch> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("dataset {} not found or unreadable", path.display()))?;
    let tasks = parse_tasks(&content);
    info!(path = %path.display(), tasks = tasks.len(), "dataset loaded");
    Ok(TaskBatch::new(tasks)?)
}
