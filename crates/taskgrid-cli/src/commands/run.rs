use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, warn};

use taskgrid_core::config::DatasetConfig;
use taskgrid_core::workload::load_tasks;
use taskgrid_core::{Assignment, TaskBatch, TaskgridConfig, VmPool};
use taskgrid_exec::{ExecutionEngine, HttpWorker};
use taskgrid_metrics::{RunSummary, SummaryRow, render_summary, summarize, task_rows};
use taskgrid_scheduler::{PolicyKind, SchedulingPolicy};

use crate::output::write_rows;

/// Command-line overrides for `[evaluation]` and `[search]`.
#[derive(Debug, Default)]
pub struct RunOptions {
    pub runs: Option<u32>,
    pub output_dir: Option<PathBuf>,
    pub seed: Option<u64>,
    pub dataset: Option<String>,
}

/// Settings for one evaluation after overrides are applied.
struct Evaluation<'a> {
    policies: Vec<PolicyKind>,
    runs: u32,
    iterations: usize,
    seed: Option<u64>,
    output_dir: &'a Path,
}

pub async fn run(config: &TaskgridConfig, options: RunOptions) -> anyhow::Result<()> {
    let pool = config.vm_pool()?;
    let engine = ExecutionEngine::new(HttpWorker::new(config.dispatch.port))
        .with_timeout(config.dispatch.timeout_duration()?);

    let policies = config
        .evaluation
        .policies
        .iter()
        .map(|p| p.parse::<PolicyKind>())
        .collect::<Result<Vec<_>, _>>()?;
    if policies.is_empty() {
        anyhow::bail!("no policies configured in [evaluation].policies");
    }

    let runs = options.runs.unwrap_or(config.evaluation.runs);
    if runs == 0 {
        anyhow::bail!("runs must be at least 1");
    }

    let output_dir = options
        .output_dir
        .unwrap_or_else(|| config.evaluation.output_dir.clone());
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let datasets: Vec<&DatasetConfig> = config
        .datasets
        .iter()
        .filter(|d| options.dataset.as_ref().is_none_or(|only| &d.name == only))
        .collect();
    if datasets.is_empty() {
        match &options.dataset {
            Some(name) => anyhow::bail!("dataset {name} is not configured"),
            None => anyhow::bail!("no datasets configured"),
        }
    }

    let evaluation = Evaluation {
        policies,
        runs,
        iterations: config.search.iterations,
        seed: options.seed.or(config.search.seed),
        output_dir: &output_dir,
    };

    for dataset in datasets {
        let tasks = load_tasks(&dataset.path)?;
        let rows = evaluate_dataset(&engine, &evaluation, &dataset.name, &tasks, &pool).await?;

        println!("\n{}", dataset.name);
        print!("{}", render_summary(&rows));

        let summary_path = output_dir.join(format!("Summary_{}.csv", dataset.name));
        write_rows(&summary_path, &rows)?;
        println!("✓ Wrote {}", summary_path.display());
    }

    Ok(())
}

/// Run every policy `runs` times against one dataset and average the results.
async fn evaluate_dataset<W: taskgrid_exec::Worker>(
    engine: &ExecutionEngine<W>,
    evaluation: &Evaluation<'_>,
    dataset: &str,
    tasks: &TaskBatch,
    pool: &VmPool,
) -> anyhow::Result<Vec<SummaryRow>> {
    let mut history: BTreeMap<usize, Vec<RunSummary>> = BTreeMap::new();

    for round in 1..=evaluation.runs {
        info!(dataset, round, runs = evaluation.runs, "starting round");

        // All assignments are computed before anything is dispatched.
        let mut planned: Vec<(usize, &'static str, Assignment)> = Vec::new();
        for (slot, kind) in evaluation.policies.iter().enumerate() {
            let seed = evaluation.seed.map(|s| s.wrapping_add(u64::from(round)));
            let mut policy = kind.build(evaluation.iterations, seed);
            let assignment = policy.schedule(tasks, pool)?;
            planned.push((slot, kind.label(), assignment));
        }

        for (slot, label, assignment) in planned {
            let outcome = engine.execute(&assignment, tasks, pool).await?;
            if outcome.failed() > 0 {
                warn!(
                    dataset,
                    round,
                    policy = label,
                    failed = outcome.failed(),
                    total = outcome.records.len(),
                    "run finished with failed tasks"
                );
            }

            let path = evaluation
                .output_dir
                .join(format!("{label}_{dataset}_run{round}.csv"));
            write_rows(&path, &task_rows(&outcome.records))?;

            let summary = summarize(&outcome.records, pool, outcome.wall_clock);
            if let Some(m) = summary.metrics() {
                info!(
                    dataset,
                    round,
                    policy = label,
                    makespan = m.makespan,
                    imbalance = m.imbalance,
                    "run summarized"
                );
            }
            history.entry(slot).or_default().push(summary);
        }
    }

    Ok(evaluation
        .policies
        .iter()
        .enumerate()
        .map(|(slot, kind)| {
            SummaryRow::new(
                kind.label(),
                history.get(&slot).map(Vec::as_slice).unwrap_or_default(),
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::extract::{Path as UrlPath, State};
    use axum::http::StatusCode;
    use axum::routing::get;
    use taskgrid_core::config::VmConfig;
    use tokio::net::TcpListener;

    type Seen = Arc<Mutex<Vec<u64>>>;

    async fn handle(State(seen): State<Seen>, UrlPath(index): UrlPath<u64>) -> StatusCode {
        seen.lock().unwrap().push(index);
        if index == 13 {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::OK
        }
    }

    async fn start_worker() -> (u16, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/task/{index}", get(handle))
            .with_state(seen.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (port, seen)
    }

    fn local_config(port: u16, dir: &Path) -> TaskgridConfig {
        let mut config = TaskgridConfig::scaffold();
        config.dispatch.port = port;
        config.dispatch.timeout = "5s".to_string();
        config.search.iterations = 50;
        config.search.seed = Some(9);
        config.evaluation.runs = 2;
        config.evaluation.output_dir = dir.join("Result");
        config.vms = vec![
            VmConfig {
                name: "vm1".to_string(),
                address: Some("127.0.0.1".to_string()),
                address_env: None,
                cpu_cores: 1,
                ram_gb: 1,
            },
            VmConfig {
                name: "vm2".to_string(),
                address: Some("127.0.0.1".to_string()),
                address_env: None,
                cpu_cores: 2,
                ram_gb: 2,
            },
        ];
        let dataset = dir.join("Low-High");
        std::fs::write(&dataset, "1\n2\n13\n4\n").unwrap();
        config.datasets[0].path = dataset;
        config
    }

    #[tokio::test]
    async fn writes_per_run_and_summary_tables() {
        let (port, seen) = start_worker().await;
        let dir = tempfile::tempdir().unwrap();
        let config = local_config(port, dir.path());

        run(&config, RunOptions::default()).await.unwrap();

        let out = dir.path().join("Result");
        for policy in ["FCFS", "RR", "SHC"] {
            for round in 1..=2 {
                let path = out.join(format!("{policy}_Low-High_run{round}.csv"));
                let content = std::fs::read_to_string(&path).unwrap();
                // header + one row per task
                assert_eq!(content.lines().count(), 5, "{}", path.display());
                assert!(content.contains(",-1.0,"), "task 13 should be recorded as failed");
            }
        }

        let summary = std::fs::read_to_string(out.join("Summary_Low-High.csv")).unwrap();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("FCFS,2,"));
        assert!(lines[2].starts_with("RR,2,"));
        assert!(lines[3].starts_with("SHC,2,"));

        // 3 policies x 2 rounds x 4 tasks
        assert_eq!(seen.lock().unwrap().len(), 24);
    }

    #[tokio::test]
    async fn command_line_overrides_apply() {
        let (port, seen) = start_worker().await;
        let dir = tempfile::tempdir().unwrap();
        let mut config = local_config(port, dir.path());
        config.evaluation.policies = vec!["fcfs".to_string()];

        let options = RunOptions {
            runs: Some(1),
            output_dir: Some(dir.path().join("elsewhere")),
            seed: None,
            dataset: Some("Low-High".to_string()),
        };
        run(&config, options).await.unwrap();

        assert!(dir.path().join("elsewhere/FCFS_Low-High_run1.csv").exists());
        assert!(!dir.path().join("elsewhere/FCFS_Low-High_run2.csv").exists());
        assert!(!dir.path().join("Result").exists());
        assert_eq!(seen.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn rejects_bad_settings() {
        let dir = tempfile::tempdir().unwrap();

        let mut config = local_config(1, dir.path());
        config.evaluation.policies = vec!["sma".to_string()];
        assert!(run(&config, RunOptions::default()).await.is_err());

        let config = local_config(1, dir.path());
        let options = RunOptions {
            runs: Some(0),
            ..Default::default()
        };
        assert!(run(&config, options).await.is_err());

        let options = RunOptions {
            dataset: Some("Missing".to_string()),
            ..Default::default()
        };
        assert!(run(&config, options).await.is_err());
    }
}
