//! taskgrid — evaluate task-to-VM scheduling policies.
//!
//! # Usage
//!
//! ```text
//! taskgrid init
//! taskgrid plan --dataset Dataset/Low-High --policy shc
//! taskgrid run --runs 10 --seed 42
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod output;

#[derive(Parser)]
#[command(
    name = "taskgrid",
    about = "taskgrid — evaluate task-to-VM scheduling policies",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to taskgrid.toml
    #[arg(short, long, global = true, default_value = "taskgrid.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch every configured policy against every dataset and
    /// report metrics averaged over several runs.
    Run {
        /// Override [evaluation].runs
        #[arg(long)]
        runs: Option<u32>,
        /// Override [evaluation].output_dir
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override [search].seed
        #[arg(long)]
        seed: Option<u64>,
        /// Only evaluate the dataset with this name
        #[arg(short, long)]
        dataset: Option<String>,
    },
    /// Compute an assignment and its estimated makespan without
    /// dispatching anything.
    Plan {
        /// Dataset file, one workload index per line
        #[arg(short, long)]
        dataset: PathBuf,
        /// Policy: fcfs, rr, or shc
        #[arg(short, long, default_value = "shc")]
        policy: String,
        /// Override [search].iterations
        #[arg(long)]
        iterations: Option<usize>,
        /// Override [search].seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Write a starter config to the --config path
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))?,
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => commands::init::init(&cli.config, force),
        Commands::Plan {
            dataset,
            policy,
            iterations,
            seed,
        } => {
            let config = taskgrid_core::TaskgridConfig::from_file(&cli.config)?;
            commands::plan::plan(&config, &dataset, &policy, iterations, seed)
        }
        Commands::Run {
            runs,
            output,
            seed,
            dataset,
        } => {
            let config = taskgrid_core::TaskgridConfig::from_file(&cli.config)?;
            let options = commands::run::RunOptions {
                runs,
                output_dir: output,
                seed,
                dataset,
            };
            commands::run::run(&config, options).await
        }
    }
}
