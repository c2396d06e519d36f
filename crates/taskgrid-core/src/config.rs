//! taskgrid.toml configuration parser.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::pool::VmPool;
use crate::types::Vm;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskgridConfig {
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub vms: Vec<VmConfig>,
    #[serde(default)]
    pub datasets: Vec<DatasetConfig>,
}

/// How tasks reach the workers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-call timeout, e.g. "300s", "500ms", "5m".
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            timeout: default_timeout(),
        }
    }
}

impl DispatchConfig {
    pub fn timeout_duration(&self) -> anyhow::Result<Duration> {
        parse_duration(&self.timeout)
            .with_context(|| format!("invalid dispatch timeout {:?}", self.timeout))
    }
}

/// Hill-climbing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Fixed seed for reproducible runs. Drawn from entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    #[serde(default = "default_runs")]
    pub runs: u32,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Policy names to evaluate, in report order.
    #[serde(default = "default_policies")]
    pub policies: Vec<String>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            runs: default_runs(),
            output_dir: default_output_dir(),
            policies: default_policies(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Environment variable holding the address, used when `address` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_env: Option<String>,
    pub cpu_cores: u32,
    #[serde(default)]
    pub ram_gb: u32,
}

impl VmConfig {
    /// Resolve the VM's address and produce the runtime type.
    pub fn resolve(&self) -> anyhow::Result<Vm> {
        let address = match (&self.address, &self.address_env) {
            (Some(addr), _) => addr.clone(),
            (None, Some(var)) => std::env::var(var)
                .with_context(|| format!("vm {}: environment variable {var} is not set", self.name))?,
            (None, None) => anyhow::bail!("vm {} has neither address nor address_env", self.name),
        };
        Ok(Vm::new(self.name.clone(), address, self.cpu_cores, self.ram_gb))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    pub path: PathBuf,
}

impl TaskgridConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: TaskgridConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolve every configured VM into a validated pool.
    pub fn vm_pool(&self) -> anyhow::Result<VmPool> {
        let vms = self
            .vms
            .iter()
            .map(VmConfig::resolve)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(VmPool::new(vms)?)
    }

    /// Starter config: four VMs with 1/2/4/8 cores and one dataset.
    pub fn scaffold() -> Self {
        let vms = [(1, 1, 1), (2, 2, 2), (3, 4, 4), (4, 8, 4)]
            .into_iter()
            .map(|(n, cpu_cores, ram_gb)| VmConfig {
                name: format!("vm{n}"),
                address: None,
                address_env: Some(format!("VM{n}_IP")),
                cpu_cores,
                ram_gb,
            })
            .collect();

        TaskgridConfig {
            dispatch: DispatchConfig::default(),
            search: SearchConfig::default(),
            evaluation: EvaluationConfig::default(),
            vms,
            datasets: vec![DatasetConfig {
                name: "Low-High".to_string(),
                path: PathBuf::from("Dataset/Low-High"),
            }],
        }
    }
}

/// Parse "300s", "500ms", "5m" or a bare number of seconds.
///
/// Returns `None` for unknown units and for values that overflow.
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);
    let value: u64 = digits.parse().ok()?;

    match unit.trim() {
        "ms" => Some(Duration::from_millis(value)),
        "" | "s" => Some(Duration::from_secs(value)),
        "m" => value.checked_mul(60).map(Duration::from_secs),
        _ => None,
    }
}

fn default_port() -> u16 {
    5000
}

fn default_timeout() -> String {
    "300s".to_string()
}

fn default_iterations() -> usize {
    500
}

fn default_runs() -> u32 {
    10
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("Result")
}

fn default_policies() -> Vec<String> {
    ["fcfs", "rr", "shc"].iter().map(|s| s.to_string()).collect()
}
