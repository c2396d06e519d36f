pub mod config;
pub mod cost;
pub mod error;
pub mod pool;
pub mod types;
pub mod workload;

pub use config::TaskgridConfig;
pub use cost::{CostModel, MakespanModel, estimate_makespan, per_vm_load};
pub use error::{CoreError, CoreResult};
pub use pool::{TaskBatch, VmPool};
pub use types::*;
