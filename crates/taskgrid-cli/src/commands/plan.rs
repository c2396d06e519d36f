use std::path::Path;

use taskgrid_core::workload::load_tasks;
use taskgrid_core::{Assignment, TaskBatch, TaskgridConfig, Vm, VmPool, estimate_makespan, per_vm_load};
use taskgrid_scheduler::{PolicyKind, SchedulingPolicy};

/// Assignment plus its estimates, ready to print.
#[derive(Debug)]
pub struct PlanReport {
    pub policy: &'static str,
    pub assignment: Assignment,
    pub makespan: f64,
    pub per_vm: Vec<(String, f64)>,
}

pub fn plan(
    config: &TaskgridConfig,
    dataset: &Path,
    policy: &str,
    iterations: Option<usize>,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let tasks = load_tasks(dataset)?;
    let pool = planning_pool(config)?;
    let kind: PolicyKind = policy.parse()?;

    let report = build_plan(
        kind,
        &tasks,
        &pool,
        iterations.unwrap_or(config.search.iterations),
        seed.or(config.search.seed),
    )?;

    println!(
        "{} on {} ({} tasks, {} vms)",
        report.policy,
        dataset.display(),
        tasks.len(),
        pool.len()
    );
    println!("estimated makespan: {:.2}", report.makespan);
    for (vm, load) in &report.per_vm {
        let count = report.assignment.tasks_on(vm).count();
        println!("  {vm:<12} {count:>5} tasks  {load:>14.2}");
    }

    Ok(())
}

pub fn build_plan(
    kind: PolicyKind,
    tasks: &TaskBatch,
    pool: &VmPool,
    iterations: usize,
    seed: Option<u64>,
) -> anyhow::Result<PlanReport> {
    let mut policy = kind.build(iterations, seed);
    let assignment = policy.schedule(tasks, pool)?;
    let makespan = estimate_makespan(&assignment, tasks, pool)?;
    let per_vm = per_vm_load(&assignment, tasks, pool)?;
    Ok(PlanReport {
        policy: kind.label(),
        assignment,
        makespan,
        per_vm,
    })
}

/// Planning never dispatches, so VMs whose address cannot be resolved
/// still take part with an empty address.
fn planning_pool(config: &TaskgridConfig) -> anyhow::Result<VmPool> {
    let vms = config
        .vms
        .iter()
        .map(|vm| {
            vm.resolve()
                .unwrap_or_else(|_| Vm::new(vm.name.clone(), "", vm.cpu_cores, vm.ram_gb))
        })
        .collect();
    Ok(VmPool::new(vms)?)
}
