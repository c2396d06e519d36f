//! Stochastic hill climbing over assignments.
//!
//! Starts from a uniformly random assignment and, for a fixed number of
//! iterations, moves one random task to one random VM. A move is kept
//! only when it strictly lowers the cost. There is no temperature and no
//! early stop, so runtime is proportional to the iteration budget and the
//! walk may settle in a local optimum.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use tracing::{debug, info};

use taskgrid_core::{Assignment, CostModel, MakespanModel, TaskBatch, VmPool};

use crate::error::SchedulerResult;
use crate::policy::SchedulingPolicy;

/// Outcome of an optimization run.
#[derive(Debug, Clone)]
pub struct Optimized {
    pub assignment: Assignment,
    /// Cost of `assignment`.
    pub cost: f64,
    /// Cost of the random starting point.
    pub initial_cost: f64,
    /// Number of accepted moves.
    pub accepted: usize,
}

/// Place every task (in batch order) on a uniformly random VM.
///
/// Fails with `CoreError::EmptyVmPool` when there is nowhere to place.
pub fn random_assignment<R: Rng + ?Sized>(
    tasks: &TaskBatch,
    vms: &VmPool,
    rng: &mut R,
) -> SchedulerResult<Assignment> {
    vms.ensure_non_empty()?;
    Ok(tasks
        .iter()
        .map(|task| {
            let slot = rng.gen_range(0..vms.len());
            (task.id, vms.as_slice()[slot].name.clone())
        })
        .collect())
}

/// Run `iterations` single-move steps and return the best assignment seen.
pub fn optimize<C, R>(
    tasks: &TaskBatch,
    vms: &VmPool,
    cost_model: &C,
    iterations: usize,
    rng: &mut R,
) -> SchedulerResult<Optimized>
where
    C: CostModel + ?Sized,
    R: Rng + ?Sized,
{
    tasks.ensure_non_empty()?;
    vms.ensure_non_empty()?;

    let mut current = random_assignment(tasks, vms, rng)?;
    let mut current_cost = cost_model.estimate(&current, tasks, vms)?;
    let initial_cost = current_cost;
    let mut best = current.clone();
    let mut best_cost = current_cost;
    let mut accepted = 0;

    for step in 0..iterations {
        let mut candidate = current.clone();
        let task = &tasks.as_slice()[rng.gen_range(0..tasks.len())];
        let vm = &vms.as_slice()[rng.gen_range(0..vms.len())];
        candidate.assign(task.id, vm.name.clone());

        let candidate_cost = cost_model.estimate(&candidate, tasks, vms)?;
        if candidate_cost < current_cost {
            current = candidate;
            current_cost = candidate_cost;
            accepted += 1;

            if candidate_cost < best_cost {
                best = current.clone();
                best_cost = candidate_cost;
                debug!(step, cost = best_cost, "hill climbing improved");
            }
        }
    }

    info!(
        iterations,
        accepted,
        initial_cost,
        best_cost,
        "hill climbing finished"
    );

    Ok(Optimized {
        assignment: best,
        cost: best_cost,
        initial_cost,
        accepted,
    })
}

/// Scheduling policy wrapper around [`optimize`].
///
/// Owns its generator, so successive `schedule` calls continue the same
/// random stream rather than repeating the first search.
pub struct HillClimbing<C = MakespanModel> {
    cost_model: C,
    iterations: usize,
    rng: Pcg64,
}

impl HillClimbing<MakespanModel> {
    /// Makespan objective with a fixed seed.
    pub fn new(iterations: usize, seed: u64) -> Self {
        Self::with_cost_model(MakespanModel, iterations, Pcg64::seed_from_u64(seed))
    }

    /// Makespan objective seeded from the OS.
    pub fn from_entropy(iterations: usize) -> Self {
        Self::with_cost_model(MakespanModel, iterations, Pcg64::from_entropy())
    }
}

impl<C: CostModel> HillClimbing<C> {
    pub fn with_cost_model(cost_model: C, iterations: usize, rng: Pcg64) -> Self {
        Self {
            cost_model,
            iterations,
            rng,
        }
    }

    /// Run one search and keep the cost alongside the assignment.
    pub fn optimize(&mut self, tasks: &TaskBatch, vms: &VmPool) -> SchedulerResult<Optimized> {
        optimize(tasks, vms, &self.cost_model, self.iterations, &mut self.rng)
    }
}

impl<C: CostModel> SchedulingPolicy for HillClimbing<C> {
    fn name(&self) -> &str {
        "SHC"
    }

    fn schedule(&mut self, tasks: &TaskBatch, vms: &VmPool) -> SchedulerResult<Assignment> {
        self.optimize(tasks, vms).map(|o| o.assignment)
    }
}
