//! The scheduling policy contract and the built-in policy registry.

use std::fmt;
use std::str::FromStr;

use taskgrid_core::{Assignment, TaskBatch, VmPool};

use crate::baseline::{Fcfs, RoundRobin};
use crate::error::{SchedulerError, SchedulerResult};
use crate::hill_climb::HillClimbing;

/// Maps every task of a batch to a VM of the pool.
///
/// Implementations must return an assignment that places every task
/// exactly once on a VM of `vms`, and must fail with
/// `CoreError::EmptyTaskSet` / `CoreError::EmptyVmPool` on empty input.
/// Population-based optimizers plug in by implementing this trait.
pub trait SchedulingPolicy {
    /// Short label used in reports and file names.
    fn name(&self) -> &str;

    fn schedule(&mut self, tasks: &TaskBatch, vms: &VmPool) -> SchedulerResult<Assignment>;
}

impl<P: SchedulingPolicy + ?Sized> SchedulingPolicy for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn schedule(&mut self, tasks: &TaskBatch, vms: &VmPool) -> SchedulerResult<Assignment> {
        (**self).schedule(tasks, vms)
    }
}

/// Built-in policies selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Fcfs,
    RoundRobin,
    HillClimbing,
}

impl PolicyKind {
    /// Instantiate the policy. `seed` only affects hill climbing.
    pub fn build(self, iterations: usize, seed: Option<u64>) -> Box<dyn SchedulingPolicy> {
        match self {
            PolicyKind::Fcfs => Box::new(Fcfs),
            PolicyKind::RoundRobin => Box::new(RoundRobin),
            PolicyKind::HillClimbing => match seed {
                Some(seed) => Box::new(HillClimbing::new(iterations, seed)),
                None => Box::new(HillClimbing::from_entropy(iterations)),
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PolicyKind::Fcfs => "FCFS",
            PolicyKind::RoundRobin => "RR",
            PolicyKind::HillClimbing => "SHC",
        }
    }
}

impl FromStr for PolicyKind {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fcfs" => Ok(PolicyKind::Fcfs),
            "rr" | "round-robin" => Ok(PolicyKind::RoundRobin),
            "shc" | "hill-climbing" => Ok(PolicyKind::HillClimbing),
            _ => Err(SchedulerError::UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskgrid_core::{Task, Vm};

    fn pool() -> VmPool {
        VmPool::new(vec![Vm::new("a", "h1", 1, 1), Vm::new("b", "h2", 3, 1), Vm::new("c", "h3", 2, 1)]).unwrap()
    }

    fn batch(n: u64) -> TaskBatch {
        TaskBatch::new((0..n).map(|i| Task::new(i * 3, format!("task-{i}"), i)).collect()).unwrap()
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!("fcfs".parse::<PolicyKind>().unwrap(), PolicyKind::Fcfs);
        assert_eq!("RR".parse::<PolicyKind>().unwrap(), PolicyKind::RoundRobin);
        assert_eq!("round-robin".parse::<PolicyKind>().unwrap(), PolicyKind::RoundRobin);
        assert_eq!(" shc ".parse::<PolicyKind>().unwrap(), PolicyKind::HillClimbing);
        assert!(matches!(
            "sma".parse::<PolicyKind>(),
            Err(SchedulerError::UnknownPolicy(name)) if name == "sma"
        ));
    }

    #[test]
    fn built_policies_report_their_label() {
        for kind in [PolicyKind::Fcfs, PolicyKind::RoundRobin, PolicyKind::HillClimbing] {
            assert_eq!(kind.build(10, Some(1)).name(), kind.label());
        }
    }

    #[test]
    fn every_policy_covers_the_task_set() {
        let vms = pool();
        for n in [1, 2, 7, 25] {
            let tasks = batch(n);
            for kind in [PolicyKind::Fcfs, PolicyKind::RoundRobin, PolicyKind::HillClimbing] {
                let mut policy = kind.build(100, Some(n));
                let a = policy.schedule(&tasks, &vms).unwrap();

                let mut keys: Vec<_> = a.iter().map(|(id, _)| id).collect();
                let mut ids: Vec<_> = tasks.iter().map(|t| t.id).collect();
                keys.sort_unstable();
                ids.sort_unstable();
                assert_eq!(keys, ids, "{kind} with {n} tasks");
                assert!(a.iter().all(|(_, vm)| vms.contains(vm)));
            }
        }
    }
}
