//! Solver collaborator: takes a built [`Model`] and reports a [`Solution`].

mod microlp;

use std::fmt;
use std::time::Duration;

pub use microlp::MicroLpSolver;

use crate::constants::{Algorithm, BINARY_THRESHOLD};
use crate::milp::{Assignment, Model};
use crate::models::{JobIndex, PairIndex, VmGpuPair, VmIndex};

/// Settings passed through to the solver. Unset fields keep the solver's default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverOptions {
    pub time_limit: Option<Duration>,
    /// Relative optimality gap.
    pub mip_gap: Option<f64>,
    pub algorithm: Algorithm,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Unbounded,
    Error(String),
}

impl SolveStatus {
    /// Whether the solution carries an assignment.
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::Feasible => write!(f, "feasible"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
            SolveStatus::Unbounded => write!(f, "unbounded"),
            SolveStatus::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

pub trait Solver {
    fn solve(&self, model: &Model, options: &SolverOptions) -> Solution;
}

/// Where one accepted job runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub job: JobIndex,
    pub pair_index: PairIndex,
    pub pair: VmGpuPair,
    pub tardiness: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    status: SolveStatus,
    assignment: Option<Assignment>,
    objective: Option<f64>,
}

impl Solution {
    /// A solution without values, for statuses other than optimal/feasible.
    pub fn without_values(status: SolveStatus) -> Self {
        Self {
            status,
            assignment: None,
            objective: None,
        }
    }

    pub fn with_values(status: SolveStatus, assignment: Assignment, objective: f64) -> Self {
        Self {
            status,
            assignment: Some(assignment),
            objective: Some(objective),
        }
    }

    pub fn status(&self) -> &SolveStatus {
        &self.status
    }

    pub fn assignment(&self) -> Option<&Assignment> {
        self.assignment.as_ref()
    }

    pub fn objective(&self) -> Option<f64> {
        self.objective
    }

    /// The switched-on VM, if any.
    pub fn chosen_vm(&self, model: &Model) -> Option<VmIndex> {
        let assignment = self.assignment.as_ref()?;
        let vars = model.variables();
        (0..model.instance().vms().len()).find(|&v| assignment[vars.chosen_vm(v)] > BINARY_THRESHOLD)
    }

    /// Accepted jobs with their (VM, GPU count), in job order.
    pub fn placements(&self, model: &Model) -> Vec<Placement> {
        let Some(assignment) = self.assignment.as_ref() else {
            return Vec::new();
        };
        let vars = model.variables();
        let instance = model.instance();

        (0..instance.jobs().len())
            .filter_map(|j| {
                let p = vars
                    .deployments_of(j)
                    .iter()
                    .position(|&x| assignment[x] > BINARY_THRESHOLD)?;
                Some(Placement {
                    job: j,
                    pair_index: p,
                    pair: instance.pair(p),
                    tardiness: assignment[vars.tardiness(j)],
                })
            })
            .collect()
    }

    /// Jobs left out of the deployment.
    pub fn rejected_jobs(&self, model: &Model) -> Vec<JobIndex> {
        let Some(assignment) = self.assignment.as_ref() else {
            return Vec::new();
        };
        let vars = model.variables();
        (0..model.instance().jobs().len())
            .filter(|&j| assignment[vars.chosen_job(j)] <= BINARY_THRESHOLD)
            .collect()
    }
}
