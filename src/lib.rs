//! Chooses one VM type and a GPU count per job for a batch of jobs, as a MILP
//! minimizing the largest deployed cost plus rejection penalties and weighted
//! tardiness.
//!
//! [`InstanceData`] is validated into an [`Instance`], [`build`] turns it into a
//! [`Model`], and a [`Solver`] produces a [`Solution`].

pub mod milp;
pub mod models;
pub mod solver;
pub mod utils;

pub use milp::{build, Assignment, Model};
pub use models::{Instance, InstanceData, Job, Vm, VmGpuPair};
pub use solver::{MicroLpSolver, Placement, Solution, SolveStatus, Solver, SolverOptions};
pub use utils::{constants, errors, loader, logging};
