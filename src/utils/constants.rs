/// Slack allowed when checking a linear constraint against an assignment.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// A binary slot whose value is above this reads as 1.
pub const BINARY_THRESHOLD: f64 = 0.5;

pub const VMS_FILE: &str = "vms.csv";
pub const JOBS_FILE: &str = "jobs.csv";
pub const TIMES_FILE: &str = "times.csv";

/// Process exit codes of the command line driver.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum RunCode {
    Solved = 0,
    SolverFailure = 1,
    NoSolution = 2,
    BadInput = 5,
}

/// Domain of a decision variable.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum VarDomain {
    Binary,
    NonNegativeReal,
}

/// Relation between the two sides of a linear constraint.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Comparison {
    LessEqual,
    Equal,
    GreaterEqual,
}

/// Algorithm hint forwarded to the solver.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Algorithm {
    #[default]
    Auto,
    Simplex,
    InteriorPoint,
}
