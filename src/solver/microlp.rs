use std::time::Instant;

use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError,
    Solution as _, SolverModel, Variable,
};
use tracing::{info, warn};

use super::{Solution, SolveStatus, Solver, SolverOptions};
use crate::constants::{Algorithm, Comparison, VarDomain, FEASIBILITY_TOLERANCE};
use crate::milp::{Assignment, LinearExpr, Model};

/// Solves the model with `good_lp`'s pure Rust `microlp` backend.
///
/// The backend has no time limit, gap or algorithm settings; those options are
/// logged and ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

/// Variable part of `expr`. Constants stay out of the backend: constraints keep
/// theirs on the right hand side and the objective is evaluated on our side.
fn to_expression(expr: &LinearExpr, vars: &[Variable]) -> Expression {
    expr.terms()
        .iter()
        .map(|&(var, coefficient)| coefficient * vars[var.index()])
        .sum()
}

fn warn_unsupported(options: &SolverOptions) {
    if let Some(limit) = options.time_limit {
        warn!(?limit, "microlp has no time limit, ignoring it");
    }
    if let Some(gap) = options.mip_gap {
        warn!(gap, "microlp solves to optimality, ignoring the gap");
    }
    if options.algorithm != Algorithm::Auto {
        warn!(algorithm = ?options.algorithm, "microlp has a single algorithm, ignoring the choice");
    }
}

impl Solver for MicroLpSolver {
    fn solve(&self, model: &Model, options: &SolverOptions) -> Solution {
        warn_unsupported(options);

        // Constraints without variables never reach the backend.
        if let Some(c) = model
            .constraints()
            .filter(|c| c.lhs().is_constant())
            .find(|c| !c.is_satisfied(&Assignment::zeros(0), FEASIBILITY_TOLERANCE))
        {
            info!(constraint = %c, "constant constraint cannot hold");
            return Solution::without_values(SolveStatus::Infeasible);
        }

        let mut problem_vars = ProblemVariables::new();
        let vars: Vec<Variable> = model
            .variables()
            .slots()
            .iter()
            .map(|slot| {
                let definition = match slot.domain() {
                    VarDomain::Binary => variable().binary(),
                    VarDomain::NonNegativeReal => variable().min(0.0),
                };
                problem_vars.add(definition.name(slot.name()))
            })
            .collect();

        let mut problem = problem_vars
            .minimise(to_expression(model.objective(), &vars))
            .using(default_solver);
        for c in model.constraints().filter(|c| !c.lhs().is_constant()) {
            let lhs = to_expression(c.lhs(), &vars);
            problem = problem.with(match c.comparison() {
                Comparison::LessEqual => constraint::leq(lhs, c.rhs()),
                Comparison::Equal => constraint::eq(lhs, c.rhs()),
                Comparison::GreaterEqual => constraint::geq(lhs, c.rhs()),
            });
        }

        info!(
            variables = vars.len(),
            constraints = model.num_constraints(),
            "solving with microlp"
        );
        let started = Instant::now();
        let result = problem.solve();
        let elapsed = started.elapsed();

        let status = match result {
            Ok(solution) => {
                let values = model
                    .variables()
                    .slots()
                    .iter()
                    .zip(&vars)
                    .map(|(slot, &var)| {
                        let value = solution.value(var);
                        match slot.domain() {
                            VarDomain::Binary => value.round(),
                            VarDomain::NonNegativeReal => value.max(0.0),
                        }
                    })
                    .collect();
                let assignment = Assignment::from_values(values);
                let objective = model.evaluate(&assignment);
                info!(?elapsed, objective, "optimal solution found");
                return Solution::with_values(SolveStatus::Optimal, assignment, objective);
            }
            Err(ResolutionError::Infeasible) => SolveStatus::Infeasible,
            Err(ResolutionError::Unbounded) => SolveStatus::Unbounded,
            Err(other) => SolveStatus::Error(other.to_string()),
        };

        info!(?elapsed, %status, "no solution");
        Solution::without_values(status)
    }
}
