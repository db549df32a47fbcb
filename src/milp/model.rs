use tracing::{debug, info};

use super::constraints::{self, ConstraintGroup};
use super::objective;
use super::{Assignment, Constraint, LinearExpr, VarId, Variables};
use crate::constants::VarDomain;
use crate::errors::ConstructionError;
use crate::models::Instance;

/// The single node MILP: sets and parameters of one instance, the variable slots,
/// the constraint groups and the objective to minimize.
///
/// Built once per instance and never modified afterwards.
#[derive(Clone, Debug)]
pub struct Model {
    instance: Instance,
    variables: Variables,
    groups: Vec<ConstraintGroup>,
    objective: LinearExpr,
}

impl Model {
    pub fn new(instance: Instance) -> Result<Self, ConstructionError> {
        let variables = Variables::allocate(&instance)?;
        let groups = constraints::generate(&instance, &variables);
        let objective = objective::minimum_cost(&instance, &variables);

        let model = Self {
            instance,
            variables,
            groups,
            objective,
        };
        model.check_references()?;

        info!(
            variables = model.variables.len(),
            constraints = model.num_constraints(),
            "model built"
        );
        Ok(model)
    }

    /// Every term must point at an allocated slot.
    fn check_references(&self) -> Result<(), ConstructionError> {
        let len = self.variables.len();
        for constraint in self.constraints() {
            if let Some(&(var, _)) = constraint.lhs().terms().iter().find(|(v, _)| v.index() >= len) {
                return Err(ConstructionError::UnknownVariable {
                    constraint: constraint.name().to_string(),
                    var: var.index(),
                });
            }
        }
        if let Some(&(var, _)) = self.objective.terms().iter().find(|(v, _)| v.index() >= len) {
            return Err(ConstructionError::UnknownVariable {
                constraint: "minimum_cost".to_string(),
                var: var.index(),
            });
        }
        Ok(())
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn groups(&self) -> &[ConstraintGroup] {
        &self.groups
    }

    pub fn constraint_group(&self, name: &str) -> Option<&ConstraintGroup> {
        self.groups.iter().find(|group| group.name() == name)
    }

    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.groups.iter().flat_map(|group| group.constraints())
    }

    pub fn num_constraints(&self) -> usize {
        self.groups.iter().map(ConstraintGroup::len).sum()
    }

    /// The expression to minimize.
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    /// Objective value of `assignment`.
    pub fn evaluate(&self, assignment: &Assignment) -> f64 {
        self.objective.evaluate(assignment)
    }

    /// Constraints `assignment` breaks by more than `tolerance`.
    pub fn violations<'a>(&'a self, assignment: &Assignment, tolerance: f64) -> Vec<&'a Constraint> {
        let broken: Vec<_> = self
            .constraints()
            .filter(|c| !c.is_satisfied(assignment, tolerance))
            .collect();
        debug!(violations = broken.len(), "checked assignment");
        broken
    }

    /// Slots whose value lies outside their domain: binaries not within
    /// `tolerance` of 0 or 1, reals below `-tolerance`.
    pub fn domain_violations(&self, assignment: &Assignment, tolerance: f64) -> Vec<VarId> {
        self.variables
            .slots()
            .iter()
            .enumerate()
            .map(|(i, slot)| (VarId(i), slot.domain()))
            .filter(|&(var, domain)| {
                let value = assignment[var];
                match domain {
                    VarDomain::Binary => value.abs() > tolerance && (value - 1.0).abs() > tolerance,
                    VarDomain::NonNegativeReal => value < -tolerance,
                }
            })
            .map(|(var, _)| var)
            .collect()
    }

    /// True when `assignment` satisfies every constraint and every domain.
    pub fn is_feasible(&self, assignment: &Assignment, tolerance: f64) -> bool {
        assignment.len() == self.variables.len()
            && self.domain_violations(assignment, tolerance).is_empty()
            && self.violations(assignment, tolerance).is_empty()
    }
}
