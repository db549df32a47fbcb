//! The Model Builder: variables, constraints and objective of the single node
//! deployment MILP, built from a validated [`Instance`].

pub mod constraints;
mod expr;
mod model;
pub mod objective;
pub mod variables;

pub use constraints::ConstraintGroup;
pub use expr::{Assignment, Constraint, LinearExpr, VarId};
pub use model::Model;
pub use variables::{VarSlot, Variables};

use crate::errors::BuildError;
use crate::models::{Instance, InstanceData};

/// Validates `data` and builds its model. Nothing is solved.
pub fn build(data: &InstanceData) -> Result<Model, BuildError> {
    let instance: Instance = data.validate()?;
    Ok(Model::new(instance)?)
}
