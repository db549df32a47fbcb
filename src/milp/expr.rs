//! Linear expressions and constraints over variable slots.

use std::fmt;
use std::ops::Index;

use crate::constants::Comparison;

/// Handle to one decision variable slot of a model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Values for every variable slot of a model, indexed by [`VarId`].
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    values: Vec<f64>,
}

impl Assignment {
    /// All `len` slots set to zero.
    pub fn zeros(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
        }
    }

    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn set(&mut self, var: VarId, value: f64) -> &mut Self {
        self.values[var.0] = value;
        self
    }

    pub fn value(&self, var: VarId) -> f64 {
        self.values[var.0]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Index<VarId> for Assignment {
    type Output = f64;

    fn index(&self, var: VarId) -> &Self::Output {
        &self.values[var.0]
    }
}

/// `Σ coefficient · variable + constant`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    pub fn var(var: VarId) -> Self {
        Self::new().plus(var, 1.0)
    }

    /// Adds `coefficient · var`. Zero coefficients are dropped.
    pub fn add_term(&mut self, var: VarId, coefficient: f64) {
        if coefficient != 0.0 {
            self.terms.push((var, coefficient));
        }
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    pub fn plus(mut self, var: VarId, coefficient: f64) -> Self {
        self.add_term(var, coefficient);
        self
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn constant_term(&self) -> f64 {
        self.constant
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn coefficient(&self, var: VarId) -> f64 {
        self.terms
            .iter()
            .filter(|(v, _)| *v == var)
            .map(|(_, c)| c)
            .sum()
    }

    pub fn evaluate(&self, assignment: &Assignment) -> f64 {
        self.terms
            .iter()
            .map(|&(var, coefficient)| coefficient * assignment[var])
            .sum::<f64>()
            + self.constant
    }
}

/// A named linear constraint kept as `lhs (<= | = | >=) rhs`, with every variable
/// on the left and the constant on the right.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    name: String,
    lhs: LinearExpr,
    comparison: Comparison,
    rhs: f64,
}

impl Constraint {
    /// Normalizes `left (comparison) right`.
    pub fn new(
        name: impl Into<String>,
        left: LinearExpr,
        comparison: Comparison,
        right: LinearExpr,
    ) -> Self {
        let mut lhs = LinearExpr::new();
        for &(var, coefficient) in left.terms() {
            lhs.add_term(var, coefficient);
        }
        for &(var, coefficient) in right.terms() {
            lhs.add_term(var, -coefficient);
        }
        Self {
            name: name.into(),
            lhs,
            comparison,
            rhs: right.constant_term() - left.constant_term(),
        }
    }

    pub fn at_most(name: impl Into<String>, left: LinearExpr, right: LinearExpr) -> Self {
        Self::new(name, left, Comparison::LessEqual, right)
    }

    pub fn exactly(name: impl Into<String>, left: LinearExpr, right: LinearExpr) -> Self {
        Self::new(name, left, Comparison::Equal, right)
    }

    pub fn at_least(name: impl Into<String>, left: LinearExpr, right: LinearExpr) -> Self {
        Self::new(name, left, Comparison::GreaterEqual, right)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lhs(&self) -> &LinearExpr {
        &self.lhs
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    pub fn is_satisfied(&self, assignment: &Assignment, tolerance: f64) -> bool {
        let lhs = self.lhs.evaluate(assignment);
        match self.comparison {
            Comparison::LessEqual => lhs <= self.rhs + tolerance,
            Comparison::Equal => (lhs - self.rhs).abs() <= tolerance,
            Comparison::GreaterEqual => lhs >= self.rhs - tolerance,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.name)?;
        if self.lhs.is_constant() {
            write!(f, " 0")?;
        }
        for (i, &(var, coefficient)) in self.lhs.terms().iter().enumerate() {
            let sign = if coefficient < 0.0 { '-' } else { '+' };
            if i > 0 || coefficient < 0.0 {
                write!(f, " {sign}")?;
            }
            write!(f, " {}·x{}", coefficient.abs(), var.0)?;
        }
        let op = match self.comparison {
            Comparison::LessEqual => "<=",
            Comparison::Equal => "=",
            Comparison::GreaterEqual => ">=",
        };
        write!(f, " {op} {}", self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_moves_variables_left_and_constants_right() {
        let (x, y) = (VarId(0), VarId(1));
        // x + 2 <= 3y + 5
        let c = Constraint::at_most(
            "c",
            LinearExpr::constant(2.0).plus(x, 1.0),
            LinearExpr::constant(5.0).plus(y, 3.0),
        );

        assert_eq!(c.lhs().terms(), &[(x, 1.0), (y, -3.0)]);
        assert_eq!(c.rhs(), 3.0);
        assert_eq!(c.to_string(), "c: 1·x0 - 3·x1 <= 3");
    }

    #[test]
    fn zero_coefficients_are_dropped() {
        let expr = LinearExpr::new().plus(VarId(0), 0.0).plus(VarId(1), 2.0);
        assert_eq!(expr.terms(), &[(VarId(1), 2.0)]);
    }

    #[test]
    fn satisfaction_respects_tolerance() {
        let x = VarId(0);
        let c = Constraint::exactly("one", LinearExpr::var(x), LinearExpr::constant(1.0));

        let mut assignment = Assignment::zeros(1);
        assert!(!c.is_satisfied(&assignment, 1e-6));
        assignment.set(x, 1.0 - 1e-9);
        assert!(c.is_satisfied(&assignment, 1e-6));
    }
}
