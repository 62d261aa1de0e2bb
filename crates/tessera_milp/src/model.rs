//! The backend-neutral model: variables, grouped constraints, objective.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::expr::{LinExpr, VarId};

/// Domain of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarKind {
    /// Real-valued.
    Continuous,
    /// Integer-valued.
    Integer,
    /// Zero or one.
    Binary,
}

/// A named decision variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Name for diagnostics.
    pub name: String,
    /// Domain.
    pub kind: VarKind,
    /// Lower bound.
    pub lower: f64,
    /// Upper bound, or `None` for unbounded above.
    pub upper: Option<f64>,
}

/// Direction of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sense {
    /// `lhs <= rhs`
    Le,
    /// `lhs >= rhs`
    Ge,
    /// `lhs == rhs`
    Eq,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sense::Le => "<=",
            Sense::Ge => ">=",
            Sense::Eq => "==",
        })
    }
}

/// A linear constraint tagged with the group it belongs to.
///
/// Groups are the unit of infeasibility diagnosis: an irreducible infeasible
/// subset is reported as a set of group names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Group name, e.g. `delay_bound[sw2]`.
    pub group: String,
    /// Left-hand side.
    pub lhs: LinExpr,
    /// Direction.
    pub sense: Sense,
    /// Right-hand side constant.
    pub rhs: f64,
}

impl Constraint {
    /// Returns `true` if `values` satisfies the constraint within `tol`.
    pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
        let lhs = self.lhs.eval(values);
        match self.sense {
            Sense::Le => lhs <= self.rhs + tol,
            Sense::Ge => lhs >= self.rhs - tol,
            Sense::Eq => (lhs - self.rhs).abs() <= tol,
        }
    }
}

/// A minimisation problem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: LinExpr,
}

impl Model {
    /// Creates an empty model with a zero objective.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable and returns its id.
    pub fn add_var(
        &mut self,
        name: impl Into<String>,
        kind: VarKind,
        lower: f64,
        upper: Option<f64>,
    ) -> VarId {
        let id = VarId::from_raw(self.variables.len() as u32);
        self.variables.push(Variable {
            name: name.into(),
            kind,
            lower,
            upper,
        });
        id
    }

    /// Adds a binary variable.
    pub fn binary(&mut self, name: impl Into<String>) -> VarId {
        self.add_var(name, VarKind::Binary, 0.0, Some(1.0))
    }

    /// Adds an integer variable in `[lower, upper]`.
    pub fn integer(&mut self, name: impl Into<String>, lower: f64, upper: f64) -> VarId {
        self.add_var(name, VarKind::Integer, lower, Some(upper))
    }

    /// Adds a continuous variable in `[lower, upper]`.
    pub fn continuous(&mut self, name: impl Into<String>, lower: f64, upper: Option<f64>) -> VarId {
        self.add_var(name, VarKind::Continuous, lower, upper)
    }

    /// Adds `lhs (sense) rhs` to `group`. Constants in `lhs` move to the right.
    pub fn constrain(&mut self, group: impl Into<String>, mut lhs: LinExpr, sense: Sense, rhs: f64) {
        let rhs = rhs - lhs.take_constant();
        self.constraints.push(Constraint {
            group: group.into(),
            lhs,
            sense,
            rhs,
        });
    }

    /// Adds `lhs <= rhs`.
    pub fn le(&mut self, group: impl Into<String>, lhs: LinExpr, rhs: f64) {
        self.constrain(group, lhs, Sense::Le, rhs);
    }

    /// Adds `lhs >= rhs`.
    pub fn ge(&mut self, group: impl Into<String>, lhs: LinExpr, rhs: f64) {
        self.constrain(group, lhs, Sense::Ge, rhs);
    }

    /// Adds `lhs == rhs`.
    pub fn equal(&mut self, group: impl Into<String>, lhs: LinExpr, rhs: f64) {
        self.constrain(group, lhs, Sense::Eq, rhs);
    }

    /// Sets the expression to minimise.
    pub fn minimise(&mut self, objective: LinExpr) {
        self.objective = objective;
    }

    /// The variables, indexed by [`VarId`].
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// The constraints in insertion order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The objective.
    pub fn objective(&self) -> &LinExpr {
        &self.objective
    }

    /// Returns a variable's name.
    pub fn var_name(&self, var: VarId) -> Option<&str> {
        self.variables.get(var.index()).map(|v| v.name.as_str())
    }

    /// Distinct group names in first-appearance order.
    pub fn groups(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.constraints
            .iter()
            .filter(|c| seen.insert(c.group.as_str()))
            .map(|c| c.group.clone())
            .collect()
    }

    /// Number of binary and integer variables.
    pub fn num_integer_vars(&self) -> usize {
        self.variables
            .iter()
            .filter(|v| v.kind != VarKind::Continuous)
            .count()
    }

    /// A copy keeping only the constraints whose group satisfies `keep`, with
    /// a zero objective. Used for feasibility checks.
    pub fn feasibility_subset(&self, keep: impl Fn(&str) -> bool) -> Model {
        Model {
            variables: self.variables.clone(),
            constraints: self
                .constraints
                .iter()
                .filter(|c| keep(&c.group))
                .cloned()
                .collect(),
            objective: LinExpr::new(),
        }
    }

    /// Groups of the constraints `values` violates by more than `tol`.
    pub fn violations(&self, values: &[f64], tol: f64) -> Vec<&str> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied(values, tol))
            .map(|c| c.group.as_str())
            .collect()
    }
}
