//! Solver backends.

use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::expr::{LinExpr, VarId};
use crate::model::{Model, Sense, VarKind};
use crate::solve::SolverSettings;

/// A variable assignment returned by a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    values: Vec<f64>,
    objective: f64,
}

impl Solution {
    /// Wraps raw values and evaluates the model objective against them.
    pub fn new(model: &Model, values: Vec<f64>) -> Self {
        let objective = model.objective().eval(&values);
        Self { values, objective }
    }

    /// Value of `var`, zero if out of range.
    pub fn value(&self, var: VarId) -> f64 {
        self.values.get(var.index()).copied().unwrap_or(0.0)
    }

    /// Value of `var` read as a 0/1 decision.
    pub fn is_set(&self, var: VarId) -> bool {
        self.value(var) > 0.5
    }

    /// Value of an expression under this assignment.
    pub fn eval(&self, expr: &LinExpr) -> f64 {
        expr.eval(&self.values)
    }

    /// Objective value.
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// All values, indexed by [`VarId`].
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// What a backend concluded about a model.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendOutcome {
    /// Proven optimal.
    Optimal(Solution),
    /// Feasible, optimality not proven.
    Feasible(Solution),
    /// Proven infeasible.
    Infeasible,
    /// Objective unbounded below.
    Unbounded,
}

/// A MILP solver.
///
/// Implementations block until they reach a conclusion; budgets and
/// cancellation are enforced by [`solve`](crate::solve) around the call.
/// A backend that cannot be interrupted keeps its worker thread, and one
/// core, busy after a timeout or cancellation until it finishes on its own.
///
/// Only backends that stop early with an incumbent return
/// [`BackendOutcome::Feasible`]. [`GoodLpBackend`] is not one of them: it
/// either finishes with a proven answer or is abandoned by the budget.
pub trait MilpBackend: Send + Sync {
    /// Short name for logs and errors.
    fn name(&self) -> &str;

    /// Solves `model` to completion.
    fn solve(&self, model: &Model, settings: &SolverSettings) -> Result<BackendOutcome, BackendError>;
}

/// Backend built on `good_lp` with the pure-Rust `microlp` solver.
///
/// `microlp` has no time limit or cancellation hook and reports no
/// incumbent, so this backend never returns [`BackendOutcome::Feasible`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpBackend;

impl GoodLpBackend {
    /// Creates the backend.
    pub fn new() -> Self {
        Self
    }

    fn failed(&self, message: impl Into<String>) -> BackendError {
        BackendError::Failed {
            backend: self.name().to_string(),
            message: message.into(),
        }
    }
}

fn to_expression(expr: &LinExpr, vars: &[good_lp::Variable]) -> good_lp::Expression {
    let mut out = good_lp::Expression::with_capacity(expr.terms().len());
    for &(v, coef) in expr.terms() {
        out.add_mul(coef, vars[v.index()]);
    }
    out
}

impl MilpBackend for GoodLpBackend {
    fn name(&self) -> &str {
        "microlp"
    }

    fn solve(&self, model: &Model, settings: &SolverSettings) -> Result<BackendOutcome, BackendError> {
        use good_lp::{variable, ProblemVariables, ResolutionError, Solution as _, SolverModel};

        let mut problem_vars = ProblemVariables::new();
        let mut vars = Vec::with_capacity(model.variables().len());
        for v in model.variables() {
            let mut def = variable().name(v.name.clone()).min(v.lower);
            if let Some(upper) = v.upper {
                def = def.max(upper);
            }
            def = match v.kind {
                VarKind::Continuous => def,
                VarKind::Integer => def.integer(),
                VarKind::Binary => def.binary(),
            };
            vars.push(problem_vars.add(def));
        }

        for c in model.constraints() {
            if let Some(max) = c.lhs.max_var() {
                if max.index() >= vars.len() {
                    return Err(self.failed(format!(
                        "constraint group {} references unknown variable {}",
                        c.group,
                        max.as_raw()
                    )));
                }
            }
        }

        let mut problem = problem_vars
            .minimise(to_expression(model.objective(), &vars))
            .using(good_lp::microlp);
        for c in model.constraints() {
            let lhs = to_expression(&c.lhs, &vars);
            let constraint = match c.sense {
                Sense::Le => good_lp::constraint::leq(lhs, c.rhs),
                Sense::Ge => good_lp::constraint::geq(lhs, c.rhs),
                Sense::Eq => good_lp::constraint::eq(lhs, c.rhs),
            };
            problem = problem.with(constraint);
        }

        tracing::debug!(
            vars = vars.len(),
            constraints = model.constraints().len(),
            threads = settings.threads,
            "invoking microlp"
        );

        match problem.solve() {
            Ok(sol) => {
                let values = model
                    .variables()
                    .iter()
                    .zip(&vars)
                    .map(|(def, var)| {
                        let raw = sol.value(*var);
                        let rounded = raw.round();
                        if def.kind != VarKind::Continuous
                            && (raw - rounded).abs() <= settings.int_feas_tol.max(1e-6)
                        {
                            rounded
                        } else {
                            raw
                        }
                    })
                    .collect();
                Ok(BackendOutcome::Optimal(Solution::new(model, values)))
            }
            Err(ResolutionError::Infeasible) => Ok(BackendOutcome::Infeasible),
            Err(ResolutionError::Unbounded) => Ok(BackendOutcome::Unbounded),
            Err(other) => Err(self.failed(other.to_string())),
        }
    }
}
