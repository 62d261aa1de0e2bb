//! Backend-neutral mixed-integer linear programming for Tessera.
//!
//! Models are built as plain data ([`Model`]: named variables with kinds and
//! bounds, constraints tagged with a group name, a linear objective) and
//! handed to any [`MilpBackend`]. [`solve`] wraps a backend with an explicit
//! wall-clock budget and a caller-owned [`CancelToken`], and on proven
//! infeasibility extracts an irreducible infeasible subset of constraint
//! groups with a deletion filter.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use tessera_milp::{solve, CancelToken, GoodLpBackend, LinExpr, Model, SolveOutcome, SolverSettings};
//!
//! let mut model = Model::new();
//! let x = model.integer("x", 0.0, 10.0);
//! let y = model.binary("y");
//! model.ge("demand", LinExpr::from(x) + LinExpr::term(y, 3.0), 4.0);
//! model.minimise(LinExpr::from(x) + LinExpr::term(y, 2.0));
//!
//! let outcome = solve(
//!     Arc::new(GoodLpBackend::new()),
//!     Arc::new(model),
//!     &SolverSettings::default(),
//!     &CancelToken::new(),
//! )
//! .unwrap();
//! match outcome {
//!     SolveOutcome::Optimal(sol) => assert!((sol.objective() - 3.0).abs() < 1e-6),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod expr;
pub mod iis;
pub mod model;
pub mod solve;

pub use backend::{BackendOutcome, GoodLpBackend, MilpBackend, Solution};
pub use error::BackendError;
pub use expr::{LinExpr, VarId};
pub use iis::{irreducible_subset, Iis};
pub use model::{Constraint, Model, Sense, VarKind, Variable};
pub use solve::{solve, solve_once, Attempt, CancelToken, SolveOutcome, SolverSettings};
