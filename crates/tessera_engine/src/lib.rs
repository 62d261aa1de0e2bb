//! MILP floorplanning engine for dynamically reconfigurable FPGA slots.
//!
//! Given a taskset, a platform and per-software-task slack bounds, the engine
//! assigns every hardware task to a partition, sizes each partition to the
//! largest demand it hosts, and checks that reconfiguration, interference and
//! execution delays fit the slack bounds. When a board is supplied it also
//! places one rectangular slot per partition on the fabric: the slot must
//! enclose the partition's allocation net of forbidden regions, avoid column
//! seams and not overlap other slots.
//!
//! # Pipeline
//!
//! 1. **Validate** the [`EngineInput`]
//! 2. **Build** the floorplan model
//! 3. **Solve** under the configured budget and cancellation token
//! 4. **Extract** an [`EngineResult`], or report the conflicting constraints
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use tessera_common::HwTaskId;
//! use tessera_diagnostics::DiagnosticSink;
//! use tessera_engine::{floorplan, EngineInput, EngineOptions, EngineOutcome};
//! use tessera_milp::{CancelToken, GoodLpBackend};
//! use tessera_model::{Platform, Taskset};
//!
//! let platform = Platform::new(vec![50.0], vec![0.01]).unwrap();
//! let mut taskset = Taskset::one_to_one(2, &platform);
//! taskset.set_demand(HwTaskId::from_raw(0), vec![10.0]).unwrap();
//! taskset.set_demand(HwTaskId::from_raw(1), vec![20.0]).unwrap();
//! let input = EngineInput {
//!     platform,
//!     taskset,
//!     slacks: vec![100.0, 100.0],
//!     num_slots: 2,
//!     board: None,
//!     connections: Vec::new(),
//!     options: EngineOptions::default(),
//! };
//! let sink = DiagnosticSink::new();
//! let outcome = floorplan(&input, Arc::new(GoodLpBackend::new()), &CancelToken::new(), &sink).unwrap();
//! assert!(matches!(outcome, EngineOutcome::Solved(_)));
//! ```

#![warn(missing_docs)]

mod builder;
pub mod error;
mod extract;
pub mod param;

pub use error::EngineError;
pub use param::{
    Connection, EngineInput, EngineOptions, EngineOutcome, EngineResult, PartitionAllocation,
    SlotPlacement,
};

use std::sync::Arc;

use tessera_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Subject};
use tessera_milp::{CancelToken, Iis, MilpBackend, SolveOutcome};

use crate::builder::FloorplanModel;

/// Runs one floorplanning pass.
///
/// # Errors
///
/// Returns an [`EngineError`] if the input fails validation or the backend
/// fails. Infeasibility, timeouts and cancellation are outcomes, not errors.
pub fn floorplan(
    input: &EngineInput,
    backend: Arc<dyn MilpBackend>,
    cancel: &CancelToken,
    sink: &DiagnosticSink,
) -> Result<EngineOutcome, EngineError> {
    // Step 1: preconditions
    input.validate()?;
    if input.board.is_none() && !input.connections.is_empty() {
        sink.emit(Diagnostic::warning(
            DiagnosticCode::new(Category::Warning, 10),
            "slot connections are ignored in a partition-only run",
            Subject::None,
        ));
    }

    // Step 2: model
    let mut fm = FloorplanModel::build(input);
    let model = Arc::new(std::mem::take(&mut fm.model));

    // Step 3: solve
    let outcome = tessera_milp::solve(backend, model, &input.options.settings, cancel)?;

    // Step 4: extract or explain
    match outcome {
        SolveOutcome::Optimal(sol) => Ok(EngineOutcome::Solved(extract::extract(
            input, &fm, &sol, true, sink,
        ))),
        SolveOutcome::Feasible(sol) => {
            sink.emit(Diagnostic::warning(
                DiagnosticCode::new(Category::Solver, 205),
                "time budget expired; returning the best floorplan found",
                Subject::None,
            ));
            Ok(EngineOutcome::Solved(extract::extract(
                input, &fm, &sol, false, sink,
            )))
        }
        SolveOutcome::Infeasible(iis) => {
            report_conflict(&iis, sink);
            Ok(EngineOutcome::Infeasible(iis))
        }
        SolveOutcome::Unbounded => Err(EngineError::Unbounded),
        SolveOutcome::TimedOut => {
            sink.emit(Diagnostic::warning(
                DiagnosticCode::new(Category::Solver, 204),
                format!(
                    "no floorplan found within {:.0} s",
                    input.options.settings.time_limit.as_secs_f64()
                ),
                Subject::None,
            ));
            Ok(EngineOutcome::TimedOut)
        }
        SolveOutcome::Cancelled => Ok(EngineOutcome::Cancelled),
    }
}

fn report_conflict(iis: &Iis, sink: &DiagnosticSink) {
    for group in &iis.groups {
        tracing::warn!(constraint = group.as_str(), "in irreducible infeasible subset");
    }
    let mut diag = Diagnostic::error(
        DiagnosticCode::new(Category::Solver, 201),
        "floorplan model is infeasible",
        Subject::None,
    )
    .with_help("relax slack bounds, raise capacities or request more slots");
    if !iis.complete {
        diag = diag.with_note("conflict search ran out of time; the set may not be minimal");
    }
    sink.emit(diag);
    for group in &iis.groups {
        sink.emit(Diagnostic::note(
            DiagnosticCode::new(Category::Solver, 202),
            "constraint in conflict",
            Subject::Constraint(group.clone()),
        ));
    }
}
