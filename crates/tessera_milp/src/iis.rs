//! Irreducible infeasible subsets over constraint groups.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::backend::{BackendOutcome, MilpBackend};
use crate::model::Model;
use crate::solve::{solve_once, Attempt, CancelToken, SolverSettings};

/// A set of constraint groups that is infeasible together.
///
/// When `complete` is true, removing any one group makes the rest feasible.
/// Otherwise the budget ran out and the set may still contain groups that are
/// not part of the conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Iis {
    /// Group names in model order.
    pub groups: Vec<String>,
    /// Whether the deletion filter ran to the end.
    pub complete: bool,
}

/// Shrinks the groups of an infeasible `model` with a deletion filter.
///
/// Each group is dropped in turn; if the remaining groups are still
/// infeasible the group stays dropped. A trial solve that times out keeps its group
/// and marks the result incomplete.
pub fn irreducible_subset(
    backend: &Arc<dyn MilpBackend>,
    model: &Model,
    settings: &SolverSettings,
    cancel: &CancelToken,
) -> Iis {
    let deadline = Instant::now() + settings.iis_time_limit;
    let groups = model.groups();
    let mut kept: HashSet<String> = groups.iter().cloned().collect();
    let mut complete = true;

    for group in &groups {
        let now = Instant::now();
        if cancel.is_cancelled() || now >= deadline {
            complete = false;
            break;
        }
        kept.remove(group);
        let trial = Arc::new(model.feasibility_subset(|g| kept.contains(g)));
        match solve_once(backend, trial, settings, deadline - now, cancel) {
            Ok(Attempt::Finished(BackendOutcome::Infeasible)) => {
                tracing::trace!(group = group.as_str(), "not part of conflict");
            }
            Ok(Attempt::Finished(_)) => {
                kept.insert(group.clone());
            }
            Ok(Attempt::TimedOut) | Ok(Attempt::Cancelled) => {
                kept.insert(group.clone());
                complete = false;
                break;
            }
            Err(e) => {
                tracing::warn!(group = group.as_str(), error = %e, "conflict trial solve failed");
                kept.insert(group.clone());
                complete = false;
            }
        }
    }

    let groups: Vec<String> = groups.into_iter().filter(|g| kept.contains(g)).collect();
    tracing::debug!(size = groups.len(), complete, "conflict computed");
    Iis { groups, complete }
}
