//! Construction of the floorplanning MILP.
//!
//! [`FloorplanModel`] is the per-run context: the backend-neutral
//! [`Model`] plus the handles of every decision variable that result
//! extraction reads back. Layers are added in order:
//!
//! 1. partition layer (assignment, sharing, allocation, schedulability)
//! 2. geometry layer (slot shape, piecewise resource counts, usable resources)
//! 3. overlap and seam avoidance between slots
//! 4. wirelength
//! 5. objective

mod geometry;
mod overlap;
mod partition;
mod wirelength;

use tessera_common::ResourceKind;
use tessera_milp::{LinExpr, Model, VarId};

use crate::param::EngineInput;

/// Decision variables of one slot.
#[derive(Debug, Clone)]
pub(crate) struct SlotVars {
    pub x0: VarId,
    pub x1: VarId,
    pub y: VarId,
    pub beta: Vec<VarId>,
    /// Usable resources per kind as modelled.
    pub usable: Vec<LinExpr>,
    pub wasted: Vec<VarId>,
}

impl SlotVars {
    /// Height in clock regions.
    pub fn height(&self) -> LinExpr {
        LinExpr::sum(self.beta.iter().copied())
    }
}

/// The MILP of one floorplanning run and its variable handles.
#[derive(Debug, Clone)]
pub(crate) struct FloorplanModel {
    pub(crate) model: Model,
    /// `assign[task][partition]`
    pub(crate) assign: Vec<Vec<VarId>>,
    /// Partition hosts at least one task.
    pub(crate) used: Vec<VarId>,
    /// Task shares its partition.
    pub(crate) shared: Vec<VarId>,
    /// `alloc[resource][partition]`
    pub(crate) alloc: Vec<Vec<VarId>>,
    /// Reconfiguration time per task.
    pub(crate) reconf: Vec<VarId>,
    /// Empty for partition-only runs.
    pub(crate) slots: Vec<SlotVars>,
}

impl FloorplanModel {
    /// Builds the model for `input`, which must already be validated.
    pub fn build(input: &EngineInput) -> Self {
        let mut fm = FloorplanModel {
            model: Model::new(),
            assign: Vec::new(),
            used: Vec::new(),
            shared: Vec::new(),
            alloc: Vec::new(),
            reconf: Vec::new(),
            slots: Vec::new(),
        };

        fm.add_partition_layer(input);

        let mut objective = LinExpr::new();
        match &input.board {
            Some(board) => {
                fm.add_geometry_layer(input, board);
                fm.add_overlap_layer(input, board);
                for slot in &fm.slots {
                    for (r, &wasted) in slot.wasted.iter().enumerate() {
                        objective.add_term(wasted, input.options.waste_weight(r));
                    }
                }
                let weight = input.options.wirelength_weight;
                if weight > 0.0 && !input.connections.is_empty() {
                    let wl = fm.add_wirelength(input, board);
                    objective += wl * weight;
                }
            }
            None => {
                // Without geometry the waste of a partition is its allocation
                // above the demands, so minimise total allocation.
                for (r, row) in fm.alloc.iter().enumerate() {
                    for &b in row {
                        objective.add_term(b, input.options.waste_weight(r));
                    }
                }
            }
        }
        fm.model.minimise(objective);

        tracing::debug!(
            vars = fm.model.variables().len(),
            integer_vars = fm.model.num_integer_vars(),
            constraints = fm.model.constraints().len(),
            groups = fm.model.groups().len(),
            "floorplan model built"
        );
        fm
    }

    #[cfg(test)]
    pub fn model(&self) -> &Model {
        &self.model
    }
}

/// Name of resource type `r` in variable and group names.
pub(crate) fn resource_label(r: usize, geometric: bool) -> String {
    match ResourceKind::ALL.get(r) {
        Some(kind) if geometric => kind.name().to_string(),
        _ => format!("r{r}"),
    }
}
