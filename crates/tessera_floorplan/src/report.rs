//! Human-readable and JSON summaries of a floorplan.

use serde::Serialize;
use std::fmt;

use tessera_common::{PartitionId, ResourceKind, SlotId};
use tessera_engine::{EngineResult, SlotPlacement};

use crate::orchestrator::Floorplan;

/// Name of the reconfigurable cell that hosts hardware task `index`.
pub fn cell_name(index: usize) -> String {
    format!("acc_{index}")
}

/// One hosted task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    /// Cell name, `acc_<task index>`.
    pub cell: String,
    /// Configured task name.
    pub task: String,
}

/// One active partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionRow {
    /// Partition index.
    pub partition: PartitionId,
    /// Hosting slot.
    pub slot: SlotId,
    /// Hosted tasks.
    pub cells: Vec<Cell>,
    /// Reserved resources per type.
    pub allocation: Vec<f64>,
}

/// Summary of one solved run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Project name.
    pub project: String,
    /// Board name.
    pub board: String,
    /// Slot geometry; empty for partition-only runs.
    pub slots: Vec<SlotPlacement>,
    /// Active partitions.
    pub partitions: Vec<PartitionRow>,
    /// Largest number of tasks sharing a partition.
    pub max_tasks_per_partition: usize,
    /// Number of active partitions.
    pub num_partitions: usize,
    /// Objective value.
    pub objective: f64,
    /// Whether optimality was proven.
    pub proven_optimal: bool,
}

impl Report {
    pub(crate) fn new(plan: &Floorplan, result: &EngineResult) -> Self {
        let names = plan.task_names();
        let partitions = result
            .allocations
            .iter()
            .map(|a| PartitionRow {
                partition: a.partition,
                slot: a.slot,
                cells: a
                    .tasks
                    .iter()
                    .map(|t| Cell {
                        cell: cell_name(t.index()),
                        task: names.get(t.index()).cloned().unwrap_or_default(),
                    })
                    .collect(),
                allocation: a.allocation.clone(),
            })
            .collect();
        Self {
            project: plan.name().to_string(),
            board: plan.board().name().to_string(),
            slots: result.slots.clone(),
            partitions,
            max_tasks_per_partition: result.max_tasks_per_partition,
            num_partitions: result.num_partitions,
            objective: result.objective,
            proven_optimal: result.proven_optimal,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} on {}: {} partition(s), at most {} task(s) per partition, objective {:.3}{}",
            self.project,
            self.board,
            self.num_partitions,
            self.max_tasks_per_partition,
            self.objective,
            if self.proven_optimal { "" } else { " (not proven optimal)" }
        )?;

        if !self.slots.is_empty() {
            writeln!(f)?;
            write!(f, "{:<6}{:<18}{:<18}", "slot", "rect", "site")?;
            for kind in ResourceKind::ALL {
                write!(f, "{:>8}", kind.name())?;
            }
            writeln!(f)?;
            for s in &self.slots {
                write!(
                    f,
                    "{:<6}{:<18}{:<18}",
                    s.slot.to_string(),
                    s.rect.to_string(),
                    s.site.to_string()
                )?;
                for r in s.resources {
                    write!(f, "{r:>8}")?;
                }
                writeln!(f)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "{:<11}{:<6}{:<24}cells", "partition", "slot", "allocation")?;
        for p in &self.partitions {
            let allocation = p
                .allocation
                .iter()
                .map(|v| format!("{v}"))
                .collect::<Vec<_>>()
                .join("/");
            let cells = p
                .cells
                .iter()
                .map(|c| format!("{} ({})", c.cell, c.task))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(
                f,
                "{:<11}{:<6}{:<24}{}",
                p.partition.to_string(),
                p.slot.to_string(),
                allocation,
                cells
            )?;
        }
        Ok(())
    }
}
