//! The records exchanged between the orchestrator and the engine.

use serde::{Deserialize, Serialize};
use tessera_arch::{BoardTopology, Rect};
use tessera_common::{HwTaskId, PartitionId, ResourceKind, SlotId, SwTaskId};
use tessera_milp::{Iis, SolverSettings};
use tessera_model::{Platform, Taskset};

use crate::error::EngineError;

/// A weighted link between two slots, used by the wirelength objective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// One end.
    pub from: SlotId,
    /// The other end.
    pub to: SlotId,
    /// Relative importance.
    pub weight: f64,
}

/// Model and solve knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Budget and backend settings.
    pub settings: SolverSettings,
    /// Whether the configuration port can preempt a running reconfiguration.
    /// When false, a task may additionally wait for other partitions'
    /// reconfigurations.
    pub preemptive_reconfiguration: bool,
    /// Bound each shared task's reconfiguration time by its partition's size.
    pub bound_reconfiguration: bool,
    /// Forbid active slots from overlapping.
    pub enforce_non_overlap: bool,
    /// Waste weight per resource type; missing entries count as zero.
    pub waste_weights: Vec<f64>,
    /// Weight of the normalized wirelength term.
    pub wirelength_weight: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            settings: SolverSettings::default(),
            preemptive_reconfiguration: false,
            bound_reconfiguration: true,
            enforce_non_overlap: true,
            waste_weights: vec![1.0, 0.0, 0.0],
            wirelength_weight: 0.0,
        }
    }
}

impl EngineOptions {
    /// Waste weight of resource type `r`.
    pub fn waste_weight(&self, r: usize) -> f64 {
        self.waste_weights.get(r).copied().unwrap_or(0.0)
    }
}

/// Everything the engine needs for one run.
///
/// With `board` set the engine places slots on the fabric; without it only
/// the partition layer is built and any number of resource types is allowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineInput {
    /// Resource capacities and reconfiguration rates.
    pub platform: Platform,
    /// Hardware and software tasks.
    pub taskset: Taskset,
    /// End-to-end delay bound per software task.
    pub slacks: Vec<f64>,
    /// Number of slots, which is also the number of partitions.
    pub num_slots: usize,
    /// Fabric description for geometric runs.
    pub board: Option<BoardTopology>,
    /// Slot links for the wirelength objective.
    pub connections: Vec<Connection>,
    /// Knobs.
    pub options: EngineOptions,
}

impl EngineInput {
    /// Checks the preconditions of a run. Nothing is built if this fails.
    ///
    /// # Errors
    ///
    /// Fails on zero slots, an inconsistent taskset, a slack vector of the
    /// wrong length or with bad entries, a geometric run without the three
    /// canonical resource types, connections to unknown slots, and negative
    /// objective weights.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.num_slots == 0 {
            return Err(EngineError::NoSlots);
        }
        self.taskset.validate(&self.platform)?;
        if self.slacks.len() != self.taskset.num_sw_tasks() {
            return Err(EngineError::SlackLength {
                expected: self.taskset.num_sw_tasks(),
                got: self.slacks.len(),
            });
        }
        for (i, &value) in self.slacks.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidSlack {
                    sw: SwTaskId::from(i),
                    value,
                });
            }
        }
        if self.board.is_some() && self.platform.num_resources() != ResourceKind::ALL.len() {
            return Err(EngineError::GeometryResources(self.platform.num_resources()));
        }
        for c in &self.connections {
            for slot in [c.from, c.to] {
                if slot.index() >= self.num_slots {
                    return Err(EngineError::UnknownSlot {
                        slot,
                        slots: self.num_slots,
                    });
                }
            }
            check_weight("connection weight", c.weight)?;
        }
        for (r, &w) in self.options.waste_weights.iter().enumerate() {
            check_weight(&format!("waste_weights[{r}]"), w)?;
        }
        check_weight("wirelength_weight", self.options.wirelength_weight)
    }
}

fn check_weight(what: &str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidWeight {
            what: what.to_string(),
            value,
        })
    }
}

/// Where one active slot landed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotPlacement {
    /// The slot.
    pub slot: SlotId,
    /// Rectangle in columns and clock-region rows.
    pub rect: Rect,
    /// Rectangle with `y` and `h` scaled to placement rows.
    pub site: Rect,
    /// Usable resources inside the slot, in `clb, bram, dsp` order.
    pub resources: [u32; 3],
}

/// The tasks sharing one active partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionAllocation {
    /// Packed partition index.
    pub partition: PartitionId,
    /// The slot hosting the partition.
    pub slot: SlotId,
    /// Hosted hardware tasks in id order.
    pub tasks: Vec<HwTaskId>,
    /// Resources reserved for the partition, per resource type.
    pub allocation: Vec<f64>,
}

/// The result of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineResult {
    /// Geometry of active slots; empty for partition-only runs.
    pub slots: Vec<SlotPlacement>,
    /// Active partitions in slot order.
    pub allocations: Vec<PartitionAllocation>,
    /// Partition of every hardware task, indexed by task.
    pub task_partition: Vec<PartitionId>,
    /// Reconfiguration time charged to every hardware task.
    pub reconfiguration: Vec<f64>,
    /// Largest number of tasks sharing a partition.
    pub max_tasks_per_partition: usize,
    /// Number of active partitions.
    pub num_partitions: usize,
    /// Objective value.
    pub objective: f64,
    /// Whether optimality was proven.
    pub proven_optimal: bool,
}

impl EngineResult {
    /// Sum of one resource type over all partition allocations.
    pub fn total_allocation(&self, r: usize) -> f64 {
        self.allocations
            .iter()
            .map(|a| a.allocation.get(r).copied().unwrap_or(0.0))
            .sum()
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutcome {
    /// A floorplan was found.
    Solved(EngineResult),
    /// No floorplan exists; the conflicting constraint groups are attached.
    Infeasible(Iis),
    /// The budget elapsed without a floorplan.
    TimedOut,
    /// The caller cancelled the run.
    Cancelled,
}

impl EngineOutcome {
    /// The result, if solved.
    pub fn result(&self) -> Option<&EngineResult> {
        match self {
            EngineOutcome::Solved(r) => Some(r),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let o = EngineOptions::default();
        assert!(!o.preemptive_reconfiguration);
        assert!(o.bound_reconfiguration);
        assert!(o.enforce_non_overlap);
        assert_eq!(o.waste_weight(0), 1.0);
        assert_eq!(o.waste_weight(1), 0.0);
        assert_eq!(o.waste_weight(7), 0.0);
        assert_eq!(o.wirelength_weight, 0.0);
    }

    #[test]
    fn options_fill_defaults() {
        let o: EngineOptions = serde_json::from_str(r#"{"wirelength_weight": 0.5}"#).unwrap();
        assert_eq!(o.wirelength_weight, 0.5);
        assert!(o.enforce_non_overlap);
        assert_eq!(o.settings, SolverSettings::default());
    }

    #[test]
    fn result_serde_roundtrip() {
        let result = EngineResult {
            slots: vec![SlotPlacement {
                slot: SlotId::from_raw(0),
                rect: Rect::new(1, 0, 4, 1),
                site: Rect::new(1, 0, 4, 50),
                resources: [150, 10, 0],
            }],
            allocations: vec![PartitionAllocation {
                partition: PartitionId::from_raw(0),
                slot: SlotId::from_raw(0),
                tasks: vec![HwTaskId::from_raw(0), HwTaskId::from_raw(1)],
                allocation: vec![120.0, 10.0, 0.0],
            }],
            task_partition: vec![PartitionId::from_raw(0); 2],
            reconfiguration: vec![0.5, 0.5],
            max_tasks_per_partition: 2,
            num_partitions: 1,
            objective: 30.0,
            proven_optimal: true,
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: EngineResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, back);
        assert_eq!(back.total_allocation(0), 120.0);
    }
}
