//! Hardware and software tasks as seen by the floorplanning engine.

use serde::{Deserialize, Serialize};
use tessera_common::{HwTaskId, SwTaskId};

use crate::error::ModelError;
use crate::platform::Platform;

/// One accelerator to be placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HwTask {
    /// Resource demand, one entry per platform resource type.
    pub demand: Vec<f64>,
    /// Worst-case execution time once configured.
    pub wcet: f64,
    /// The software task that invokes this accelerator.
    pub sw_task: SwTaskId,
}

/// A software task and the hardware tasks it may invoke.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwTask {
    /// Invoked hardware tasks, in invocation order.
    pub hw_tasks: Vec<HwTaskId>,
}

/// The hardware/software task collections for one floorplanning run.
///
/// Sized once at construction; demands and WCETs are filled in afterwards but
/// the collections are never resized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taskset {
    /// Upper bound on partitions; one per hardware task.
    pub max_partitions: usize,
    /// Upper bound on slots per partition.
    pub max_slots_per_partition: usize,
    hw_tasks: Vec<HwTask>,
    sw_tasks: Vec<SwTask>,
}

impl Taskset {
    /// Creates a taskset of `n_hw` zero-demand hardware tasks and `n_sw`
    /// software tasks with no invocations yet.
    pub fn new(n_hw: usize, n_sw: usize, platform: &Platform) -> Self {
        let blank = HwTask {
            demand: vec![0.0; platform.num_resources()],
            wcet: 0.0,
            sw_task: SwTaskId::from_raw(0),
        };
        Self {
            max_partitions: n_hw,
            max_slots_per_partition: n_hw,
            hw_tasks: vec![blank; n_hw],
            sw_tasks: vec![SwTask::default(); n_sw],
        }
    }

    /// Creates a taskset in which software task `i` invokes only hardware task `i`.
    pub fn one_to_one(n: usize, platform: &Platform) -> Self {
        let mut set = Self::new(n, n, platform);
        for i in 0..n {
            set.hw_tasks[i].sw_task = SwTaskId::from(i);
            set.sw_tasks[i].hw_tasks.push(HwTaskId::from(i));
        }
        set
    }

    /// The hardware tasks, indexed by [`HwTaskId`].
    pub fn hw_tasks(&self) -> &[HwTask] {
        &self.hw_tasks
    }

    /// The software tasks, indexed by [`SwTaskId`].
    pub fn sw_tasks(&self) -> &[SwTask] {
        &self.sw_tasks
    }

    /// Number of hardware tasks.
    pub fn num_hw_tasks(&self) -> usize {
        self.hw_tasks.len()
    }

    /// Number of software tasks.
    pub fn num_sw_tasks(&self) -> usize {
        self.sw_tasks.len()
    }

    /// Returns one hardware task.
    pub fn hw_task(&self, id: HwTaskId) -> Result<&HwTask, ModelError> {
        self.hw_tasks.get(id.index()).ok_or(ModelError::UnknownHwTask(id))
    }

    /// Replaces the demand vector of a hardware task.
    pub fn set_demand(&mut self, id: HwTaskId, demand: Vec<f64>) -> Result<(), ModelError> {
        let task = self
            .hw_tasks
            .get_mut(id.index())
            .ok_or(ModelError::UnknownHwTask(id))?;
        if demand.len() != task.demand.len() {
            return Err(ModelError::LengthMismatch {
                what: "demand vector",
                expected: task.demand.len(),
                got: demand.len(),
            });
        }
        for &d in &demand {
            check_non_negative(format!("demand of task #{id}"), d)?;
        }
        task.demand = demand;
        Ok(())
    }

    /// Sets the WCET of a hardware task.
    pub fn set_wcet(&mut self, id: HwTaskId, wcet: f64) -> Result<(), ModelError> {
        check_non_negative(format!("WCET of task #{id}"), wcet)?;
        let task = self
            .hw_tasks
            .get_mut(id.index())
            .ok_or(ModelError::UnknownHwTask(id))?;
        task.wcet = wcet;
        Ok(())
    }

    /// Makes `sw` invoke `hw` and records `sw` as the owner of `hw`.
    pub fn assign(&mut self, hw: HwTaskId, sw: SwTaskId) -> Result<(), ModelError> {
        if hw.index() >= self.hw_tasks.len() {
            return Err(ModelError::UnknownHwTask(hw));
        }
        if sw.index() >= self.sw_tasks.len() {
            return Err(ModelError::UnknownSwTask(sw));
        }
        let old = self.hw_tasks[hw.index()].sw_task;
        if let Some(prev) = self.sw_tasks.get_mut(old.index()) {
            prev.hw_tasks.retain(|h| *h != hw);
        }
        self.hw_tasks[hw.index()].sw_task = sw;
        self.sw_tasks[sw.index()].hw_tasks.push(hw);
        Ok(())
    }

    /// Checks that every vector matches `platform` and every owner link is
    /// mirrored by its software task.
    pub fn validate(&self, platform: &Platform) -> Result<(), ModelError> {
        if self.hw_tasks.is_empty() {
            return Err(ModelError::EmptyTaskset);
        }
        for (i, task) in self.hw_tasks.iter().enumerate() {
            let id = HwTaskId::from(i);
            if task.demand.len() != platform.num_resources() {
                return Err(ModelError::LengthMismatch {
                    what: "demand vector",
                    expected: platform.num_resources(),
                    got: task.demand.len(),
                });
            }
            let owner = self
                .sw_tasks
                .get(task.sw_task.index())
                .ok_or(ModelError::UnknownSwTask(task.sw_task))?;
            if !owner.hw_tasks.contains(&id) {
                return Err(ModelError::InconsistentOwner {
                    hw: id,
                    sw: task.sw_task,
                });
            }
        }
        Ok(())
    }
}

fn check_non_negative(what: String, value: f64) -> Result<(), ModelError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidValue { what, value })
    }
}
