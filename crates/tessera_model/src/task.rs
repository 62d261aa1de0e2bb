//! The scheduling-facing task entity.
//!
//! A [`Task`] is what the clustering heuristic and a runtime scheduler see:
//! resource demand, configuration and execution times, a lifecycle status and
//! dependency edges. The floorplanning engine never reads the status or the
//! edges.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Lifecycle of a task on the reconfigurable fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Waiting for its parents and for a free slot.
    #[default]
    Waiting,
    /// Its bitstream is being loaded.
    Configuring,
    /// Executing.
    Running,
    /// Finished.
    Ending,
}

impl TaskStatus {
    /// The state reached by the only legal forward transition, if any.
    pub fn next(self) -> Option<TaskStatus> {
        match self {
            TaskStatus::Waiting => Some(TaskStatus::Configuring),
            TaskStatus::Configuring => Some(TaskStatus::Running),
            TaskStatus::Running => Some(TaskStatus::Ending),
            TaskStatus::Ending => None,
        }
    }
}

/// A task with resource demand and dependency edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Task id.
    pub id: u32,
    /// Logic demand in CLBs.
    pub clb: u32,
    /// DSP demand.
    pub dsp: u32,
    /// Block RAM demand.
    pub bram: u32,
    /// Configuration time.
    #[serde(default)]
    pub conf_time: u32,
    /// Execution time.
    #[serde(default, alias = "exectime")]
    pub exec_time: u32,
    #[serde(default)]
    status: TaskStatus,
    #[serde(default)]
    children: BTreeSet<u32>,
    #[serde(default)]
    parents: BTreeSet<u32>,
}

impl Task {
    /// Creates a waiting task with no dependencies.
    pub fn new(id: u32, clb: u32, dsp: u32, bram: u32, exec_time: u32) -> Self {
        Self {
            id,
            clb,
            dsp,
            bram,
            conf_time: 0,
            exec_time,
            status: TaskStatus::Waiting,
            children: BTreeSet::new(),
            parents: BTreeSet::new(),
        }
    }

    /// The resource vector in clustering order: logic, DSP, memory.
    pub fn resources(&self) -> [f64; 3] {
        [f64::from(self.clb), f64::from(self.dsp), f64::from(self.bram)]
    }

    /// The current status.
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Moves the task to `to`, which must be the next lifecycle state.
    pub fn transition(&mut self, to: TaskStatus) -> Result<(), ModelError> {
        if self.status.next() != Some(to) {
            return Err(ModelError::IllegalTransition {
                id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Ids of tasks that may only start after this one ends.
    pub fn children(&self) -> &BTreeSet<u32> {
        &self.children
    }

    /// Ids of tasks this one waits for.
    pub fn parents(&self) -> &BTreeSet<u32> {
        &self.parents
    }

    /// Returns `true` if no task precedes this one.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Adds a dependency edge `parent -> child` between two tasks of `tasks`.
    pub fn link(tasks: &mut [Task], parent: u32, child: u32) -> Result<(), ModelError> {
        let find = |tasks: &[Task], id: u32| {
            tasks
                .iter()
                .position(|t| t.id == id)
                .ok_or(ModelError::UnknownTask(id))
        };
        let p = find(tasks, parent)?;
        let c = find(tasks, child)?;
        tasks[p].children.insert(child);
        tasks[c].parents.insert(parent);
        Ok(())
    }
}

#[derive(Deserialize)]
struct TaskList {
    tasks: Vec<Task>,
}

/// Parses a task list of the form `{"tasks": [{"id", "clb", "dsp", "bram", "exectime"}]}`.
pub fn load_tasks_json(text: &str) -> Result<Vec<Task>, ModelError> {
    let list: TaskList = serde_json::from_str(text)?;
    Ok(list.tasks)
}
