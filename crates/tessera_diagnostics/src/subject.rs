//! What a diagnostic refers to.

use serde::{Deserialize, Serialize};
use std::fmt;
use tessera_common::{HwTaskId, SlotId};

/// The entity a [`Diagnostic`](crate::Diagnostic) is about.
///
/// Floorplanning has no source text to point into, so diagnostics locate
/// themselves by naming a board, task, slot or solver constraint instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    /// Not attached to any particular entity.
    None,
    /// A board of the given name.
    Board(String),
    /// A hardware task.
    Task(HwTaskId),
    /// A fabric slot.
    Slot(SlotId),
    /// A named constraint group of the solver model.
    Constraint(String),
    /// A configuration file or key.
    Config(String),
}

impl Subject {
    /// Returns `true` if this subject carries no location.
    pub fn is_none(&self) -> bool {
        matches!(self, Subject::None)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::None => Ok(()),
            Subject::Board(name) => write!(f, "board '{name}'"),
            Subject::Task(id) => write!(f, "task #{id}"),
            Subject::Slot(id) => write!(f, "slot #{id}"),
            Subject::Constraint(name) => write!(f, "constraint {name}"),
            Subject::Config(key) => write!(f, "config {key}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(Subject::Task(HwTaskId::from_raw(2)).to_string(), "task #2");
        assert_eq!(Subject::Board("pynq".into()).to_string(), "board 'pynq'");
        assert_eq!(Subject::Constraint("assign[0]".into()).to_string(), "constraint assign[0]");
        assert_eq!(Subject::None.to_string(), "");
    }
}
