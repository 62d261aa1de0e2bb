//! Board topology descriptors for the Tessera floorplanner.
//!
//! A [`BoardTopology`] describes one FPGA fabric as seen by the slot
//! floorplanner: a left-to-right map of column kinds, the number of
//! clock-region rows, the per-tile resource granularity, the forbidden
//! rectangles reserved for static logic, and the piecewise breakpoint tables
//! that turn a column boundary into a cumulative resource count.
//!
//! # Usage
//!
//! ```
//! use tessera_arch::load_board;
//! use tessera_common::ResourceKind;
//!
//! let board = load_board("pynq").unwrap();
//! assert_eq!(board.width(), 70);
//! assert_eq!(board.fabric_table(ResourceKind::Bram).eval(5), Some(1));
//! ```

#![warn(missing_docs)]

pub mod catalogue;
pub mod error;
pub mod piecewise;
pub mod topology;
pub mod types;

pub use catalogue::{supported_boards, Board};
pub use error::TopologyError;
pub use piecewise::{PiecewiseTable, Segment};
pub use topology::{BoardSpec, BoardTopology};
pub use types::{parse_columns, ClockRegion, ColumnKind, ForbiddenRegion, Rect, TileGranularity};

/// Loads a built-in board by name or alias (case-insensitive).
///
/// # Errors
///
/// Returns [`TopologyError::UnknownBoard`] if no catalogue entry matches.
pub fn load_board(name: &str) -> Result<BoardTopology, TopologyError> {
    match Board::from_name(name) {
        Some(board) => board.topology(),
        None => Err(TopologyError::UnknownBoard {
            name: name.to_string(),
            supported: supported_boards(),
        }),
    }
}
