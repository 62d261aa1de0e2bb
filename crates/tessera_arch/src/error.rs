//! Error types for board topology construction.

use crate::types::Rect;

/// Errors raised while loading or building a board topology.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    /// The board name matched no catalogue entry or alias.
    #[error("unknown board: {name:?}. Supported: {supported}")]
    UnknownBoard {
        /// The requested name.
        name: String,
        /// Comma-separated list of canonical board names.
        supported: String,
    },

    /// A column map character is not a known column kind.
    #[error("invalid column character {ch:?} at column {column}")]
    InvalidColumn {
        /// The offending character.
        ch: char,
        /// Zero-based column position.
        column: u32,
    },

    /// The column map is empty.
    #[error("board '{0}' has no columns")]
    EmptyFabric(String),

    /// The board declares zero clock-region rows.
    #[error("board '{0}' has no clock-region rows")]
    NoClockRows(String),

    /// A forbidden region lies partly or wholly outside the fabric.
    #[error("forbidden region {rect} on board '{board}' lies outside the {width}x{height} fabric")]
    ForbiddenOutOfBounds {
        /// Board name.
        board: String,
        /// The offending rectangle.
        rect: Rect,
        /// Fabric width in columns.
        width: u32,
        /// Fabric height in clock-region rows.
        height: u32,
    },

    /// Two forbidden regions share at least one cell.
    #[error("forbidden regions {first} and {second} on board '{board}' overlap")]
    ForbiddenOverlap {
        /// Board name.
        board: String,
        /// The earlier rectangle.
        first: Rect,
        /// The later rectangle.
        second: Rect,
    },
}
