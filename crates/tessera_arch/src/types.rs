//! Shared data types for board topology descriptors.
//!
//! Coordinates are in fabric units: `x` counts columns from the left edge and
//! `y` counts clock-region rows from the bottom. A [`Rect`] covers the
//! half-open column range `[x, x + w)` and row range `[y, y + h)`.

use serde::{Deserialize, Serialize};
use std::fmt;
use tessera_common::ResourceKind;

use crate::error::TopologyError;

/// The kind of a single fabric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Configurable logic blocks.
    Clb,
    /// Block RAM.
    Bram,
    /// DSP slices.
    Dsp,
    /// The central clock spine. Holds no user resources.
    Clock,
    /// A reserved column (e.g. configuration or PS interface) with no user resources.
    Reserved,
}

impl ColumnKind {
    /// Parses a column map character: `C`, `B`, `D`, `K`, or `X`.
    pub fn from_char(ch: char) -> Option<Self> {
        match ch.to_ascii_uppercase() {
            'C' => Some(Self::Clb),
            'B' => Some(Self::Bram),
            'D' => Some(Self::Dsp),
            'K' => Some(Self::Clock),
            'X' => Some(Self::Reserved),
            _ => None,
        }
    }

    /// Returns the column map character for this kind.
    pub fn as_char(self) -> char {
        match self {
            Self::Clb => 'C',
            Self::Bram => 'B',
            Self::Dsp => 'D',
            Self::Clock => 'K',
            Self::Reserved => 'X',
        }
    }

    /// Returns the resource this column provides, if any.
    pub fn resource(self) -> Option<ResourceKind> {
        match self {
            Self::Clb => Some(ResourceKind::Clb),
            Self::Bram => Some(ResourceKind::Bram),
            Self::Dsp => Some(ResourceKind::Dsp),
            Self::Clock | Self::Reserved => None,
        }
    }
}

/// Parses a column map string such as `"CCBCDC"` into column kinds.
pub fn parse_columns(map: &str) -> Result<Vec<ColumnKind>, TopologyError> {
    map.chars()
        .filter(|c| !c.is_whitespace())
        .enumerate()
        .map(|(i, ch)| {
            ColumnKind::from_char(ch).ok_or(TopologyError::InvalidColumn {
                ch,
                column: i as u32,
            })
        })
        .collect()
}

/// An integer rectangle in fabric units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left column.
    pub x: u32,
    /// Bottom clock-region row.
    pub y: u32,
    /// Width in columns.
    pub w: u32,
    /// Height in clock-region rows.
    pub h: u32,
}

impl Rect {
    /// Creates a new rectangle.
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// One past the rightmost column.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    /// One past the topmost row.
    pub fn top(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    /// Returns `true` if the rectangle covers no cells.
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Returns `true` if the rectangle covers clock-region row `row`.
    pub fn covers_row(&self, row: u32) -> bool {
        row >= self.y && row < self.top()
    }

    /// Returns `true` if the two rectangles share at least one cell.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.top()
            && other.y < self.top()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.w, self.h)
    }
}

/// Resources contributed by one column within one clock region.
///
/// A 7-series logic column holds 50 CLBs per clock region, a memory column
/// 10 RAMB36 tiles and a DSP column 20 DSP48 slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGranularity {
    /// CLBs per logic column per clock region.
    pub clb: u32,
    /// Block RAMs per memory column per clock region.
    pub bram: u32,
    /// DSPs per DSP column per clock region.
    pub dsp: u32,
}

impl TileGranularity {
    /// The 7-series granularity.
    pub const SERIES7: Self = Self {
        clb: 50,
        bram: 10,
        dsp: 20,
    };

    /// Returns the per-tile count for the given resource.
    pub fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Clb => self.clb,
            ResourceKind::Bram => self.bram,
            ResourceKind::Dsp => self.dsp,
        }
    }
}

impl Default for TileGranularity {
    fn default() -> Self {
        Self::SERIES7
    }
}

/// One clock region: its rectangle and how many columns of each resource it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockRegion {
    /// Region rectangle (always one row high).
    pub rect: Rect,
    /// Logic columns inside the region.
    pub clb_columns: u32,
    /// Memory columns inside the region.
    pub bram_columns: u32,
    /// DSP columns inside the region.
    pub dsp_columns: u32,
}

impl ClockRegion {
    /// Returns the column count for the given resource.
    pub fn columns(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Clb => self.clb_columns,
            ResourceKind::Bram => self.bram_columns,
            ResourceKind::Dsp => self.dsp_columns,
        }
    }
}

/// A fixed rectangle whose resources never count towards a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForbiddenRegion {
    /// The reserved rectangle.
    pub rect: Rect,
}

impl ForbiddenRegion {
    /// Creates a forbidden region from a rectangle.
    pub const fn new(rect: Rect) -> Self {
        Self { rect }
    }
}
