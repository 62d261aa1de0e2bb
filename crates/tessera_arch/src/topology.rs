//! The [`BoardTopology`] descriptor consumed by the floorplanning engine.

use serde::{Deserialize, Serialize};
use tessera_common::ResourceKind;

use crate::error::TopologyError;
use crate::piecewise::PiecewiseTable;
use crate::types::{ClockRegion, ColumnKind, ForbiddenRegion, Rect, TileGranularity};

/// A read-only description of one board's reconfigurable fabric.
///
/// Built once from a column map, a clock-row count and the forbidden-region
/// list. All breakpoint tables are derived at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardTopology {
    name: String,
    device: String,
    columns: Vec<ColumnKind>,
    clock_rows: u32,
    rows_per_clock_region: u32,
    granularity: TileGranularity,
    forbidden: Vec<ForbiddenRegion>,
    reconfig_time_per_unit: [f64; 3],
    clock_regions: Vec<ClockRegion>,
    fabric_tables: [PiecewiseTable; 3],
    forbidden_tables: Vec<[PiecewiseTable; 3]>,
}

/// The parameters from which a [`BoardTopology`] is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSpec {
    /// Board name.
    pub name: String,
    /// Device part number.
    pub device: String,
    /// Column kinds from left to right.
    pub columns: Vec<ColumnKind>,
    /// Number of clock-region rows.
    pub clock_rows: u32,
    /// Placement rows per clock region, used to scale reported `y` and `h`.
    pub rows_per_clock_region: u32,
    /// Resources per column per clock region.
    pub granularity: TileGranularity,
    /// Reserved rectangles.
    pub forbidden: Vec<ForbiddenRegion>,
    /// Reconfiguration time per resource unit, in canonical resource order.
    pub reconfig_time_per_unit: [f64; 3],
}

impl BoardTopology {
    /// Derives a topology from a [`BoardSpec`].
    ///
    /// # Errors
    ///
    /// Fails on an empty column map or zero clock rows. Forbidden regions
    /// must lie inside the fabric and must not overlap one another.
    pub fn new(spec: BoardSpec) -> Result<Self, TopologyError> {
        if spec.columns.is_empty() {
            return Err(TopologyError::EmptyFabric(spec.name));
        }
        if spec.clock_rows == 0 {
            return Err(TopologyError::NoClockRows(spec.name));
        }
        let width = spec.columns.len() as u32;
        for f in &spec.forbidden {
            let right = f.rect.x.checked_add(f.rect.w);
            let top = f.rect.y.checked_add(f.rect.h);
            if f.rect.is_empty()
                || right.map_or(true, |r| r > width)
                || top.map_or(true, |t| t > spec.clock_rows)
            {
                return Err(TopologyError::ForbiddenOutOfBounds {
                    board: spec.name,
                    rect: f.rect,
                    width,
                    height: spec.clock_rows,
                });
            }
        }
        for (i, a) in spec.forbidden.iter().enumerate() {
            if let Some(b) = spec.forbidden[i + 1..].iter().find(|b| a.rect.overlaps(&b.rect)) {
                return Err(TopologyError::ForbiddenOverlap {
                    board: spec.name,
                    first: a.rect,
                    second: b.rect,
                });
            }
        }

        let columns = spec.columns;
        let table_for = |kind: ResourceKind, from: u32, to: u32| {
            PiecewiseTable::counting(width, from, to, |c| {
                columns[c as usize].resource() == Some(kind)
            })
        };
        let fabric_tables = ResourceKind::ALL.map(|kind| table_for(kind, 0, width));
        let forbidden_tables = spec
            .forbidden
            .iter()
            .map(|f| ResourceKind::ALL.map(|kind| table_for(kind, f.rect.x, f.rect.right())))
            .collect();
        let clock_regions = derive_clock_regions(&columns, spec.clock_rows);

        Ok(Self {
            name: spec.name,
            device: spec.device,
            columns,
            clock_rows: spec.clock_rows,
            rows_per_clock_region: spec.rows_per_clock_region.max(1),
            granularity: spec.granularity,
            forbidden: spec.forbidden,
            reconfig_time_per_unit: spec.reconfig_time_per_unit,
            clock_regions,
            fabric_tables,
            forbidden_tables,
        })
    }

    /// The board name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The device part number.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Fabric width in columns.
    pub fn width(&self) -> u32 {
        self.columns.len() as u32
    }

    /// Number of clock-region rows.
    pub fn clock_rows(&self) -> u32 {
        self.clock_rows
    }

    /// Placement rows per clock region.
    pub fn rows_per_clock_region(&self) -> u32 {
        self.rows_per_clock_region
    }

    /// The column map.
    pub fn columns(&self) -> &[ColumnKind] {
        &self.columns
    }

    /// Resources per column per clock region.
    pub fn granularity(&self) -> TileGranularity {
        self.granularity
    }

    /// Reserved rectangles.
    pub fn forbidden(&self) -> &[ForbiddenRegion] {
        &self.forbidden
    }

    /// Reconfiguration time per resource unit, in canonical order.
    pub fn reconfig_time_per_unit(&self) -> [f64; 3] {
        self.reconfig_time_per_unit
    }

    /// The clock-region table.
    pub fn clock_regions(&self) -> &[ClockRegion] {
        &self.clock_regions
    }

    /// The whole-fabric cumulative column table for `kind`.
    pub fn fabric_table(&self, kind: ResourceKind) -> &PiecewiseTable {
        &self.fabric_tables[kind.index()]
    }

    /// The cumulative column table of `kind` restricted to forbidden region `index`.
    pub fn forbidden_table(&self, index: usize, kind: ResourceKind) -> Option<&PiecewiseTable> {
        self.forbidden_tables.get(index).map(|t| &t[kind.index()])
    }

    /// Columns of `kind` in the half-open range `[x0, x1)`.
    pub fn columns_between(&self, kind: ResourceKind, x0: u32, x1: u32) -> u32 {
        let end = x1.min(self.width());
        (x0.min(end)..end)
            .filter(|&c| self.columns[c as usize].resource() == Some(kind))
            .count() as u32
    }

    /// Usable resources of `kind` inside `rect`, net of forbidden regions.
    ///
    /// This is the quantity the solver model reproduces through its piecewise
    /// tables; result extraction and tests use it as ground truth.
    pub fn usable(&self, kind: ResourceKind, rect: &Rect) -> u32 {
        let mut tiles = 0u32;
        for row in rect.y..rect.top().min(self.clock_rows) {
            tiles += self.columns_between(kind, rect.x, rect.right());
            for f in &self.forbidden {
                if f.rect.covers_row(row) {
                    let lo = rect.x.max(f.rect.x);
                    let hi = rect.right().min(f.rect.right());
                    if lo < hi {
                        tiles -= self.columns_between(kind, lo, hi);
                    }
                }
            }
        }
        tiles * self.granularity.get(kind)
    }

    /// Total usable resources of `kind` on the whole fabric.
    pub fn capacity(&self, kind: ResourceKind) -> u32 {
        self.usable(kind, &Rect::new(0, 0, self.width(), self.clock_rows))
    }

    /// Column boundaries a slot's left edge may not sit on.
    ///
    /// A slot must not start or end on a memory or DSP column, since those
    /// tiles span the seam between neighbouring logic columns.
    pub fn left_seams(&self) -> Vec<u32> {
        self.hard_columns().collect()
    }

    /// Column boundaries a slot's right edge may not sit on.
    pub fn right_seams(&self) -> Vec<u32> {
        self.hard_columns().map(|c| c + 1).collect()
    }

    fn hard_columns(&self) -> impl Iterator<Item = u32> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, k)| matches!(k, ColumnKind::Bram | ColumnKind::Dsp))
            .map(|(c, _)| c as u32)
    }
}

/// Splits each clock row at the clock spine, if there is one.
fn derive_clock_regions(columns: &[ColumnKind], rows: u32) -> Vec<ClockRegion> {
    let width = columns.len() as u32;
    let spine = columns.iter().position(|k| *k == ColumnKind::Clock);
    let spans: Vec<(u32, u32)> = match spine {
        Some(s) => vec![(0, s as u32), (s as u32 + 1, width)],
        None => vec![(0, width)],
    };
    let count = |kind: ColumnKind, lo: u32, hi: u32| {
        columns[lo as usize..hi as usize]
            .iter()
            .filter(|k| **k == kind)
            .count() as u32
    };
    let mut regions = Vec::new();
    for row in 0..rows {
        for &(lo, hi) in &spans {
            if lo >= hi {
                continue;
            }
            regions.push(ClockRegion {
                rect: Rect::new(lo, row, hi - lo, 1),
                clb_columns: count(ColumnKind::Clb, lo, hi),
                bram_columns: count(ColumnKind::Bram, lo, hi),
                dsp_columns: count(ColumnKind::Dsp, lo, hi),
            });
        }
    }
    regions
}
