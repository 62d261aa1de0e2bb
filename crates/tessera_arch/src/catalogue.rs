//! Built-in board catalogue.
//!
//! Each entry is a column map read left to right (`C` logic, `B` memory, `D`
//! DSP, `K` clock spine, `X` reserved), the number of clock-region rows, and
//! the forbidden rectangles reserved for static logic. All three boards are
//! 7-series parts and share the same tile granularity.

use serde::{Deserialize, Serialize};

use crate::error::TopologyError;
use crate::topology::{BoardSpec, BoardTopology};
use crate::types::{parse_columns, ForbiddenRegion, Rect, TileGranularity};

/// The closed set of built-in boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Board {
    /// Small: Zybo with a Zynq-7010.
    Zybo,
    /// Medium: PYNQ-Z1 with a Zynq-7020.
    Pynq,
    /// Large: VC707 with a Virtex-7 485T.
    Vc707,
}

/// Static parameters of one catalogue board.
struct BoardEntry {
    board: Board,
    name: &'static str,
    aliases: &'static [&'static str],
    device: &'static str,
    columns: &'static str,
    clock_rows: u32,
    rows_per_clock_region: u32,
    forbidden: &'static [Rect],
    reconfig_time_per_unit: [f64; 3],
}

const BOARDS: &[BoardEntry] = &[
    BoardEntry {
        board: Board::Zybo,
        name: "zybo",
        aliases: &["zynq", "xc7z010", "small"],
        device: "xc7z010clg400-1",
        columns: "CCCCBCCDCCCCCCKCCCCCBCCDCCCCC",
        clock_rows: 2,
        rows_per_clock_region: 10,
        forbidden: &[Rect::new(0, 1, 5, 1), Rect::new(26, 0, 3, 1)],
        reconfig_time_per_unit: [1.0 / 4500.0, 1.0 / 4500.0, 1.0 / 4000.0],
    },
    BoardEntry {
        board: Board::Pynq,
        name: "pynq",
        aliases: &["pynq-z1", "pynq_z1", "xc7z020", "medium"],
        device: "xc7z020clg400-1",
        columns: "CCCCBCCDCCCCDCCBCCCCBCCDCCCCCCCKCCBCCCCCCCCCCCCCXCCCCCBCCDCCCCDCCBCCCC",
        clock_rows: 3,
        rows_per_clock_region: 10,
        forbidden: &[
            Rect::new(0, 1, 17, 2),
            Rect::new(42, 1, 6, 2),
            Rect::new(47, 0, 2, 1),
        ],
        reconfig_time_per_unit: [1.0 / 4500.0, 1.0 / 4500.0, 1.0 / 4000.0],
    },
    BoardEntry {
        board: Board::Vc707,
        name: "vc707",
        aliases: &["virtex7", "virtex-7", "xc7vx485t", "large"],
        device: "xc7vx485tffg1761-2",
        columns: "XXCCCBCCDCCCCCCCBCCDCCCCCCCBCCDCCCCCCCBCCDCCCCCCCCDKCCCCDCCCBCCDCCCCCCCBCCDCCCCCCCBCCDCCCCCCCBCCCCCCCCC",
        clock_rows: 7,
        rows_per_clock_region: 10,
        forbidden: &[
            Rect::new(2, 2, 10, 2),
            Rect::new(30, 0, 8, 1),
            Rect::new(60, 4, 12, 2),
            Rect::new(95, 6, 8, 1),
        ],
        reconfig_time_per_unit: [1.0 / 6000.0, 1.0 / 6000.0, 1.0 / 5000.0],
    },
];

impl Board {
    /// All built-in boards, smallest first.
    pub const ALL: [Board; 3] = [Board::Zybo, Board::Pynq, Board::Vc707];

    fn entry(self) -> &'static BoardEntry {
        match self {
            Board::Zybo => &BOARDS[0],
            Board::Pynq => &BOARDS[1],
            Board::Vc707 => &BOARDS[2],
        }
    }

    /// Looks up a board by canonical name or alias, ignoring case.
    pub fn from_name(name: &str) -> Option<Board> {
        let wanted = name.trim().to_ascii_lowercase();
        BOARDS
            .iter()
            .find(|e| e.name == wanted || e.aliases.contains(&wanted.as_str()))
            .map(|e| e.board)
    }

    /// The canonical board name.
    pub fn name(self) -> &'static str {
        self.entry().name
    }

    /// The device part number.
    pub fn device(self) -> &'static str {
        self.entry().device
    }

    /// Builds the [`BoardSpec`] for this catalogue entry.
    pub fn spec(self) -> Result<BoardSpec, TopologyError> {
        let e = self.entry();
        Ok(BoardSpec {
            name: e.name.to_string(),
            device: e.device.to_string(),
            columns: parse_columns(e.columns)?,
            clock_rows: e.clock_rows,
            rows_per_clock_region: e.rows_per_clock_region,
            granularity: TileGranularity::SERIES7,
            forbidden: e.forbidden.iter().copied().map(ForbiddenRegion::new).collect(),
            reconfig_time_per_unit: e.reconfig_time_per_unit,
        })
    }

    /// Derives the full topology for this board.
    pub fn topology(self) -> Result<BoardTopology, TopologyError> {
        BoardTopology::new(self.spec()?)
    }
}

/// Comma-separated canonical names, for error messages.
pub fn supported_boards() -> String {
    BOARDS.iter().map(|e| e.name).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_common::ResourceKind;

    #[test]
    fn every_board_builds() {
        for board in Board::ALL {
            let topo = board.topology().unwrap();
            assert_eq!(topo.name(), board.name());
            for kind in ResourceKind::ALL {
                assert!(topo.fabric_table(kind).is_monotone());
            }
        }
    }

    #[test]
    fn pynq_dimensions() {
        let topo = Board::Pynq.topology().unwrap();
        assert_eq!(topo.width(), 70);
        assert_eq!(topo.clock_rows(), 3);
        assert_eq!(topo.forbidden().len(), 3);
        assert_eq!(topo.clock_regions().len(), 6);
        assert_eq!(topo.fabric_table(ResourceKind::Bram).max_value(), 6);
        assert_eq!(topo.fabric_table(ResourceKind::Dsp).max_value(), 5);
    }

    #[test]
    fn pynq_bram_breakpoints() {
        let t = Board::Pynq.topology().unwrap();
        let bram = t.fabric_table(ResourceKind::Bram);
        assert_eq!(bram.eval(4), Some(0));
        assert_eq!(bram.eval(5), Some(1));
        assert_eq!(bram.eval(16), Some(2));
        assert_eq!(bram.eval(21), Some(3));
        assert_eq!(bram.eval(70), Some(6));
    }

    #[test]
    fn pynq_logic_lines() {
        let t = Board::Pynq.topology().unwrap();
        let clb = t.fabric_table(ResourceKind::Clb);
        // Four logic columns precede the first memory column.
        assert_eq!(clb.eval(4), Some(4));
        assert_eq!(clb.eval(5), Some(4));
        assert_eq!(clb.eval(6), Some(5));
    }

    #[test]
    fn widths_by_size() {
        let widths: Vec<u32> = Board::ALL
            .iter()
            .map(|b| b.topology().unwrap().width())
            .collect();
        assert_eq!(widths, vec![29, 70, 103]);
    }

    #[test]
    fn lookup_aliases() {
        assert_eq!(Board::from_name("PYNQ"), Some(Board::Pynq));
        assert_eq!(Board::from_name("pynq-z1"), Some(Board::Pynq));
        assert_eq!(Board::from_name("zynq"), Some(Board::Zybo));
        assert_eq!(Board::from_name("virtex7"), Some(Board::Vc707));
        assert_eq!(Board::from_name("ultrascale"), None);
    }

    #[test]
    fn board_serde_roundtrip() {
        let json = serde_json::to_string(&Board::Vc707).unwrap();
        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Board::Vc707);
    }
}
