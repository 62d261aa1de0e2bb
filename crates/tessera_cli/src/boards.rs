//! `tessera boards`: list the built-in fabrics.

use serde::Serialize;

use tessera_arch::Board;
use tessera_common::ResourceKind;

use crate::{BoardsArgs, ReportFormat};

#[derive(Debug, Serialize)]
struct BoardRow {
    name: &'static str,
    device: &'static str,
    columns: u32,
    clock_rows: u32,
    forbidden: usize,
    clb: u32,
    bram: u32,
    dsp: u32,
}

fn rows() -> Result<Vec<BoardRow>, Box<dyn std::error::Error>> {
    Board::ALL
        .iter()
        .map(|&board| {
            let topo = board.topology()?;
            Ok(BoardRow {
                name: board.name(),
                device: board.device(),
                columns: topo.width(),
                clock_rows: topo.clock_rows(),
                forbidden: topo.forbidden().len(),
                clb: topo.capacity(ResourceKind::Clb),
                bram: topo.capacity(ResourceKind::Bram),
                dsp: topo.capacity(ResourceKind::Dsp),
            })
        })
        .collect()
}

/// Runs the `tessera boards` command.
pub fn run(args: &BoardsArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let rows = rows()?;
    match args.format {
        ReportFormat::Text => {
            println!(
                "{:<8}{:<22}{:>8}{:>6}{:>11}{:>8}{:>6}{:>6}",
                "board", "device", "columns", "rows", "forbidden", "clb", "bram", "dsp"
            );
            for r in &rows {
                println!(
                    "{:<8}{:<22}{:>8}{:>6}{:>11}{:>8}{:>6}{:>6}",
                    r.name, r.device, r.columns, r.clock_rows, r.forbidden, r.clb, r.bram, r.dsp
                );
            }
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_board_listed() {
        let rows = rows().unwrap();
        assert_eq!(rows.len(), Board::ALL.len());
        assert_eq!(rows[1].name, "pynq");
        assert_eq!(rows[1].columns, 70);
        assert!(rows.iter().all(|r| r.clb > 0));
    }
}
