//! Normalized Manhattan distance between connected slot centroids.

use std::collections::BTreeMap;

use tessera_arch::BoardTopology;
use tessera_milp::{LinExpr, VarId};

use super::FloorplanModel;
use crate::param::EngineInput;

impl FloorplanModel {
    /// Adds centroid and distance variables and returns the wirelength term,
    /// scaled into `[0, 1]`.
    pub(super) fn add_wirelength(&mut self, input: &EngineInput, board: &BoardTopology) -> LinExpr {
        let rows = f64::from(board.rows_per_clock_region());
        let width = f64::from(board.width());
        let height = f64::from(board.clock_rows());

        let mut centroids: BTreeMap<usize, (VarId, VarId)> = BTreeMap::new();
        for c in &input.connections {
            for s in [c.from.index(), c.to.index()] {
                if centroids.contains_key(&s) {
                    continue;
                }
                let slot = self.slots[s].clone();
                let group = format!("centroid[s{s}]");
                let cx = self
                    .model
                    .continuous(format!("cx[s{s}]"), 0.0, Some(width));
                let cy = self
                    .model
                    .continuous(format!("cy[s{s}]"), 0.0, Some(rows * height));
                // cx = (x0 + x1) / 2
                self.model.equal(
                    group.clone(),
                    LinExpr::term(cx, 2.0) - slot.x0 - slot.x1,
                    0.0,
                );
                // cy = rows * (y + h / 2)
                self.model.equal(
                    group,
                    LinExpr::from(cy) - LinExpr::term(slot.y, rows) - slot.height() * (rows / 2.0),
                    0.0,
                );
                centroids.insert(s, (cx, cy));
            }
        }

        let mut norm = 0.0;
        let mut total = LinExpr::new();
        for (n, c) in input.connections.iter().enumerate() {
            let (Some(&(ax, ay)), Some(&(bx, by))) =
                (centroids.get(&c.from.index()), centroids.get(&c.to.index()))
            else {
                continue;
            };
            let group = format!("wirelength[c{n}]");
            for (axis, a, b) in [("x", ax, bx), ("y", ay, by)] {
                let d = self
                    .model
                    .continuous(format!("d{axis}[c{n}]"), 0.0, None);
                self.model
                    .ge(group.clone(), LinExpr::from(d) - a + b, 0.0);
                self.model
                    .ge(group.clone(), LinExpr::from(d) - b + a, 0.0);
                total.add_term(d, c.weight);
            }
            norm += c.weight * (width + rows * height);
        }

        if norm > 0.0 {
            total * (1.0 / norm)
        } else {
            LinExpr::new()
        }
    }
}
