//! Pairwise non-overlap and seam avoidance.

use tessera_arch::BoardTopology;
use tessera_milp::{LinExpr, VarId};

use super::FloorplanModel;
use crate::param::EngineInput;

/// Ordering indicators of one slot pair `(i, k)`.
struct PairOrder {
    gamma: VarId,
    theta: VarId,
    right_of_i: VarId,
    right_of_k: VarId,
    above_i: VarId,
    above_k: VarId,
}

impl FloorplanModel {
    pub(super) fn add_overlap_layer(&mut self, input: &EngineInput, board: &BoardTopology) {
        let mx = f64::from(board.width()) + 1.0;
        let my = f64::from(board.clock_rows()) + 1.0;

        for i in 0..self.slots.len() {
            for k in i + 1..self.slots.len() {
                let group = format!("overlap[s{i},s{k}]");
                let order = self.pair_order(i, k, mx, my, &group);
                let delta = self.model.binary(format!("delta[s{i},s{k}]"));

                // delta >= sum of the four indicators of a case - 3
                let cases = [
                    (false, false, order.right_of_i, order.above_i),
                    (true, false, order.right_of_k, order.above_i),
                    (false, true, order.right_of_i, order.above_k),
                    (true, true, order.right_of_k, order.above_k),
                ];
                for (flip_x, flip_y, reach_x, reach_y) in cases {
                    let mut e = LinExpr::from(delta) - reach_x - reach_y;
                    let mut rhs = -3.0;
                    if flip_x {
                        e += order.gamma;
                        rhs += 1.0;
                    } else {
                        e -= order.gamma;
                    }
                    if flip_y {
                        e += order.theta;
                        rhs += 1.0;
                    } else {
                        e -= order.theta;
                    }
                    self.model.ge(group.clone(), e, rhs);
                }

                if input.options.enforce_non_overlap {
                    self.model.le(
                        format!("no_overlap[s{i},s{k}]"),
                        LinExpr::from(delta) + self.used[i] + self.used[k],
                        2.0,
                    );
                }
            }
        }

        self.add_seam_avoidance(board);
    }

    fn pair_order(&mut self, i: usize, k: usize, mx: f64, my: f64, group: &str) -> PairOrder {
        let (a, b) = (self.slots[i].clone(), self.slots[k].clone());
        let (ha, hb) = (a.height(), b.height());
        let mut indicator = |name: &str| self.model.binary(format!("{name}[s{i},s{k}]"));
        let order = PairOrder {
            gamma: indicator("gamma"),
            theta: indicator("theta"),
            right_of_i: indicator("Gamma"),
            right_of_k: indicator("Alpha"),
            above_i: indicator("Omega"),
            above_k: indicator("Psi"),
        };
        let g = group.to_string();

        // gamma: slot k starts at or right of slot i.
        self.model.ge(
            g.clone(),
            LinExpr::term(order.gamma, mx) - b.x0 + a.x0,
            1.0,
        );
        // theta: slot k starts at or above slot i.
        self.model
            .ge(g.clone(), LinExpr::term(order.theta, my) - b.y + a.y, 1.0);
        // Gamma: slot i reaches past the left edge of k.
        self.model
            .ge(g.clone(), LinExpr::term(order.right_of_i, mx) - a.x1 + b.x0, 0.0);
        // Alpha: slot k reaches past the left edge of i.
        self.model
            .ge(g.clone(), LinExpr::term(order.right_of_k, mx) - b.x1 + a.x0, 0.0);
        // Omega: slot i reaches past the bottom of k.
        self.model.ge(
            g.clone(),
            LinExpr::term(order.above_i, my) - ha - a.y + b.y,
            0.0,
        );
        // Psi: slot k reaches past the bottom of i.
        self.model
            .ge(g, LinExpr::term(order.above_k, my) - hb - b.y + a.y, 0.0);
        order
    }

    /// Keeps the edges of used slots off memory and DSP column seams.
    fn add_seam_avoidance(&mut self, board: &BoardTopology) {
        let m = f64::from(board.width()) + 2.0;
        let left = board.left_seams();
        let right = board.right_seams();
        for s in 0..self.slots.len() {
            let group = format!("seams[s{s}]");
            let used = self.used[s];
            let edges = [(self.slots[s].x0, &left, "l"), (self.slots[s].x1, &right, "r")];
            for (edge, seams, side) in edges {
                for &e in seams.iter() {
                    let e = f64::from(e);
                    let kappa = self.model.binary(format!("kappa[s{s},{side}{e}]"));
                    // edge <= e - 1 + M*kappa + M*(1 - used)
                    self.model.le(
                        group.clone(),
                        LinExpr::from(edge) - LinExpr::term(kappa, m) + LinExpr::term(used, m),
                        e - 1.0 + m,
                    );
                    // edge >= e + 1 - M*(1 - kappa) - M*(1 - used)
                    self.model.ge(
                        group.clone(),
                        LinExpr::from(edge) - LinExpr::term(kappa, m) - LinExpr::term(used, m),
                        e + 1.0 - 2.0 * m,
                    );
                }
            }
        }
    }
}
