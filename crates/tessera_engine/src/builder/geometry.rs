//! Slot shape and the piecewise-linear resource counts it encloses.

use tessera_arch::{BoardTopology, PiecewiseTable};
use tessera_common::ResourceKind;
use tessera_milp::{LinExpr, VarId};

use super::{FloorplanModel, SlotVars};
use crate::param::EngineInput;

impl FloorplanModel {
    pub(super) fn add_geometry_layer(&mut self, input: &EngineInput, board: &BoardTopology) {
        let width = f64::from(board.width());
        let rows = board.clock_rows() as usize;
        let height = rows as f64;
        let granularity = board.granularity();

        let mut fabric_total: Vec<LinExpr> = vec![LinExpr::new(); ResourceKind::ALL.len()];

        for s in 0..input.num_slots {
            let used = self.used[s];
            let shape = format!("shape[s{s}]");

            let x0 = self.model.integer(format!("x0[s{s}]"), 0.0, width);
            let x1 = self.model.integer(format!("x1[s{s}]"), 0.0, width);
            let y = self.model.integer(format!("y[s{s}]"), 0.0, height);
            let beta: Vec<VarId> = (0..rows)
                .map(|j| self.model.binary(format!("beta[s{s},cr{j}]")))
                .collect();
            let h = LinExpr::sum(beta.iter().copied());

            // Step 1: a used slot is at least one column wide and one clock
            // region tall, and lies inside the fabric.
            self.model
                .ge(shape.clone(), LinExpr::from(x1) - x0 - used, 0.0);
            self.model.ge(shape.clone(), h.clone() - used, 0.0);
            self.model.le(shape.clone(), h.clone() + y, height);

            // Step 2: occupied clock regions are contiguous and start at y.
            for j in 0..rows.saturating_sub(2) {
                self.model.ge(
                    shape.clone(),
                    LinExpr::from(beta[j + 1]) - beta[j] - beta[j + 2],
                    -1.0,
                );
            }
            for (j, &b) in beta.iter().enumerate() {
                let row = j as f64;
                self.model
                    .le(shape.clone(), LinExpr::from(y) + LinExpr::term(b, height), row + height);
                self.model.ge(
                    shape.clone(),
                    h.clone() + y - LinExpr::term(b, height + 1.0),
                    row - height,
                );
            }

            // Step 3: usable resources per kind, net of forbidden regions.
            let mut usable = Vec::with_capacity(ResourceKind::ALL.len());
            let mut wasted = Vec::with_capacity(ResourceKind::ALL.len());
            for kind in ResourceKind::ALL {
                let r = kind.index();
                let name = kind.name();
                let table = board.fabric_table(kind);
                let span = self.lookup(s, name, x1, table) - self.lookup(s, name, x0, table);
                let mut tiles = if table.max_value() == 0 {
                    LinExpr::new()
                } else {
                    self.occupied(s, name, &beta, 0..rows, span, table.max_value())
                };

                for (f, region) in board.forbidden().iter().enumerate() {
                    let Some(table) = board.forbidden_table(f, kind) else {
                        continue;
                    };
                    if table.max_value() == 0 {
                        continue;
                    }
                    let tag = format!("{name},f{f}");
                    let span = self.lookup(s, &tag, x1, table) - self.lookup(s, &tag, x0, table);
                    let covered = region.rect.y as usize..(region.rect.top() as usize).min(rows);
                    tiles -= self.occupied(s, &tag, &beta, covered, span, table.max_value());
                }

                let amount = tiles * f64::from(granularity.get(kind));
                let b = self.alloc[r][s];
                self.model
                    .ge(format!("fit[s{s}]"), amount.clone() - b, 0.0);
                self.model.le(
                    format!("idle[s{s}]"),
                    amount.clone() - LinExpr::term(used, f64::from(board.capacity(kind))),
                    0.0,
                );
                let w = self
                    .model
                    .continuous(format!("wasted[s{s},{name}]"), 0.0, None);
                self.model.equal(
                    format!("waste[s{s}]"),
                    LinExpr::from(w) - amount.clone() + b,
                    0.0,
                );
                fabric_total[r] += amount.clone();
                usable.push(amount);
                wasted.push(w);
            }

            self.slots.push(SlotVars {
                x0,
                x1,
                y,
                beta,
                usable,
                wasted,
            });
        }

        // Step 4: everything handed out fits on the fabric.
        for (kind, total) in ResourceKind::ALL.into_iter().zip(fabric_total) {
            let limit = input.platform.capacity()[kind.index()];
            self.model
                .le(format!("capacity_fabric[{}]", kind.name()), total, limit);
        }
    }

    /// Links a count variable to boundary `x` through `table`.
    ///
    /// One binary selects the segment containing `x`; the count is pinned to
    /// that segment's line from both sides. Flat and single-segment tables
    /// need no selector.
    fn lookup(&mut self, slot: usize, tag: &str, x: VarId, table: &PiecewiseTable) -> LinExpr {
        let segments = table.segments();
        if table.max_value() == 0 {
            return LinExpr::new();
        }
        if let [only] = segments {
            return LinExpr::term(x, only.slope as f64) + only.offset as f64;
        }

        let group = format!("boundary[s{slot}]");
        let m = table.big_m();
        let xname = self.model.var_name(x).unwrap_or("x").to_string();
        let count = self
            .model
            .integer(format!("cnt[{tag},{xname}]"), 0.0, table.max_value() as f64);
        let mut selectors = LinExpr::new();
        for (i, seg) in segments.iter().enumerate() {
            let z = self.model.binary(format!("z[{tag},{xname},{i}]"));
            selectors += z;
            // x >= lo - M(1 - z), x <= hi + M(1 - z)
            self.model
                .ge(group.clone(), LinExpr::from(x) - LinExpr::term(z, m), f64::from(seg.lo) - m);
            self.model
                .le(group.clone(), LinExpr::from(x) + LinExpr::term(z, m), f64::from(seg.hi) + m);
            // count == slope * x + offset when z is set
            let line = LinExpr::from(count) - LinExpr::term(x, seg.slope as f64);
            self.model.ge(
                group.clone(),
                line.clone() - LinExpr::term(z, m),
                seg.offset as f64 - m,
            );
            self.model
                .le(group.clone(), line + LinExpr::term(z, m), seg.offset as f64 + m);
        }
        self.model.equal(group, selectors, 1.0);
        LinExpr::from(count)
    }

    /// Sums `span` over the occupied rows in `rows`, linearized through one
    /// `tau` variable per row.
    fn occupied(
        &mut self,
        slot: usize,
        tag: &str,
        beta: &[VarId],
        rows: std::ops::Range<usize>,
        span: LinExpr,
        upper: i64,
    ) -> LinExpr {
        let group = format!("usable[s{slot}]");
        let u = upper as f64;
        let mut total = LinExpr::new();
        for j in rows {
            let tau = self
                .model
                .continuous(format!("tau[s{slot},{tag},cr{j}]"), 0.0, Some(u));
            self.model
                .le(group.clone(), LinExpr::from(tau) - LinExpr::term(beta[j], u), 0.0);
            self.model
                .le(group.clone(), LinExpr::from(tau) - span.clone(), 0.0);
            self.model.ge(
                group.clone(),
                LinExpr::from(tau) - span.clone() - LinExpr::term(beta[j], u),
                -u,
            );
            total += tau;
        }
        total
    }
}
