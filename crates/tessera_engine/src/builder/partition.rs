//! Task-to-partition assignment and real-time schedulability.

use tessera_milp::{LinExpr, VarId};

use super::{resource_label, FloorplanModel};
use crate::param::EngineInput;

impl FloorplanModel {
    pub(super) fn add_partition_layer(&mut self, input: &EngineInput) {
        let set = &input.taskset;
        let tasks = set.hw_tasks();
        let n = tasks.len();
        let parts = input.num_slots;
        let cap = input.platform.capacity();
        let rate = input.platform.reconfig_time_per_unit();
        let geometric = input.board.is_some();

        // Step 1: every task in exactly one partition.
        for a in 0..n {
            let row: Vec<VarId> = (0..parts)
                .map(|k| self.model.binary(format!("A[t{a},p{k}]")))
                .collect();
            self.model.equal(
                format!("assign[t{a}]"),
                LinExpr::sum(row.iter().copied()),
                1.0,
            );
            self.assign.push(row);
        }

        // Step 2: a partition is used iff it hosts a task.
        for k in 0..parts {
            let used = self.model.binary(format!("used[p{k}]"));
            let group = format!("used[p{k}]");
            let mut hosted = LinExpr::new();
            for a in 0..n {
                self.model
                    .ge(group.clone(), LinExpr::from(used) - self.assign[a][k], 0.0);
                hosted += self.assign[a][k];
            }
            self.model.le(group, LinExpr::from(used) - hosted, 0.0);
            self.used.push(used);
        }

        // Step 3: a task is DPR-subject if another task shares its partition.
        for a in 0..n {
            let shared = self.model.binary(format!("shared[t{a}]"));
            for b in (0..n).filter(|&b| b != a) {
                for k in 0..parts {
                    self.model.ge(
                        format!("shared[t{a}]"),
                        LinExpr::from(shared) - self.assign[a][k] - self.assign[b][k],
                        -1.0,
                    );
                }
            }
            self.shared.push(shared);
        }

        // Step 4: allocation covers, and is pinned to, the largest demand.
        for (r, &limit) in cap.iter().enumerate() {
            let label = resource_label(r, geometric);
            let mut row = Vec::with_capacity(parts);
            let mut total = LinExpr::new();
            for k in 0..parts {
                let b = self
                    .model
                    .continuous(format!("b[{label},p{k}]"), 0.0, Some(limit));
                let size_group = format!("alloc_size[p{k}]");
                let mut pinned = LinExpr::from(b);
                let mut chosen = LinExpr::new();
                for (a, task) in tasks.iter().enumerate() {
                    let d = task.demand[r];
                    if d <= 0.0 {
                        continue;
                    }
                    self.model.ge(
                        format!("demand[t{a}]"),
                        LinExpr::from(b) - LinExpr::term(self.assign[a][k], d),
                        0.0,
                    );
                    let pick = self
                        .model
                        .binary(format!("sizer[{label},t{a},p{k}]"));
                    self.model.le(
                        size_group.clone(),
                        LinExpr::from(pick) - self.assign[a][k],
                        0.0,
                    );
                    pinned.add_term(pick, -d);
                    chosen += pick;
                }
                self.model.le(size_group.clone(), pinned, 0.0);
                if !chosen.terms().is_empty() {
                    self.model.le(size_group, chosen, 1.0);
                }
                total += b;
                row.push(b);
            }
            self.model.le(format!("capacity[{label}]"), total, limit);
            self.alloc.push(row);
        }

        // Step 5: reconfiguration time of shared tasks.
        let rec_max: f64 = cap.iter().zip(rate).map(|(c, t)| c * t).sum();
        for a in 0..n {
            let r_a = self
                .model
                .continuous(format!("r[t{a}]"), 0.0, Some(rec_max));
            if input.options.bound_reconfiguration && rec_max > 0.0 {
                for k in 0..parts {
                    let mut e = LinExpr::from(r_a);
                    for (res, row) in self.alloc.iter().enumerate() {
                        e.add_term(row[k], -rate[res]);
                    }
                    e.add_term(self.assign[a][k], -rec_max);
                    e.add_term(self.shared[a], -rec_max);
                    self.model
                        .ge(format!("reconfiguration[t{a}]"), e, -2.0 * rec_max);
                }
            }
            self.reconf.push(r_a);
        }

        // Step 6: interference between tasks of different software tasks
        // sharing a partition.
        let mut interference = vec![vec![None; n]; n];
        for a in 0..n {
            for b in 0..n {
                let wcet = tasks[b].wcet;
                if a == b || tasks[a].sw_task == tasks[b].sw_task || wcet <= 0.0 {
                    continue;
                }
                let i_ab = self
                    .model
                    .continuous(format!("I[t{a},t{b}]"), 0.0, Some(wcet));
                for k in 0..parts {
                    self.model.ge(
                        format!("interference[t{a}]"),
                        LinExpr::from(i_ab)
                            - LinExpr::term(self.assign[a][k], wcet)
                            - LinExpr::term(self.assign[b][k], wcet),
                        -wcet,
                    );
                }
                interference[a][b] = Some(i_ab);
            }
        }

        // Step 7: delay caused to task a by each other software task.
        let wcet_max = tasks.iter().map(|t| t.wcet).fold(0.0, f64::max);
        let cross_m = wcet_max + rec_max;
        let mut extra_delay: Vec<LinExpr> = vec![LinExpr::new(); n];
        for a in 0..n {
            for (i, sw) in set.sw_tasks().iter().enumerate() {
                if i == tasks[a].sw_task.index() || sw.hw_tasks.is_empty() {
                    continue;
                }
                let delta = self
                    .model
                    .continuous(format!("DELTA[t{a},sw{i}]"), 0.0, None);
                for b in sw.hw_tasks.iter().map(|h| h.index()) {
                    let mut e = LinExpr::from(delta) - self.reconf[b];
                    if let Some(i_ab) = interference[a][b] {
                        e -= i_ab;
                    }
                    e.add_term(self.shared[a], -cross_m);
                    self.model.ge(format!("cross_delay[t{a}]"), e, -cross_m);
                }
                extra_delay[a] += delta;
            }
        }

        // Step 8: waiting on other partitions' reconfigurations when the
        // configuration port cannot be preempted.
        if !input.options.preemptive_reconfiguration && rec_max > 0.0 {
            for a in 0..n {
                for c in (0..n).filter(|&c| c != a) {
                    let wait = self
                        .model
                        .continuous(format!("DELTA_NP[t{a},t{c}]"), 0.0, None);
                    for k in 0..parts {
                        let mut e = LinExpr::from(wait) - self.reconf[c];
                        e.add_term(self.shared[a], -rec_max);
                        e.add_term(self.shared[c], -rec_max);
                        e.add_term(self.assign[c][k], rec_max);
                        e.add_term(self.assign[a][k], -rec_max);
                        self.model.ge(format!("port_wait[t{a}]"), e, -3.0 * rec_max);
                    }
                    extra_delay[a] += wait;
                }
            }
        }

        // Step 9: end-to-end delay bound of every software task.
        for (i, sw) in set.sw_tasks().iter().enumerate() {
            if sw.hw_tasks.is_empty() {
                continue;
            }
            let mut delay = LinExpr::new();
            let mut wcet_sum = 0.0;
            for a in sw.hw_tasks.iter().map(|h| h.index()) {
                delay += self.reconf[a];
                delay += extra_delay[a].clone();
                wcet_sum += tasks[a].wcet;
            }
            self.model.le(
                format!("delay_bound[sw{i}]"),
                delay,
                input.slacks[i] - wcet_sum,
            );
        }
    }
}
