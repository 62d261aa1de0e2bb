//! Seeded random generation of tasksets, slack bounds and scheduling tasks.
//!
//! Resource units are split across tasks with a UUniFast-style recursion
//! clamped to per-task minimum and maximum shares. Slack bounds interpolate
//! between each task's own WCET and the worst-case delay of the whole set.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tessera_common::HwTaskId;

use crate::error::ModelError;
use crate::platform::Platform;
use crate::task::Task;
use crate::taskset::Taskset;

/// Lower WCET bound of generated hardware tasks.
pub const WCET_MIN: f64 = 5.0;
/// Upper WCET bound of generated hardware tasks.
pub const WCET_MAX: f64 = 500.0;

/// Minimum logic units per generated task.
const MIN_UNITS_CLB: u64 = 10;
/// Minimum memory units per generated task.
const MIN_UNITS_BRAM: u64 = 10;

/// A deterministic generator; equal seeds give equal output.
pub struct Generator {
    rng: StdRng,
}

impl Generator {
    /// Creates a generator from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Splits `total` units among `n` tasks, each getting between `min` and
    /// `max` units where the total allows it.
    pub fn units_per_task(
        &mut self,
        n: usize,
        total: u64,
        min: u64,
        max: u64,
    ) -> Result<Vec<u64>, ModelError> {
        if n == 0 {
            return Err(ModelError::Generator("cannot split units among zero tasks".into()));
        }
        if min.saturating_mul(n as u64) > total {
            return Err(ModelError::Generator(format!(
                "{total} units cannot give {n} tasks at least {min} each"
            )));
        }
        let mut shares = Vec::with_capacity(n);
        let mut remaining = total;
        for i in 0..n - 1 {
            let left_after = (n - i - 1) as u64;
            let r: f64 = self.rng.gen();
            let mut next = (remaining as f64 * r.powf(1.0 / left_after as f64)).floor() as u64;
            next = next.min(remaining - min);
            next = next.max(left_after * min);
            if remaining - next > max {
                next = remaining - max;
            }
            shares.push(remaining - next);
            remaining = next;
        }
        shares.push(remaining);
        Ok(shares)
    }

    /// Generates a one-to-one taskset of `n` tasks whose demand for resource
    /// `x` sums to `usage[x]` times the platform capacity, with no task above
    /// `max_share` of the capacity. WCETs are uniform in
    /// `[WCET_MIN, WCET_MAX)`.
    pub fn taskset(
        &mut self,
        n: usize,
        platform: &Platform,
        usage: &[f64],
        max_share: f64,
    ) -> Result<Taskset, ModelError> {
        if usage.len() != platform.num_resources() {
            return Err(ModelError::LengthMismatch {
                what: "usage vector",
                expected: platform.num_resources(),
                got: usage.len(),
            });
        }
        let mut set = Taskset::one_to_one(n, platform);
        let mut demands = vec![vec![0.0; platform.num_resources()]; n];
        for (x, cap) in platform.capacity().iter().enumerate() {
            let total = (usage[x] * cap).floor() as u64;
            let min = match x {
                0 => MIN_UNITS_CLB,
                1 => MIN_UNITS_BRAM,
                _ => 0,
            }
            .min(total / n.max(1) as u64);
            let max = ((max_share * cap).floor() as u64).max(min);
            let shares = self.units_per_task(n, total, min, max)?;
            for (i, units) in shares.into_iter().enumerate() {
                demands[i][x] = units as f64;
            }
        }
        for (i, demand) in demands.into_iter().enumerate() {
            let id = HwTaskId::from(i);
            set.set_demand(id, demand)?;
            let wcet = self.rng.gen_range(WCET_MIN..WCET_MAX);
            set.set_wcet(id, wcet)?;
        }
        Ok(set)
    }

    /// Draws one slack bound per hardware task.
    ///
    /// The worst-case delay is one plus every task's WCET plus, per task, the
    /// reconfiguration time of the largest demand on each resource. Task `a`
    /// gets a bound uniform between `wcet_a + alpha * (worst - wcet_a)` and
    /// the worst case, so `alpha = 0` is loosest and `alpha = 1` pins every
    /// bound to the worst case.
    pub fn slacks(&mut self, set: &Taskset, platform: &Platform, alpha: f64) -> Vec<f64> {
        let worst = worst_case_delay(set, platform);
        set.hw_tasks()
            .iter()
            .map(|t| {
                let min_delay = t.wcet + alpha * (worst - t.wcet);
                let r: f64 = self.rng.gen();
                min_delay + (worst - min_delay) * r
            })
            .collect()
    }

    /// Generates `n` scheduling tasks with logic in 2000..=3000, DSP and
    /// memory in 0..=80, and execution time in 5..=50.
    pub fn tasks(&mut self, n: usize) -> Vec<Task> {
        (0..n as u32)
            .map(|id| {
                let clb = self.rng.gen_range(2000..=3000);
                let dsp = self.rng.gen_range(0..=80);
                let bram = self.rng.gen_range(0..=80);
                let exec = self.rng.gen_range(5..=50);
                Task::new(id, clb, dsp, bram, exec)
            })
            .collect()
    }

    /// Generates between 5 and 25 scheduling tasks.
    pub fn random_task_count(&mut self) -> Vec<Task> {
        let n = self.rng.gen_range(5..=25);
        self.tasks(n)
    }
}

/// The end-to-end delay bound no task can exceed in any partitioning.
pub fn worst_case_delay(set: &Taskset, platform: &Platform) -> f64 {
    let n = platform.num_resources();
    let largest: Vec<f64> = (0..n)
        .map(|x| {
            set.hw_tasks()
                .iter()
                .map(|t| t.demand[x])
                .fold(0.0, f64::max)
        })
        .collect();
    let reconf: f64 = largest
        .iter()
        .zip(platform.reconfig_time_per_unit())
        .map(|(d, rate)| d * rate)
        .sum();
    let wcet: f64 = set.hw_tasks().iter().map(|t| t.wcet).sum();
    1.0 + set.num_hw_tasks() as f64 * reconf + wcet
}
