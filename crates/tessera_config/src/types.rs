//! Configuration types deserialized from `tessera.toml`.

use serde::Deserialize;
use tessera_arch::{Rect, TileGranularity};

/// The top-level project configuration parsed from `tessera.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TesseraConfig {
    /// Core project metadata.
    pub project: ProjectMeta,
    /// Target fabric.
    #[serde(default)]
    pub board: BoardConfig,
    /// Model and solve knobs.
    #[serde(default)]
    pub solver: SolverConfig,
    /// Hardware tasks, one `[[task]]` table each.
    #[serde(default, rename = "task")]
    pub tasks: Vec<TaskConfig>,
    /// Weighted slot links, one `[[connection]]` table each.
    #[serde(default, rename = "connection")]
    pub connections: Vec<ConnectionConfig>,
    /// Number of slots; one per task when omitted.
    #[serde(default)]
    pub slots: Option<usize>,
    /// k-means++ parameters.
    #[serde(default)]
    pub cluster: ClusterConfig,
}

impl TesseraConfig {
    /// The slot count the run will use.
    pub fn num_slots(&self) -> usize {
        self.slots.unwrap_or(self.tasks.len())
    }
}

/// Core project metadata required in every `tessera.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// The project version string.
    #[serde(default = "default_version")]
    pub version: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// Board selection: a catalogue name or a custom column map, never both.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardConfig {
    /// Catalogue board name or alias. `pynq` when neither this nor `custom` is set.
    #[serde(default)]
    pub name: Option<String>,
    /// A board described inline.
    #[serde(default)]
    pub custom: Option<CustomBoard>,
}

/// The default catalogue board.
pub const DEFAULT_BOARD: &str = "pynq";

/// A fabric described directly in the configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomBoard {
    /// Board name used in reports.
    #[serde(default = "default_custom_name")]
    pub name: String,
    /// Device part number, informational only.
    #[serde(default)]
    pub device: String,
    /// Column map, one character per column (`C`, `B`, `D`, `K`, `X`).
    pub columns: String,
    /// Clock-region rows.
    pub clock_rows: u32,
    /// Device rows per clock region.
    #[serde(default = "default_rows_per_clock_region")]
    pub rows_per_clock_region: u32,
    /// Resources per column per clock region.
    #[serde(default)]
    pub granularity: TileGranularity,
    /// Rectangles reserved for static logic.
    #[serde(default)]
    pub forbidden: Vec<Rect>,
    /// Reconfiguration time per resource unit (clb, bram, dsp).
    #[serde(default = "default_reconfig_rates")]
    pub reconfig_time_per_unit: [f64; 3],
}

fn default_custom_name() -> String {
    "custom".to_string()
}

fn default_rows_per_clock_region() -> u32 {
    10
}

fn default_reconfig_rates() -> [f64; 3] {
    [1.0 / 4500.0, 1.0 / 4500.0, 1.0 / 4000.0]
}

/// Model and solve knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Worker threads the backend may use.
    pub threads: u32,
    /// Wall-clock budget of the main solve, in seconds.
    pub time_limit_secs: f64,
    /// Wall-clock budget of infeasibility diagnosis, in seconds.
    pub iis_time_limit_secs: f64,
    /// Integer feasibility tolerance.
    pub int_feas_tol: f64,
    /// Whether the configuration port can preempt a running reconfiguration.
    pub preemptive_reconfiguration: bool,
    /// Bound shared tasks' reconfiguration time by their partition's size.
    pub bound_reconfiguration: bool,
    /// Forbid active slots from overlapping.
    pub enforce_non_overlap: bool,
    /// Place slots on the fabric. When false only partitions are computed,
    /// against the board's total capacity.
    pub geometry: bool,
    /// Waste weights per resource type.
    pub weights: WasteWeights,
    /// Weight of the normalized wirelength term.
    pub wirelength_weight: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            threads: 8,
            time_limit_secs: 1800.0,
            iis_time_limit_secs: 120.0,
            int_feas_tol: 1e-9,
            preemptive_reconfiguration: false,
            bound_reconfiguration: true,
            enforce_non_overlap: true,
            geometry: true,
            weights: WasteWeights::default(),
            wirelength_weight: 0.0,
        }
    }
}

/// Objective weight of wasted resources, per type.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WasteWeights {
    /// Logic.
    pub clb: f64,
    /// Block RAM.
    pub bram: f64,
    /// DSP.
    pub dsp: f64,
}

impl WasteWeights {
    /// The weights in resource-index order.
    pub fn to_vec(self) -> Vec<f64> {
        vec![self.clb, self.bram, self.dsp]
    }
}

impl Default for WasteWeights {
    fn default() -> Self {
        Self {
            clb: 1.0,
            bram: 0.0,
            dsp: 0.0,
        }
    }
}

/// One hardware task.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// Unique task name.
    pub name: String,
    /// Logic demand in CLBs.
    #[serde(default)]
    pub clb: u32,
    /// Block RAM demand.
    #[serde(default)]
    pub bram: u32,
    /// DSP demand.
    #[serde(default)]
    pub dsp: u32,
    /// Worst-case execution time.
    pub wcet: f64,
    /// End-to-end delay bound. Derived from the taskset when omitted.
    #[serde(default)]
    pub slack: Option<f64>,
    /// Software task invoking this accelerator. Tasks naming the same
    /// software task share its delay bound; each unnamed task gets its own.
    #[serde(default)]
    pub software: Option<String>,
}

impl TaskConfig {
    /// Demand in resource-index order (clb, bram, dsp).
    pub fn demand(&self) -> Vec<f64> {
        vec![f64::from(self.clb), f64::from(self.bram), f64::from(self.dsp)]
    }
}

/// A weighted link between two slots.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// Slot index of one end.
    pub from: usize,
    /// Slot index of the other end.
    pub to: usize,
    /// Relative importance.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// k-means++ parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Number of clusters.
    pub k: usize,
    /// Stop once no centroid moves further than this.
    pub tolerance: f64,
    /// Iteration cap.
    pub max_iterations: usize,
    /// Sampler seed.
    pub seed: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            k: 5,
            tolerance: 0.1,
            max_iterations: 100,
            seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_defaults() {
        let s = SolverConfig::default();
        assert_eq!(s.threads, 8);
        assert_eq!(s.time_limit_secs, 1800.0);
        assert!(s.bound_reconfiguration && s.enforce_non_overlap && s.geometry);
        assert!(!s.preemptive_reconfiguration);
        assert_eq!(s.weights.to_vec(), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn partial_solver_table() {
        let s: SolverConfig = toml::from_str("threads = 2\n[weights]\ndsp = 0.5\n").unwrap();
        assert_eq!(s.threads, 2);
        assert_eq!(s.iis_time_limit_secs, 120.0);
        assert_eq!(s.weights.clb, 1.0);
        assert_eq!(s.weights.dsp, 0.5);
    }

    #[test]
    fn task_demand_order() {
        let t: TaskConfig =
            toml::from_str("name = \"fir\"\nclb = 120\nbram = 2\ndsp = 8\nwcet = 4.5\n").unwrap();
        assert_eq!(t.demand(), vec![120.0, 2.0, 8.0]);
        assert!(t.slack.is_none());
    }

    #[test]
    fn custom_board_defaults() {
        let b: CustomBoard = toml::from_str("columns = \"CCBCC\"\nclock_rows = 2\n").unwrap();
        assert_eq!(b.name, "custom");
        assert_eq!(b.rows_per_clock_region, 10);
        assert_eq!(b.granularity, TileGranularity::SERIES7);
        assert!(b.forbidden.is_empty());
    }
}
