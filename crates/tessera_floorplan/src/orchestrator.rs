//! The per-run orchestrator.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tessera_arch::BoardTopology;
use tessera_common::{HwTaskId, ResourceKind, SlotId, SwTaskId};
use tessera_config::{resolve_board, SolverConfig, TaskConfig, TesseraConfig};
use tessera_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink, Subject};
use tessera_engine::{floorplan, Connection, EngineInput, EngineOptions, EngineOutcome, EngineResult};
use tessera_milp::{CancelToken, MilpBackend, SolverSettings};
use tessera_model::generate::worst_case_delay;
use tessera_model::{Platform, Taskset};

use crate::error::FloorplanError;
use crate::report::Report;

/// Owns the task and resource vectors of one build and drives the engine.
///
/// The platform is the whole board: capacities are the board's usable
/// resources net of forbidden regions.
#[derive(Debug, Clone)]
pub struct Floorplan {
    name: String,
    board: BoardTopology,
    platform: Platform,
    num_slots: usize,
    geometry: bool,
    taskset: Taskset,
    task_names: Vec<String>,
    slack_hints: Vec<Option<f64>>,
    connections: Vec<Connection>,
    options: EngineOptions,
    outcome: Option<EngineOutcome>,
}

impl Floorplan {
    /// Creates an orchestrator for `num_slots` slots on `board`, with one
    /// blank task per slot until [`populate`](Self::populate) is called.
    pub fn new(
        name: impl Into<String>,
        board: BoardTopology,
        num_slots: usize,
    ) -> Result<Self, FloorplanError> {
        let capacity = ResourceKind::ALL
            .map(|k| f64::from(board.capacity(k)))
            .to_vec();
        let platform = Platform::new(capacity, board.reconfig_time_per_unit().to_vec())?;
        let taskset = Taskset::one_to_one(num_slots, &platform);
        Ok(Self {
            name: name.into(),
            board,
            platform,
            num_slots,
            geometry: true,
            taskset,
            task_names: default_names(num_slots),
            slack_hints: vec![None; num_slots],
            connections: Vec::new(),
            options: EngineOptions::default(),
            outcome: None,
        })
    }

    /// Builds a ready-to-run orchestrator from a loaded configuration.
    pub fn from_config(config: &TesseraConfig) -> Result<Self, FloorplanError> {
        let board = resolve_board(&config.board)?;
        let mut plan = Self::new(config.project.name.clone(), board, config.num_slots())?;
        plan.prepare()?;
        plan.options = engine_options(&config.solver)?;
        plan.geometry = config.solver.geometry;
        plan.connections = config
            .connections
            .iter()
            .map(|c| Connection {
                from: SlotId::from(c.from),
                to: SlotId::from(c.to),
                weight: c.weight,
            })
            .collect();

        let demands: Vec<Vec<f64>> = config.tasks.iter().map(TaskConfig::demand).collect();
        let wcet: Vec<f64> = config.tasks.iter().map(|t| t.wcet).collect();
        let slack: Vec<Option<f64>> = config.tasks.iter().map(|t| t.slack).collect();
        plan.populate(&demands, &wcet, &slack)?;
        plan.set_software_owners(&software_owners(&config.tasks))?;
        plan.task_names = config.tasks.iter().map(|t| t.name.clone()).collect();
        Ok(plan)
    }

    /// Checks that the run may proceed.
    ///
    /// # Errors
    ///
    /// Returns [`FloorplanError::NoSlots`] when zero slots were requested.
    pub fn prepare(&self) -> Result<(), FloorplanError> {
        if self.num_slots == 0 {
            return Err(FloorplanError::NoSlots);
        }
        Ok(())
    }

    /// Replaces the taskset with one hardware task per entry, each invoked
    /// by its own software task.
    ///
    /// Missing slack hints are filled with the worst-case delay bound of the
    /// populated taskset when the engine input is assembled.
    pub fn populate(
        &mut self,
        demands: &[Vec<f64>],
        wcet: &[f64],
        slack_hints: &[Option<f64>],
    ) -> Result<(), FloorplanError> {
        let n = demands.len();
        check_len("wcet vector", n, wcet.len())?;
        check_len("slack vector", n, slack_hints.len())?;

        let mut taskset = Taskset::one_to_one(n, &self.platform);
        for (i, (demand, &time)) in demands.iter().zip(wcet).enumerate() {
            let id = HwTaskId::from(i);
            taskset.set_demand(id, demand.clone())?;
            taskset.set_wcet(id, time)?;
        }
        self.taskset = taskset;
        self.slack_hints = slack_hints.to_vec();
        self.task_names = default_names(n);
        self.outcome = None;
        Ok(())
    }

    /// Regroups the hardware tasks under software tasks: task `i` is invoked
    /// by software task `owners[i]`.
    pub fn set_software_owners(&mut self, owners: &[usize]) -> Result<(), FloorplanError> {
        let n = self.taskset.num_hw_tasks();
        check_len("owner vector", n, owners.len())?;
        let n_sw = owners.iter().max().map_or(0, |m| m + 1);
        let mut taskset = Taskset::new(n, n_sw, &self.platform);
        for (i, (task, &owner)) in self.taskset.hw_tasks().iter().zip(owners).enumerate() {
            let id = HwTaskId::from(i);
            taskset.set_demand(id, task.demand.clone())?;
            taskset.set_wcet(id, task.wcet)?;
            taskset.assign(id, SwTaskId::from(owner))?;
        }
        self.taskset = taskset;
        self.outcome = None;
        Ok(())
    }

    /// Slack bound per software task: the tightest hint among its hardware
    /// tasks, or the worst-case delay bound when none has one.
    pub fn slacks(&self) -> Vec<f64> {
        let worst = worst_case_delay(&self.taskset, &self.platform);
        self.taskset
            .sw_tasks()
            .iter()
            .map(|sw| {
                sw.hw_tasks
                    .iter()
                    .filter_map(|h| self.slack_hints.get(h.index()).copied().flatten())
                    .reduce(f64::min)
                    .unwrap_or(worst)
            })
            .collect()
    }

    /// Assembles the engine input for the current state.
    pub fn input(&self) -> Result<EngineInput, FloorplanError> {
        self.prepare()?;
        Ok(EngineInput {
            platform: self.platform.clone(),
            taskset: self.taskset.clone(),
            slacks: self.slacks(),
            num_slots: self.num_slots,
            board: self.geometry.then(|| self.board.clone()),
            connections: self.connections.clone(),
            options: self.options.clone(),
        })
    }

    /// Runs the engine once and keeps its outcome.
    ///
    /// # Errors
    ///
    /// Fails on a precondition violation or a backend failure. An
    /// infeasible, timed-out or cancelled run is an outcome.
    pub fn run(
        &mut self,
        backend: Arc<dyn MilpBackend>,
        cancel: &CancelToken,
        sink: &DiagnosticSink,
    ) -> Result<&EngineOutcome, FloorplanError> {
        let input = self.input()?;
        self.note_derived_slacks(&input, sink);
        tracing::info!(
            project = %self.name,
            board = self.board.name(),
            tasks = input.taskset.num_hw_tasks(),
            slots = input.num_slots,
            geometry = input.board.is_some(),
            "floorplanning"
        );
        let outcome = floorplan(&input, backend, cancel, sink)?;
        Ok(self.outcome.insert(outcome))
    }

    fn note_derived_slacks(&self, input: &EngineInput, sink: &DiagnosticSink) {
        for (i, sw) in self.taskset.sw_tasks().iter().enumerate() {
            let hinted = sw
                .hw_tasks
                .iter()
                .any(|h| self.slack_hints.get(h.index()).copied().flatten().is_some());
            if hinted {
                continue;
            }
            let subject = sw.hw_tasks.first().map_or(Subject::None, |&h| Subject::Task(h));
            sink.emit(Diagnostic::note(
                DiagnosticCode::new(Category::Config, 101),
                format!(
                    "software task #{i} has no slack; using the worst-case delay {:.3}",
                    input.slacks[i]
                ),
                subject,
            ));
        }
    }

    /// The project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The target board.
    pub fn board(&self) -> &BoardTopology {
        &self.board
    }

    /// The platform derived from the board.
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// The current taskset.
    pub fn taskset(&self) -> &Taskset {
        &self.taskset
    }

    /// Requested slot count.
    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    /// Names of the hardware tasks, indexed by task.
    pub fn task_names(&self) -> &[String] {
        &self.task_names
    }

    /// Engine knobs.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Replaces the engine knobs.
    pub fn set_options(&mut self, options: EngineOptions) {
        self.options = options;
    }

    /// Places slots on the fabric (`true`) or only partitions the tasks.
    pub fn set_geometry(&mut self, geometry: bool) {
        self.geometry = geometry;
    }

    /// Replaces the slot links used by the wirelength objective.
    pub fn set_connections(&mut self, connections: Vec<Connection>) {
        self.connections = connections;
    }

    /// The outcome of the last run.
    pub fn outcome(&self) -> Option<&EngineOutcome> {
        self.outcome.as_ref()
    }

    /// The result of the last run, if it found a floorplan.
    pub fn result(&self) -> Option<&EngineResult> {
        self.outcome.as_ref().and_then(EngineOutcome::result)
    }

    /// A printable summary of the last result.
    pub fn report(&self) -> Option<Report> {
        self.result().map(|r| Report::new(self, r))
    }
}

/// Maps the `[solver]` table onto engine knobs.
pub fn engine_options(solver: &SolverConfig) -> Result<EngineOptions, FloorplanError> {
    Ok(EngineOptions {
        settings: SolverSettings {
            threads: solver.threads,
            time_limit: seconds(solver.time_limit_secs)?,
            iis_time_limit: seconds(solver.iis_time_limit_secs)?,
            int_feas_tol: solver.int_feas_tol,
        },
        preemptive_reconfiguration: solver.preemptive_reconfiguration,
        bound_reconfiguration: solver.bound_reconfiguration,
        enforce_non_overlap: solver.enforce_non_overlap,
        waste_weights: solver.weights.to_vec(),
        wirelength_weight: solver.wirelength_weight,
    })
}

fn seconds(value: f64) -> Result<Duration, FloorplanError> {
    Duration::try_from_secs_f64(value).map_err(|_| FloorplanError::InvalidBudget(value))
}

/// Software task index of every configured task. Tasks naming the same
/// software task share an index; unnamed tasks get one each.
fn software_owners(tasks: &[TaskConfig]) -> Vec<usize> {
    let mut named: BTreeMap<&str, usize> = BTreeMap::new();
    let mut owners = Vec::with_capacity(tasks.len());
    let mut next = 0;
    for task in tasks {
        let fresh = next;
        let owner = match task.software.as_deref() {
            Some(sw) => *named.entry(sw).or_insert(fresh),
            None => fresh,
        };
        if owner == fresh {
            next += 1;
        }
        owners.push(owner);
    }
    owners
}

fn default_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("task{i}")).collect()
}

fn check_len(what: &'static str, expected: usize, got: usize) -> Result<(), FloorplanError> {
    if expected == got {
        Ok(())
    } else {
        Err(FloorplanError::LengthMismatch {
            what,
            expected,
            got,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_config::load_config_from_str;
    use tessera_milp::GoodLpBackend;

    const TINY: &str = r#"
[project]
name = "tiny"

[board.custom]
name = "tiny"
columns = "CCCBCCC"
clock_rows = 1
granularity = { clb = 1, bram = 1, dsp = 1 }
reconfig_time_per_unit = [0.01, 0.01, 0.01]

[[task]]
name = "fir"
clb = 3
bram = 1
wcet = 5.0
slack = 5.0

[[task]]
name = "crc"
clb = 2
wcet = 5.0
slack = 5.0
"#;

    fn run(plan: &mut Floorplan) -> (EngineOutcome, DiagnosticSink) {
        let sink = DiagnosticSink::new();
        let outcome = plan
            .run(Arc::new(GoodLpBackend::new()), &CancelToken::new(), &sink)
            .unwrap()
            .clone();
        (outcome, sink)
    }

    #[test]
    fn platform_follows_board() {
        let config = load_config_from_str(TINY).unwrap();
        let plan = Floorplan::from_config(&config).unwrap();
        assert_eq!(plan.platform().capacity(), &[6.0, 1.0, 0.0]);
        assert_eq!(plan.num_slots(), 2);
        assert_eq!(plan.task_names(), &["fir".to_string(), "crc".to_string()]);
        assert_eq!(plan.slacks(), vec![5.0, 5.0]);
    }

    #[test]
    fn prepare_rejects_zero_slots() {
        let board = resolve_board(&Default::default()).unwrap();
        let mut plan = Floorplan::new("empty", board, 0).unwrap();
        assert!(matches!(plan.prepare(), Err(FloorplanError::NoSlots)));
        let sink = DiagnosticSink::new();
        let err = plan
            .run(Arc::new(GoodLpBackend::new()), &CancelToken::new(), &sink)
            .unwrap_err();
        assert!(matches!(err, FloorplanError::NoSlots));
        assert!(plan.outcome().is_none());
    }

    #[test]
    fn populate_checks_lengths() {
        let board = resolve_board(&Default::default()).unwrap();
        let mut plan = Floorplan::new("p", board, 2).unwrap();
        let err = plan
            .populate(&[vec![1.0, 0.0, 0.0]], &[1.0, 2.0], &[None])
            .unwrap_err();
        assert!(matches!(
            err,
            FloorplanError::LengthMismatch { what: "wcet vector", .. }
        ));
        let err = plan.populate(&[vec![1.0]], &[1.0], &[None]).unwrap_err();
        assert!(matches!(err, FloorplanError::Model(_)));
    }

    #[test]
    fn missing_slack_uses_worst_case_delay() {
        let board = resolve_board(&Default::default()).unwrap();
        let mut plan = Floorplan::new("p", board, 2).unwrap();
        plan.populate(
            &[vec![100.0, 0.0, 0.0], vec![200.0, 2.0, 0.0]],
            &[3.0, 4.0],
            &[Some(9.0), None],
        )
        .unwrap();
        let worst = worst_case_delay(plan.taskset(), plan.platform());
        assert_eq!(plan.slacks(), vec![9.0, worst]);
    }

    #[test]
    fn software_groups_share_the_tightest_slack() {
        let toml = TINY.replace("name = \"crc\"", "name = \"crc\"\nsoftware = \"ctl\"")
            .replace("name = \"fir\"", "name = \"fir\"\nsoftware = \"ctl\"")
            .replacen("slack = 5.0", "slack = 8.0", 1);
        let config = load_config_from_str(&toml).unwrap();
        let plan = Floorplan::from_config(&config).unwrap();
        assert_eq!(plan.taskset().num_sw_tasks(), 1);
        assert_eq!(plan.taskset().sw_tasks()[0].hw_tasks.len(), 2);
        assert_eq!(plan.slacks(), vec![5.0]);
    }

    #[test]
    fn owners_from_software_names() {
        let config = load_config_from_str(TINY).unwrap();
        let mut tasks = config.tasks.clone();
        tasks.push(TaskConfig {
            name: "aes".into(),
            clb: 1,
            bram: 0,
            dsp: 0,
            wcet: 1.0,
            slack: None,
            software: Some("net".into()),
        });
        tasks[0].software = Some("net".into());
        assert_eq!(software_owners(&tasks), vec![0, 1, 0]);
    }

    #[test]
    fn solver_table_becomes_engine_options() {
        let solver = SolverConfig {
            time_limit_secs: 2.5,
            enforce_non_overlap: false,
            ..SolverConfig::default()
        };
        let options = engine_options(&solver).unwrap();
        assert_eq!(options.settings.time_limit, Duration::from_millis(2500));
        assert!(!options.enforce_non_overlap);
        assert_eq!(options.waste_weights, vec![1.0, 0.0, 0.0]);

        let solver = SolverConfig {
            time_limit_secs: f64::MAX,
            ..SolverConfig::default()
        };
        assert!(matches!(
            engine_options(&solver),
            Err(FloorplanError::InvalidBudget(_))
        ));
    }

    #[test]
    fn runs_on_a_custom_board() {
        let config = load_config_from_str(TINY).unwrap();
        let mut plan = Floorplan::from_config(&config).unwrap();
        let (outcome, sink) = run(&mut plan);
        let result = outcome.result().expect("solved");
        assert!(sink.diagnostics().is_empty(), "{:?}", sink.diagnostics());
        assert_eq!(result.num_partitions, 2);
        assert_eq!(result.slots.len(), 2);
        assert!(!result.slots[0].rect.overlaps(&result.slots[1].rect));
        assert!(plan.result().is_some());
        assert_eq!(plan.report().unwrap().partitions.len(), 2);
    }

    #[test]
    fn partition_only_run_notes_derived_slack() {
        let board = resolve_board(&Default::default()).unwrap();
        let mut plan = Floorplan::new("p", board, 2).unwrap();
        plan.set_geometry(false);
        plan.populate(
            &[vec![100.0, 1.0, 0.0], vec![200.0, 0.0, 4.0]],
            &[3.0, 4.0],
            &[None, Some(100.0)],
        )
        .unwrap();
        let (outcome, sink) = run(&mut plan);
        let result = outcome.result().expect("solved");
        assert!(result.slots.is_empty());
        let notes = sink.diagnostics();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].code.to_string(), "C101");
    }
}
