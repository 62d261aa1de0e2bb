//! `tessera plan`: partition the project's tasks and place their slots.
//!
//! 1. Load config (walk up looking for `tessera.toml`)
//! 2. Apply command-line overrides
//! 3. Build the orchestrator
//! 4. Solve
//! 5. Render diagnostics
//! 6. Print the report

use std::sync::Arc;

use tessera_config::TesseraConfig;
use tessera_diagnostics::DiagnosticSink;
use tessera_engine::EngineOutcome;
use tessera_floorplan::Floorplan;
use tessera_milp::{CancelToken, GoodLpBackend};

use crate::pipeline::{interrupt_token, load_project_config, render_diagnostics};
use crate::{GlobalArgs, PlanArgs, ReportFormat};

/// Exit code of a run that proved no floorplan exists.
const EXIT_INFEASIBLE: i32 = 1;
/// Exit code of a run that ran out of time without a floorplan.
const EXIT_TIMED_OUT: i32 = 2;
/// Exit code of a cancelled run.
const EXIT_CANCELLED: i32 = 130;

/// Runs the `tessera plan` command. Ctrl-C stops the solve.
pub fn run(args: &PlanArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    run_with(args, global, &interrupt_token())
}

fn run_with(
    args: &PlanArgs,
    global: &GlobalArgs,
    cancel: &CancelToken,
) -> Result<i32, Box<dyn std::error::Error>> {
    // Step 1: Load config
    let mut config = load_project_config(global)?;

    // Step 2: Overrides
    apply_overrides(&mut config, args);

    if !global.quiet {
        eprintln!(
            "   Planning {} v{} ({} task(s), {} slot(s))",
            config.project.name,
            config.project.version,
            config.tasks.len(),
            config.num_slots()
        );
    }

    // Step 3: Orchestrator
    let mut plan = Floorplan::from_config(&config)?;

    // Step 4: Solve
    let sink = DiagnosticSink::new();
    let outcome = plan
        .run(Arc::new(GoodLpBackend::new()), cancel, &sink)?
        .clone();

    // Step 5: Diagnostics
    render_diagnostics(&sink.diagnostics(), args.format, global);

    // Step 6: Report
    match outcome {
        EngineOutcome::Solved(_) => {
            if let Some(report) = plan.report() {
                match args.format {
                    ReportFormat::Text => println!("{report}"),
                    ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                }
            }
            Ok(0)
        }
        EngineOutcome::Infeasible(iis) => {
            if !global.quiet {
                eprintln!(
                    "   Result: infeasible, {} conflicting constraint group(s){}",
                    iis.groups.len(),
                    if iis.complete { "" } else { " (diagnosis incomplete)" }
                );
            }
            Ok(EXIT_INFEASIBLE)
        }
        EngineOutcome::TimedOut => {
            eprintln!("error: time limit reached before any floorplan was found");
            Ok(EXIT_TIMED_OUT)
        }
        EngineOutcome::Cancelled => Ok(EXIT_CANCELLED),
    }
}

fn apply_overrides(config: &mut TesseraConfig, args: &PlanArgs) {
    if let Some(slots) = args.slots {
        config.slots = Some(slots);
    }
    if let Some(limit) = args.time_limit {
        config.solver.time_limit_secs = limit;
    }
    if args.no_geometry {
        config.solver.geometry = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
[project]
name = "tiny"

[board.custom]
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

    fn project(toml: &str) -> (TempDir, GlobalArgs) {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("tessera.toml"), toml).unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(tmp.path().display().to_string()),
        };
        (tmp, global)
    }

    fn args() -> PlanArgs {
        PlanArgs {
            format: ReportFormat::Json,
            slots: None,
            time_limit: None,
            no_geometry: false,
        }
    }

    #[test]
    fn overrides_apply() {
        let mut config = tessera_config::load_config_from_str(CONFIG).unwrap();
        let args = PlanArgs {
            slots: Some(3),
            time_limit: Some(10.0),
            no_geometry: true,
            ..args()
        };
        apply_overrides(&mut config, &args);
        assert_eq!(config.num_slots(), 3);
        assert_eq!(config.solver.time_limit_secs, 10.0);
        assert!(!config.solver.geometry);
    }

    #[test]
    fn plans_a_feasible_project() {
        let (_tmp, global) = project(CONFIG);
        assert_eq!(run(&args(), &global).unwrap(), 0);
    }

    #[test]
    fn reports_infeasible_projects() {
        // Sharing one partition would add 5 units of interference to each task.
        let (_tmp, global) = project(&format!("slots = 1\n{CONFIG}"));
        assert_eq!(run(&args(), &global).unwrap(), EXIT_INFEASIBLE);
    }

    #[test]
    fn cancelled_run_exits_130() {
        let (_tmp, global) = project(CONFIG);
        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(run_with(&args(), &global, &cancel).unwrap(), EXIT_CANCELLED);
    }

    #[test]
    fn zero_slot_override_is_an_error() {
        let (_tmp, global) = project(CONFIG);
        let args = PlanArgs {
            slots: Some(0),
            ..args()
        };
        let err = run(&args, &global).unwrap_err();
        assert!(err.to_string().contains("slot count must be positive"));
    }
}
