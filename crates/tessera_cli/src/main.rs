//! Tessera CLI: slot floorplanning for dynamically reconfigurable FPGAs.
//!
//! Provides `tessera plan` to partition and place the tasks of a project,
//! `tessera cluster` to group tasks by resource profile, `tessera boards` to
//! list the built-in fabrics and `tessera generate` for random experiments.

#![warn(missing_docs)]

mod boards;
mod cluster;
mod generate;
mod pipeline;
mod plan;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Tessera, the DPR slot floorplanner.
#[derive(Parser, Debug)]
#[command(name = "tessera", version, about = "Tessera DPR slot floorplanner")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `tessera.toml` file or the directory holding it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Partition the project's tasks and place their slots.
    Plan(PlanArgs),
    /// Group tasks by resource similarity with k-means++.
    Cluster(ClusterArgs),
    /// List the built-in boards.
    Boards(BoardsArgs),
    /// Generate a random taskset or task list.
    Generate(GenerateArgs),
}

/// Arguments for the `tessera plan` subcommand.
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Output format for the report and diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Override the number of slots.
    #[arg(long)]
    pub slots: Option<usize>,

    /// Override the solver time limit, in seconds.
    #[arg(long)]
    pub time_limit: Option<f64>,

    /// Only partition the tasks; do not place slots on the fabric.
    #[arg(long)]
    pub no_geometry: bool,
}

/// Arguments for the `tessera cluster` subcommand.
#[derive(Parser, Debug)]
pub struct ClusterArgs {
    /// JSON task list (`{"tasks": [...]}`) to cluster instead of the project's tasks.
    #[arg(long)]
    pub tasks: Option<String>,

    /// Number of clusters.
    #[arg(short)]
    pub k: Option<usize>,

    /// Sampler seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Convergence tolerance.
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Iteration cap.
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `tessera boards` subcommand.
#[derive(Parser, Debug)]
pub struct BoardsArgs {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `tessera generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// What to generate.
    #[arg(value_enum, default_value_t = GenerateKind::Taskset)]
    pub kind: GenerateKind,

    /// Number of tasks; random between 5 and 25 for task lists when omitted.
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Generator seed.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Board whose capacity the taskset is drawn against.
    #[arg(long, default_value = "pynq")]
    pub board: String,

    /// Fraction of each resource the whole taskset uses.
    #[arg(long, default_value_t = 0.5)]
    pub usage: f64,

    /// Largest fraction of a resource one task may use.
    #[arg(long, default_value_t = 0.25)]
    pub max_share: f64,

    /// Slack tightness in `[0, 1]`; 1 pins every bound to the worst case.
    #[arg(long, default_value_t = 0.5)]
    pub alpha: f64,
}

/// What `tessera generate` emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GenerateKind {
    /// A `tessera.toml` with hardware tasks and slack bounds.
    Taskset,
    /// A JSON scheduling task list for `tessera cluster --tasks`.
    Tasks,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Report and diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };
    pipeline::init_tracing(&global);

    let result = match cli.command {
        Command::Plan(ref args) => plan::run(args, &global),
        Command::Cluster(ref args) => cluster::run(args, &global),
        Command::Boards(ref args) => boards::run(args),
        Command::Generate(ref args) => generate::run(args),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_plan_default() {
        let cli = Cli::parse_from(["tessera", "plan"]);
        match cli.command {
            Command::Plan(ref args) => {
                assert_eq!(args.format, ReportFormat::Text);
                assert!(args.slots.is_none());
                assert!(args.time_limit.is_none());
                assert!(!args.no_geometry);
            }
            _ => panic!("expected Plan command"),
        }
    }

    #[test]
    fn parse_plan_with_args() {
        let cli = Cli::parse_from([
            "tessera",
            "plan",
            "--format",
            "json",
            "--slots",
            "4",
            "--time-limit",
            "30",
            "--no-geometry",
        ]);
        match cli.command {
            Command::Plan(ref args) => {
                assert_eq!(args.format, ReportFormat::Json);
                assert_eq!(args.slots, Some(4));
                assert_eq!(args.time_limit, Some(30.0));
                assert!(args.no_geometry);
            }
            _ => panic!("expected Plan command"),
        }
    }

    #[test]
    fn parse_cluster_with_args() {
        let cli = Cli::parse_from([
            "tessera",
            "cluster",
            "--tasks",
            "tasks.json",
            "-k",
            "3",
            "--seed",
            "7",
            "--max-iterations",
            "20",
        ]);
        match cli.command {
            Command::Cluster(ref args) => {
                assert_eq!(args.tasks.as_deref(), Some("tasks.json"));
                assert_eq!(args.k, Some(3));
                assert_eq!(args.seed, Some(7));
                assert_eq!(args.max_iterations, Some(20));
                assert!(args.tolerance.is_none());
            }
            _ => panic!("expected Cluster command"),
        }
    }

    #[test]
    fn parse_boards_json() {
        let cli = Cli::parse_from(["tessera", "boards", "-f", "json"]);
        match cli.command {
            Command::Boards(ref args) => assert_eq!(args.format, ReportFormat::Json),
            _ => panic!("expected Boards command"),
        }
    }

    #[test]
    fn parse_generate_default() {
        let cli = Cli::parse_from(["tessera", "generate"]);
        match cli.command {
            Command::Generate(ref args) => {
                assert_eq!(args.kind, GenerateKind::Taskset);
                assert!(args.count.is_none());
                assert_eq!(args.seed, 0);
                assert_eq!(args.board, "pynq");
                assert_eq!(args.alpha, 0.5);
            }
            _ => panic!("expected Generate command"),
        }
    }

    #[test]
    fn parse_generate_tasks() {
        let cli = Cli::parse_from(["tessera", "generate", "tasks", "-n", "12", "--seed", "3"]);
        match cli.command {
            Command::Generate(ref args) => {
                assert_eq!(args.kind, GenerateKind::Tasks);
                assert_eq!(args.count, Some(12));
                assert_eq!(args.seed, 3);
            }
            _ => panic!("expected Generate command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["tessera", "--quiet", "--color", "never", "plan"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn parse_verbose_flag() {
        let cli = Cli::parse_from(["tessera", "plan", "--verbose"]);
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::parse_from(["tessera", "--config", "/path/to/tessera.toml", "plan"]);
        assert_eq!(cli.config.as_deref(), Some("/path/to/tessera.toml"));
    }
}
