//! `tessera generate`: random tasksets for experiments.

use serde::Serialize;

use tessera_arch::load_board;
use tessera_common::ResourceKind;
use tessera_model::generate::Generator;
use tessera_model::Platform;

use crate::{GenerateArgs, GenerateKind};

/// Default hardware task count of a generated taskset.
const DEFAULT_TASKSET_SIZE: usize = 8;

#[derive(Debug, Serialize)]
struct GeneratedConfig {
    project: GeneratedProject,
    board: GeneratedBoard,
    task: Vec<GeneratedTask>,
}

#[derive(Debug, Serialize)]
struct GeneratedProject {
    name: String,
}

#[derive(Debug, Serialize)]
struct GeneratedBoard {
    name: String,
}

#[derive(Debug, Serialize)]
struct GeneratedTask {
    name: String,
    clb: u32,
    bram: u32,
    dsp: u32,
    wcet: f64,
    slack: f64,
}

/// Runs the `tessera generate` command.
pub fn run(args: &GenerateArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut generator = Generator::new(args.seed);
    match args.kind {
        GenerateKind::Taskset => {
            let config = taskset(args, &mut generator)?;
            print!("{}", toml::to_string(&config)?);
        }
        GenerateKind::Tasks => {
            let tasks = match args.count {
                Some(n) => generator.tasks(n),
                None => generator.random_task_count(),
            };
            let list = serde_json::json!({ "tasks": tasks });
            println!("{}", serde_json::to_string_pretty(&list)?);
        }
    }
    Ok(0)
}

fn taskset(
    args: &GenerateArgs,
    generator: &mut Generator,
) -> Result<GeneratedConfig, Box<dyn std::error::Error>> {
    let board = load_board(&args.board)?;
    let capacity = ResourceKind::ALL
        .map(|k| f64::from(board.capacity(k)))
        .to_vec();
    let platform = Platform::new(capacity, board.reconfig_time_per_unit().to_vec())?;
    let n = args.count.unwrap_or(DEFAULT_TASKSET_SIZE);
    let usage = vec![args.usage; ResourceKind::ALL.len()];
    let set = generator.taskset(n, &platform, &usage, args.max_share)?;
    let slacks = generator.slacks(&set, &platform, args.alpha);

    let task = set
        .hw_tasks()
        .iter()
        .zip(slacks)
        .enumerate()
        .map(|(i, (t, slack))| GeneratedTask {
            name: format!("task{i}"),
            clb: t.demand[ResourceKind::Clb.index()] as u32,
            bram: t.demand[ResourceKind::Bram.index()] as u32,
            dsp: t.demand[ResourceKind::Dsp.index()] as u32,
            wcet: t.wcet,
            slack,
        })
        .collect();
    Ok(GeneratedConfig {
        project: GeneratedProject {
            name: format!("generated-{}", args.seed),
        },
        board: GeneratedBoard {
            name: board.name().to_string(),
        },
        task,
    })
}
