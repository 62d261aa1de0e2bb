//! `tessera cluster`: k-means++ grouping of tasks by resource demand.

use serde::Serialize;

use tessera_cluster::{cluster, Clustering, KMeansOptions, Point};
use tessera_config::TaskConfig;
use tessera_model::{load_tasks_json, Task};

use crate::pipeline::load_project_config;
use crate::{ClusterArgs, GlobalArgs, ReportFormat};

/// One cluster as printed.
#[derive(Debug, Serialize)]
struct ClusterRow {
    cluster: usize,
    centroid: Point,
    max_resources: Point,
    members: Vec<String>,
}

/// The printed clustering.
#[derive(Debug, Serialize)]
struct ClusterReport {
    iterations: usize,
    converged: bool,
    clusters: Vec<ClusterRow>,
}

/// Runs the `tessera cluster` command.
pub fn run(args: &ClusterArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    // Step 1: Tasks and defaults, from a task file or the project
    let (tasks, names, mut options) = match args.tasks {
        Some(ref path) => {
            let tasks = load_tasks_json(&std::fs::read_to_string(path)?)?;
            let names: Vec<String> = tasks.iter().map(|t| t.id.to_string()).collect();
            (tasks, names, KMeansOptions::default())
        }
        None => {
            let config = load_project_config(global)?;
            let options = KMeansOptions {
                k: config.cluster.k,
                tolerance: config.cluster.tolerance,
                max_iterations: config.cluster.max_iterations,
                seed: config.cluster.seed,
            };
            let names: Vec<String> = config.tasks.iter().map(|t| t.name.clone()).collect();
            (tasks_from_config(&config.tasks), names, options)
        }
    };

    // Step 2: Overrides
    if let Some(k) = args.k {
        options.k = k;
    }
    if let Some(seed) = args.seed {
        options.seed = seed;
    }
    if let Some(tolerance) = args.tolerance {
        options.tolerance = tolerance;
    }
    if let Some(max_iterations) = args.max_iterations {
        options.max_iterations = max_iterations;
    }

    // Step 3: Cluster
    let clustering = cluster(&tasks, &options)?;
    let report = build_report(&clustering, &names);

    // Step 4: Print
    match args.format {
        ReportFormat::Text => {
            if !global.quiet {
                eprintln!(
                    "   Clustered {} task(s) into {} group(s) in {} iteration(s){}",
                    tasks.len(),
                    clustering.k(),
                    clustering.iterations(),
                    if clustering.converged() { "" } else { ", not converged" }
                );
            }
            for row in &report.clusters {
                println!(
                    "cluster {}: max clb {} dsp {} bram {} | {}",
                    row.cluster,
                    row.max_resources[0],
                    row.max_resources[1],
                    row.max_resources[2],
                    row.members.join(", ")
                );
            }
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(0)
}

/// Scheduling tasks for the configured hardware tasks, ids in file order.
fn tasks_from_config(tasks: &[TaskConfig]) -> Vec<Task> {
    tasks
        .iter()
        .zip(0u32..)
        .map(|(t, id)| Task::new(id, t.clb, t.dsp, t.bram, t.wcet.round() as u32))
        .collect()
}

fn build_report(clustering: &Clustering, names: &[String]) -> ClusterReport {
    let max = clustering.max_resources();
    let mut clusters: Vec<ClusterRow> = clustering
        .centroids()
        .iter()
        .zip(max)
        .enumerate()
        .map(|(cluster, (&centroid, max_resources))| ClusterRow {
            cluster,
            centroid,
            max_resources,
            members: Vec::new(),
        })
        .collect();
    for (i, &c) in clustering.assignments().iter().enumerate() {
        if let Some(name) = names.get(i) {
            clusters[c].members.push(name.clone());
        }
    }
    ClusterReport {
        iterations: clustering.iterations(),
        converged: clustering.converged(),
        clusters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn global() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: None,
        }
    }

    #[test]
    fn config_tasks_keep_order() {
        let config = tessera_config::load_config_from_str(
            "[project]\nname = \"c\"\n[[task]]\nname = \"a\"\nclb = 5\ndsp = 2\nwcet = 2.6\n",
        )
        .unwrap();
        let tasks = tasks_from_config(&config.tasks);
        assert_eq!(tasks[0].id, 0);
        assert_eq!(tasks[0].resources(), [5.0, 2.0, 0.0]);
        assert_eq!(tasks[0].exec_time, 3);
    }

    #[test]
    fn report_lists_every_member() {
        let tasks: Vec<Task> = (0..4).map(|i| Task::new(i, 100 + 1000 * (i % 2), 0, 0, 1)).collect();
        let names: Vec<String> = ["a", "b", "c", "d"].map(String::from).to_vec();
        let options = KMeansOptions {
            k: 2,
            ..KMeansOptions::default()
        };
        let clustering = cluster(&tasks, &options).unwrap();
        let report = build_report(&clustering, &names);
        assert_eq!(report.clusters.len(), 2);
        let total: usize = report.clusters.iter().map(|c| c.members.len()).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn clusters_a_task_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tasks.json");
        fs::write(
            &path,
            r#"{"tasks": [
                {"id": 0, "clb": 2000, "dsp": 10, "bram": 4, "exectime": 20},
                {"id": 1, "clb": 2100, "dsp": 12, "bram": 5, "exectime": 25},
                {"id": 2, "clb": 2900, "dsp": 70, "bram": 60, "exectime": 30}
            ]}"#,
        )
        .unwrap();
        let args = ClusterArgs {
            tasks: Some(path.display().to_string()),
            k: Some(2),
            seed: Some(1),
            tolerance: None,
            max_iterations: None,
            format: ReportFormat::Json,
        };
        assert_eq!(run(&args, &global()).unwrap(), 0);
    }

    #[test]
    fn too_many_clusters_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tasks.json");
        fs::write(&path, r#"{"tasks": [{"id": 0, "clb": 1, "dsp": 0, "bram": 0}]}"#).unwrap();
        let args = ClusterArgs {
            tasks: Some(path.display().to_string()),
            k: Some(2),
            seed: None,
            tolerance: None,
            max_iterations: None,
            format: ReportFormat::Text,
        };
        let err = run(&args, &global()).unwrap_err();
        assert!(err.to_string().contains("cannot form 2 clusters from 1 tasks"));
    }
}
