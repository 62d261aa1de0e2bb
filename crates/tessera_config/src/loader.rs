//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::TesseraConfig;
use std::collections::BTreeSet;
use std::path::Path;
use tessera_arch::Board;

/// Name of the configuration file inside a project directory.
pub const CONFIG_FILE: &str = "tessera.toml";

/// Loads and validates a `tessera.toml` configuration from a project directory.
///
/// Reads `<project_dir>/tessera.toml`, parses it, and validates it.
pub fn load_config(project_dir: &Path) -> Result<TesseraConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `tessera.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<TesseraConfig, ConfigError> {
    let config: TesseraConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn non_negative(what: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{what} must be a non-negative number, got {value}"
        )))
    }
}

/// Validates that required fields are present and configuration values are consistent.
pub fn validate_config(config: &TesseraConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }

    match (&config.board.name, &config.board.custom) {
        (Some(_), Some(_)) => {
            return Err(ConfigError::ValidationError(
                "board.name and board.custom are mutually exclusive".to_string(),
            ))
        }
        (Some(name), None) if Board::from_name(name).is_none() => {
            return Err(ConfigError::UnknownBoard(name.clone()));
        }
        _ => {}
    }
    if let Some(custom) = &config.board.custom {
        for (i, a) in custom.forbidden.iter().enumerate() {
            if let Some(b) = custom.forbidden[i + 1..].iter().find(|b| a.overlaps(b)) {
                return Err(ConfigError::ValidationError(format!(
                    "board.custom.forbidden regions {a} and {b} overlap"
                )));
            }
        }
    }

    if config.tasks.is_empty() {
        return Err(ConfigError::ValidationError(
            "at least one [[task]] is required".to_string(),
        ));
    }
    let mut names = BTreeSet::new();
    for task in &config.tasks {
        if task.name.is_empty() {
            return Err(ConfigError::MissingField("task.name".to_string()));
        }
        if !names.insert(task.name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate task name '{}'",
                task.name
            )));
        }
        non_negative(&format!("task '{}' wcet", task.name), task.wcet)?;
        if let Some(slack) = task.slack {
            non_negative(&format!("task '{}' slack", task.name), slack)?;
        }
    }

    if config.slots == Some(0) {
        return Err(ConfigError::ValidationError(
            "slots must be at least 1".to_string(),
        ));
    }
    let slots = config.num_slots();
    for c in &config.connections {
        if c.from >= slots || c.to >= slots {
            return Err(ConfigError::ValidationError(format!(
                "connection {} -> {} names a slot outside 0..{slots}",
                c.from, c.to
            )));
        }
        non_negative("connection weight", c.weight)?;
    }

    let s = &config.solver;
    non_negative("solver.time_limit_secs", s.time_limit_secs)?;
    non_negative("solver.iis_time_limit_secs", s.iis_time_limit_secs)?;
    non_negative("solver.int_feas_tol", s.int_feas_tol)?;
    non_negative("solver.weights.clb", s.weights.clb)?;
    non_negative("solver.weights.bram", s.weights.bram)?;
    non_negative("solver.weights.dsp", s.weights.dsp)?;
    non_negative("solver.wirelength_weight", s.wirelength_weight)?;
    if s.threads == 0 {
        return Err(ConfigError::ValidationError(
            "solver.threads must be at least 1".to_string(),
        ));
    }

    if config.cluster.k == 0 {
        return Err(ConfigError::ValidationError(
            "cluster.k must be at least 1".to_string(),
        ));
    }
    non_negative("cluster.tolerance", config.cluster.tolerance)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[project]
name = "video"

[[task]]
name = "sobel"
clb = 300
wcet = 10.0
"#;

    #[test]
    fn parse_minimal_config() {
        let config = load_config_from_str(MINIMAL).unwrap();
        assert_eq!(config.project.name, "video");
        assert_eq!(config.project.version, "0.1.0");
        assert_eq!(config.tasks.len(), 1);
        assert_eq!(config.num_slots(), 1);
        assert!(config.board.name.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
slots = 2

[project]
name = "video"
version = "1.2.0"
description = "Filter pipeline"

[board]
name = "zybo"

[solver]
threads = 4
time_limit_secs = 60
iis_time_limit_secs = 5.5
preemptive_reconfiguration = true
wirelength_weight = 0.25

[solver.weights]
clb = 1.0
dsp = 0.5

[[task]]
name = "sobel"
clb = 300
bram = 4
dsp = 10
wcet = 10.0
slack = 40.0
software = "camera"

[[task]]
name = "gauss"
clb = 200
wcet = 8.0
software = "camera"

[[connection]]
from = 0
to = 1
weight = 2.0

[cluster]
k = 2
seed = 11
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.version, "1.2.0");
        assert_eq!(config.board.name.as_deref(), Some("zybo"));
        assert_eq!(config.solver.threads, 4);
        assert_eq!(config.solver.iis_time_limit_secs, 5.5);
        assert!(config.solver.preemptive_reconfiguration);
        assert_eq!(config.solver.weights.dsp, 0.5);
        assert_eq!(config.tasks[0].slack, Some(40.0));
        assert_eq!(config.tasks[1].software.as_deref(), Some("camera"));
        assert_eq!(config.connections[0].weight, 2.0);
        assert_eq!(config.cluster.k, 2);
        assert_eq!(config.cluster.max_iterations, 100);
        assert_eq!(config.num_slots(), 2);
    }

    #[test]
    fn custom_board_config() {
        let toml = r#"
[project]
name = "tiny"

[board.custom]
name = "lab"
columns = "CCBCCDCC"
clock_rows = 2
forbidden = [{ x = 0, y = 1, w = 2, h = 1 }]

[[task]]
name = "a"
clb = 10
wcet = 1.0
"#;
        let config = load_config_from_str(toml).unwrap();
        let custom = config.board.custom.as_ref().unwrap();
        assert_eq!(custom.columns, "CCBCCDCC");
        assert_eq!(custom.forbidden[0].w, 2);
    }

    #[test]
    fn overlapping_forbidden_regions_error() {
        let toml = r#"
[project]
name = "tiny"

[board.custom]
columns = "CCCC"
clock_rows = 1
forbidden = [{ x = 0, y = 0, w = 3, h = 1 }, { x = 1, y = 0, w = 3, h = 1 }]

[[task]]
name = "a"
clb = 10
wcet = 1.0
"#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("overlap"));
    }

    #[test]
    fn missing_name_errors() {
        let toml = MINIMAL.replace("name = \"video\"", "name = \"\"");
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let toml = "this is not valid toml {{{}}}";
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn unknown_board_errors() {
        let toml = format!("{MINIMAL}\n[board]\nname = \"spartan3\"\n");
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBoard(ref b) if b == "spartan3"));
    }

    #[test]
    fn board_alias_accepted() {
        let toml = format!("{MINIMAL}\n[board]\nname = \"PYNQ-Z1\"\n");
        assert!(load_config_from_str(&toml).is_ok());
    }

    #[test]
    fn empty_tasks_error() {
        let err = load_config_from_str("[project]\nname = \"x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_slots_error() {
        let toml = format!("slots = 0\n{MINIMAL}");
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(err.to_string().contains("slots"));
    }

    #[test]
    fn negative_times_error() {
        let toml = MINIMAL.replace("wcet = 10.0", "wcet = -1.0");
        assert!(load_config_from_str(&toml).is_err());

        let toml = format!("{MINIMAL}\n[solver]\ntime_limit_secs = -5\n");
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(err.to_string().contains("time_limit_secs"));
    }

    #[test]
    fn duplicate_task_names_error() {
        let toml = format!("{MINIMAL}\n[[task]]\nname = \"sobel\"\nwcet = 1.0\n");
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(err.to_string().contains("duplicate task name 'sobel'"));
    }

    #[test]
    fn connection_out_of_range_error() {
        let toml = format!("{MINIMAL}\n[[connection]]\nfrom = 0\nto = 3\n");
        let err = load_config_from_str(&toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), MINIMAL).unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.tasks[0].name, "sobel");
    }

    #[test]
    fn load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
