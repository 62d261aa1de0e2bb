//! Parsing and validation of `tessera.toml` project configuration files.
//!
//! This crate reads the project configuration file and produces a strongly-typed
//! [`TesseraConfig`]: the board selector, solver knobs, the hardware tasks with
//! their demand, WCET and slack, slot connectivity and clustering parameters.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::resolve_board;
pub use types::*;
