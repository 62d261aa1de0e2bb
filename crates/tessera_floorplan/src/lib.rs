//! Floorplan orchestration: from a `tessera.toml` to an engine result.
//!
//! [`Floorplan`] resolves the board, derives the platform from it, owns the
//! per-run taskset and slack bounds, runs the engine once and keeps the
//! outcome for downstream consumers. [`Report`] renders the result.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use tessera_config::load_config;
//! use tessera_diagnostics::DiagnosticSink;
//! use tessera_floorplan::Floorplan;
//! use tessera_milp::{CancelToken, GoodLpBackend};
//!
//! let config = load_config(std::path::Path::new(".")).unwrap();
//! let mut plan = Floorplan::from_config(&config).unwrap();
//! let sink = DiagnosticSink::new();
//! plan.run(Arc::new(GoodLpBackend::new()), &CancelToken::new(), &sink).unwrap();
//! if let Some(report) = plan.report() {
//!     println!("{report}");
//! }
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod orchestrator;
pub mod report;

pub use error::FloorplanError;
pub use orchestrator::{engine_options, Floorplan};
pub use report::{cell_name, Cell, PartitionRow, Report};
