//! Shared helpers for CLI commands: project discovery, configuration
//! loading, interrupt handling and diagnostic rendering.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tessera_config::{load_config, load_config_from_str, TesseraConfig, CONFIG_FILE};
use tessera_diagnostics::{
    Diagnostic, DiagnosticRenderer, JsonRenderer, Severity, TerminalRenderer,
};
use tessera_milp::CancelToken;

use crate::{GlobalArgs, ReportFormat};

static INTERRUPT: OnceLock<CancelToken> = OnceLock::new();

/// The process-wide token cancelled by Ctrl-C.
///
/// The signal handler is installed on first use. If that fails the token is
/// still returned but no signal will ever cancel it.
pub fn interrupt_token() -> CancelToken {
    INTERRUPT
        .get_or_init(|| {
            let token = CancelToken::new();
            let handler = token.clone();
            if let Err(e) = ctrlc::set_handler(move || handler.cancel()) {
                tracing::warn!("cannot install interrupt handler: {e}");
            }
            token
        })
        .clone()
}

/// Walks up from `start` looking for the nearest directory containing `tessera.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Loads the project configuration selected by the global flags.
///
/// `--config` may name a file (read as is) or a project directory. Without
/// it the nearest `tessera.toml` above the current directory is used.
pub fn load_project_config(
    global: &GlobalArgs,
) -> Result<TesseraConfig, Box<dyn std::error::Error>> {
    match global.config {
        Some(ref config_path) => {
            let p = PathBuf::from(config_path);
            if p.is_file() {
                let content = std::fs::read_to_string(&p)?;
                Ok(load_config_from_str(&content)?)
            } else {
                Ok(load_config(&p)?)
            }
        }
        None => {
            let root = find_project_root(&std::env::current_dir()?)?;
            Ok(load_config(&root)?)
        }
    }
}

/// Prints diagnostics to stderr in the requested format and returns the
/// number of errors among them.
pub fn render_diagnostics(
    diagnostics: &[Diagnostic],
    format: ReportFormat,
    global: &GlobalArgs,
) -> usize {
    for diag in diagnostics {
        if global.quiet && diag.severity != Severity::Error {
            continue;
        }
        let line = match format {
            ReportFormat::Text => TerminalRenderer::new(global.color).render(diag),
            ReportFormat::Json => JsonRenderer.render(diag),
        };
        eprintln!("{line}");
    }
    diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count()
}

/// Installs the `tracing` subscriber. `RUST_LOG` overrides the flag-derived level.
pub fn init_tracing(global: &GlobalArgs) {
    let level = if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(global.color)
        .init();
}
