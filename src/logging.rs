//! Tracing setup for the mail service.
//!
//! Events from the crate and from the request `TraceLayer` share one level.
//! `RUST_LOG`, when set, replaces the configured filter entirely.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{MailroomError, Result};

/// Targets logged at the configured level. Everything else stays at `warn`.
const SERVICE_TARGETS: &[&str] = &["mailroom", "tower_http"];

/// Filter directives for a configured level name.
///
/// Unknown names fall back to `info`.
fn directives(level: &str) -> String {
    let level = Level::from_str(level.trim()).unwrap_or(Level::INFO);
    let level = level.to_string().to_lowercase();

    let mut parts = vec!["warn".to_string()];
    parts.extend(SERVICE_TARGETS.iter().map(|t| format!("{t}={level}")));
    parts.join(",")
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)))
}

/// Open the log file for appending, creating missing directories.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install the global subscriber.
///
/// Logs go to stdout, and also to `config.file` unless it is empty.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(&config.level);
    let console = tracing_subscriber::fmt::layer().with_target(true);

    let installed = if config.file.is_empty() {
        tracing_subscriber::registry()
            .with(console.with_writer(std::io::stdout))
            .with(filter)
            .try_init()
    } else {
        let log_file = Arc::new(open_log_file(Path::new(&config.file))?);
        tracing_subscriber::registry()
            .with(
                console
                    .with_ansi(false)
                    .with_writer(std::io::stdout.and(log_file)),
            )
            .with(filter)
            .try_init()
    };

    installed.map_err(|e| MailroomError::Config(format!("logging: {e}")))
}

/// Console-only fallback when the log file cannot be opened.
pub fn init_console_only(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(build_filter(level))
        .try_init();
}
