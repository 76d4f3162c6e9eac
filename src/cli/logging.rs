//! Logging initialization

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initialize logging.
///
/// `RUST_LOG` always wins; otherwise `--debug` selects `debug` and the default
/// is `warn`. Logs go to stderr so stdout stays pure JSON, or to a temp file
/// when `log_file` is set. Returns the log file path in that case.
pub fn init_logging(debug: bool, log_file: bool) -> Result<Option<PathBuf>> {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if !log_file {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(debug)
            .init();
        return Ok(None);
    }

    // Named temp file that outlives the process so it can be inspected afterwards
    let (file, path) = tempfile::Builder::new()
        .prefix("kubegraph-")
        .suffix(".log")
        .tempfile()
        .context("Failed to create log file")?
        .keep()
        .context("Failed to persist log file")?;

    tracing_subscriber::fmt()
        .with_writer(file)
        .with_env_filter(filter)
        .with_ansi(false) // No ANSI codes in log file
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    Ok(Some(path))
}
