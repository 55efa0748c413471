use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE: &str = "teutonic-warfare.log";

/// Route `log` records into a file under `log_directory`. The terminal is
/// owned by the TUI, so nothing is written to stdout.
///
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn setup_logging(
    log_directory: &Path,
) -> Result<WorkerGuard, Box<dyn std::error::Error + Send + Sync>> {
    if !log_directory.exists() {
        fs::create_dir_all(log_directory)?;
    }

    let file_appender = tracing_appender::rolling::never(log_directory, LOG_FILE);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            fmt::Layer::new()
                .with_writer(non_blocking_writer)
                .with_ansi(false),
        )
        .try_init()?;

    log::info!(
        "Logging initialized. Log file: {:?}",
        log_directory.join(LOG_FILE)
    );
    Ok(guard)
}
