//! Logging system initialization
//!
//! Sets up `tracing` according to the `[logging]` section: level filter,
//! text or JSON output, optional (rotating) log file.

use std::path::Path;

use tracing_appender::{non_blocking::WorkerGuard, rolling};

use crate::config::LoggingConfig;

const DEFAULT_LOG_NAME: &str = "linkhub.log";

/// Build the writer for the configured target
///
/// A file that cannot be opened falls back to stdout with a warning on stderr,
/// so a bad `logging.file` never prevents startup.
fn build_writer(config: &LoggingConfig) -> (Box<dyn std::io::Write + Send + Sync>, bool) {
    let Some(log_file) = config.file.as_deref().filter(|f| !f.is_empty()) else {
        return (Box::new(std::io::stdout()), true);
    };

    let path = Path::new(log_file);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty())
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("Failed to create log directory {}: {}", dir.display(), e);
        return (Box::new(std::io::stdout()), true);
    }

    if config.enable_rotation {
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let filename = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or(DEFAULT_LOG_NAME);

        match rolling::Builder::new()
            .rotation(rolling::Rotation::DAILY)
            .filename_prefix(filename.trim_end_matches(".log"))
            .filename_suffix("log")
            .max_log_files(config.max_backups.max(1) as usize)
            .build(dir)
        {
            Ok(appender) => (Box::new(appender), false),
            Err(e) => {
                eprintln!("Failed to create rolling log appender: {}", e);
                (Box::new(std::io::stdout()), true)
            }
        }
    } else {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
        {
            Ok(file) => (Box::new(file), false),
            Err(e) => {
                eprintln!("Failed to open log file {}: {}", log_file, e);
                (Box::new(std::io::stdout()), true)
            }
        }
    }
}

/// Initialize logging system based on configuration
///
/// The returned `WorkerGuard` must be kept alive for the duration of the
/// program so buffered log lines are flushed on exit. Calling this twice
/// keeps the first subscriber.
pub fn init_logging(config: &LoggingConfig) -> WorkerGuard {
    let (writer, is_console) = build_writer(config);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);

    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(is_console);

    let result = if config.format.eq_ignore_ascii_case("json") {
        subscriber_builder.json().try_init()
    } else {
        subscriber_builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }

    guard
}
