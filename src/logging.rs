//! Logging initialization for stepform.
//!
//! TUI mode: logs to `<state>/logs/stepform-{datetime}.log` so the alternate
//! screen stays clean. CLI mode: logs to stderr.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Result of logging initialization
pub struct LoggingHandle {
    /// Flushes buffered log lines when dropped; keep alive until exit
    pub _guard: Option<WorkerGuard>,

    /// Path to the log file (only set in TUI mode with file logging enabled)
    pub log_file_path: Option<PathBuf>,
}

/// Log level to use: `--debug` wins over the configured level
fn effective_level(config: &Config, debug_override: bool) -> String {
    if debug_override {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    }
}

/// Whether this run should write to a log file
fn logs_to_file(config: &Config, is_tui_mode: bool) -> bool {
    is_tui_mode && config.logging.to_file
}

fn log_file_name(now: chrono::DateTime<chrono::Utc>) -> String {
    format!("stepform-{}.log", now.format("%Y%m%dT%H%M%SZ"))
}

fn log_file_in(dir: &Path, now: chrono::DateTime<chrono::Utc>) -> PathBuf {
    dir.join(log_file_name(now))
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured level when set.
pub fn init_logging(
    config: &Config,
    is_tui_mode: bool,
    debug_override: bool,
) -> Result<LoggingHandle> {
    let level = effective_level(config, debug_override);
    let filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or(level));

    if logs_to_file(config, is_tui_mode) {
        let logs_dir = config.logs_path();
        std::fs::create_dir_all(&logs_dir)?;

        let now = chrono::Utc::now();
        let log_filename = log_file_name(now);
        let log_file_path = log_file_in(&logs_dir, now);

        let file_appender = tracing_appender::rolling::never(&logs_dir, &log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();

        Ok(LoggingHandle {
            _guard: Some(guard),
            log_file_path: Some(log_file_path),
        })
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();

        Ok(LoggingHandle {
            _guard: None,
            log_file_path: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_debug_flag_overrides_level() {
        let mut config = Config::default();
        config.logging.level = "warn".to_string();
        assert_eq!(effective_level(&config, false), "warn");
        assert_eq!(effective_level(&config, true), "debug");
    }

    #[test]
    fn test_file_logging_only_in_tui_mode() {
        let mut config = Config::default();
        assert!(logs_to_file(&config, true));
        assert!(!logs_to_file(&config, false));

        config.logging.to_file = false;
        assert!(!logs_to_file(&config, true));
    }

    #[test]
    fn test_log_file_name_format() {
        let now = chrono::Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(log_file_name(now), "stepform-20260304T050607Z.log");

        let dir = tempfile::TempDir::new().unwrap();
        let path = log_file_in(dir.path(), now);
        assert!(path.starts_with(dir.path()));
        assert!(path.to_string_lossy().ends_with(".log"));
    }
}
