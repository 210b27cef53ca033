//! Logging setup.

use anyhow::Context;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "chat-tray.log";

/// Initialise logging to stderr and, given a directory, a daily log file.
///
/// The default level is `info`; `RUST_LOG` overrides it. If the log file
/// cannot be set up, logging continues on stderr only. Keep the returned
/// guard alive for as long as the file should receive output.
pub fn init(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let appender = log_dir.map(file_appender);
    let (file_layer, guard, file_error) = match appender {
        Some(Ok(appender)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard), None)
        }
        Some(Err(e)) => (None, None, Some(e)),
        None => (None, None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init();

    if let Some(e) = file_error {
        tracing::warn!("logging to stderr only: {e:#}");
    }

    guard
}

/// Daily-rotated appender under `dir`, creating the directory first.
fn file_appender(dir: &Path) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(dir)
        .with_context(|| format!("cannot open log file in {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_appender_creates_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("logs");

        assert!(file_appender(&dir).is_ok());
        assert!(dir.is_dir());
    }

    #[test]
    fn test_file_appender_reports_unusable_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let dir = file.path().join("logs");

        let err = file_appender(&dir).unwrap_err();
        assert!(err.to_string().contains("cannot create log directory"));
    }
}
