/// Structured logging for the unemployment visualization service
///
/// Sets up `tracing` output for console and, optionally, an append-only log
/// file for daemon operation. Upstream failures are classified so that
/// throttling shows up as noise and malformed data shows up as an error.

use std::path::Path;

use anyhow::Context;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::model::FetchError;

// ---------------------------------------------------------------------------
// Subscriber setup
// ---------------------------------------------------------------------------

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `level` when set. When `log_file` is
/// given, entries are also appended there without ANSI colors; the returned
/// guard must be held until shutdown or buffered lines are lost.
pub fn init_logging(level: &str, log_file: Option<&str>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level '{}'", level))?;

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let path = Path::new(path);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("log file '{}' has no file name", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init()
        .context("logger already initialised")?;

    Ok(guard)
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - provider throttling or a transient gateway hiccup
    Expected,
    /// Unexpected failure - indicates service degradation or an API change
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl std::fmt::Display for FailureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classify a FRED retrieval failure.
pub fn classify_fetch_failure(err: &FetchError) -> FailureType {
    match err {
        // Rate limiting and gateway timeouts clear up on their own.
        FetchError::Http(429) | FetchError::Http(502..=504) => FailureType::Expected,
        FetchError::Http(_) => FailureType::Unexpected,
        // Timeouts and connection resets; could be either side.
        FetchError::Request(_) => FailureType::Unknown,
        // Malformed data suggests the CSV format changed.
        FetchError::Malformed { .. } => FailureType::Unexpected,
        // A series with no observations may simply be discontinued.
        FetchError::Empty(_) => FailureType::Unknown,
    }
}

/// Log a retrieval failure with automatic classification.
pub fn log_fetch_failure(series_id: &str, operation: &str, err: &FetchError) {
    let failure_type = classify_fetch_failure(err);

    match failure_type {
        FailureType::Expected => {
            tracing::debug!(series = series_id, %failure_type, "{} failed: {}", operation, err)
        }
        FailureType::Unexpected => {
            tracing::error!(series = series_id, %failure_type, "{} failed: {}", operation, err)
        }
        FailureType::Unknown => {
            tracing::warn!(series = series_id, %failure_type, "{} failed: {}", operation, err)
        }
    }
}

// ---------------------------------------------------------------------------
// Verification Summary Logging
// ---------------------------------------------------------------------------

/// Severity for a batch outcome: all good is info, total loss is error,
/// anything in between is a warning.
pub fn summary_level(successful: usize, failed: usize) -> Level {
    if failed == 0 {
        Level::INFO
    } else if successful == 0 {
        Level::ERROR
    } else {
        Level::WARN
    }
}

/// Log a summary of a verification run.
pub fn log_verification_summary(total: usize, successful: usize, failed: usize) {
    let message = format!("Verification complete: {}/{} successful, {} failed", successful, total, failed);

    let level = summary_level(successful, failed);
    if level == Level::INFO {
        tracing::info!("{}", message);
    } else if level == Level::ERROR {
        tracing::error!("{}", message);
    } else {
        tracing::warn!("{}", message);
    }
}
