//! Logging integration for the schemup engine.
//!
//! The engine reports progress through the [`UpgradeLog`] sink rather than
//! logging directly, so hosts can route output wherever they like. The
//! default sink, [`TracingLog`], forwards to the [`tracing`] ecosystem;
//! [`setup_logging`] installs a global subscriber for binaries that have no
//! subscriber of their own.

use std::sync::Mutex;

/// A sink for engine progress and error messages.
///
/// The engine never depends on log content; it only calls these methods as
/// scripts are applied, skipped, or failed.
pub trait UpgradeLog: Send + Sync {
    /// Writes an informational message.
    fn write_information(&self, message: &str);

    /// Writes a warning.
    fn write_warning(&self, message: &str);

    /// Writes an error message.
    fn write_error(&self, message: &str);
}

/// The default log sink: forwards to [`tracing`] at the matching levels.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl UpgradeLog for TracingLog {
    fn write_information(&self, message: &str) {
        tracing::info!(target: "schemup", "{message}");
    }

    fn write_warning(&self, message: &str) {
        tracing::warn!(target: "schemup", "{message}");
    }

    fn write_error(&self, message: &str) {
        tracing::error!(target: "schemup", "{message}");
    }
}

/// A sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLog;

impl UpgradeLog for NoopLog {
    fn write_information(&self, _message: &str) {}
    fn write_warning(&self, _message: &str) {}
    fn write_error(&self, _message: &str) {}
}

/// A sink that captures messages in memory, for tests and host reporting.
#[derive(Debug, Default)]
pub struct CaptureLog {
    entries: Mutex<Vec<String>>,
}

impl CaptureLog {
    /// Creates an empty capture log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything written so far, prefixed by level.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn push(&self, level: &str, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(format!("{level}: {message}"));
        }
    }
}

impl UpgradeLog for CaptureLog {
    fn write_information(&self, message: &str) {
        self.push("info", message);
    }

    fn write_warning(&self, message: &str) {
        self.push("warn", message);
    }

    fn write_error(&self, message: &str) {
        self.push("error", message);
    }
}

/// Installs a global tracing subscriber using the given env-filter directive
/// (e.g. "info", "schemup=debug").
///
/// Does nothing if a subscriber is already installed, so it is safe to call
/// from tests and library consumers alike.
pub fn setup_logging(filter: &str) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .ok();
}
