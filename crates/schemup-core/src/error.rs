//! Core error types for the schemup engine.
//!
//! This module provides the [`SchemupError`] enum covering every failure
//! class the engine can surface: splitter configuration errors, statement
//! execution failures, journal storage errors, and run-level conditions
//! such as cancellation.

use std::time::Duration;

use thiserror::Error;

/// The primary error type for the schemup engine.
///
/// The taxonomy follows the engine's failure boundaries:
///
/// - [`Split`](Self::Split) — malformed delimiter configuration; fatal
///   before any statement executes.
/// - [`Statement`](Self::Statement) — a single statement failed; aborts the
///   current script and halts the run. Carries the zero-based statement
///   index and the offending statement text verbatim for diagnosis.
/// - [`Journal`](Self::Journal) — the version-tracking storage is
///   unreachable or a write failed; aborts the run where it occurs.
/// - [`DuplicateEntry`](Self::DuplicateEntry) — a script was recorded twice.
///   The orchestrator never does this; seeing it signals a bug or external
///   tampering with the journal table.
#[derive(Error, Debug)]
pub enum SchemupError {
    /// The delimiter configuration cannot produce well-formed statements.
    #[error("invalid delimiter configuration: {0}")]
    Split(String),

    /// A single statement's execution failed.
    ///
    /// Later statements in the same script are never run and the script is
    /// not journaled.
    #[error("statement {index} failed: {source}")]
    Statement {
        /// Zero-based index of the failing statement within its script.
        index: usize,
        /// The failing statement text, verbatim.
        statement: String,
        /// The underlying execution error.
        #[source]
        source: Box<SchemupError>,
    },

    /// A generic database error reported by the connection.
    #[error("database error: {0}")]
    Database(String),

    /// An operational connection error (open failure, lost session, etc.).
    #[error("connection error: {0}")]
    Connection(String),

    /// A statement exceeded the configured per-statement timeout.
    #[error("statement timed out after {0:?}")]
    Timeout(Duration),

    /// The journal storage is unreachable or a journal operation failed.
    #[error("journal error: {0}")]
    Journal(String),

    /// A script name was recorded in the journal more than once.
    #[error("duplicate journal entry for script '{0}'")]
    DuplicateEntry(String),

    /// The run was cancelled at a script boundary before completion.
    #[error("upgrade run cancelled before completion")]
    Cancelled,

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchemupError {
    /// Wraps an error as a statement failure at the given index.
    pub fn at_statement(self, index: usize, statement: impl Into<String>) -> Self {
        Self::Statement {
            index,
            statement: statement.into(),
            source: Box::new(self),
        }
    }

    /// Returns `true` if this error (or, for a statement failure, its
    /// underlying cause) is a timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Statement { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

/// A convenience type alias for `Result<T, SchemupError>`.
pub type SchemupResult<T> = Result<T, SchemupError>;
