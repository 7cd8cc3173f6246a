//! # schemup-core
//!
//! Core types shared by the schemup engine crates: the [`Script`] and
//! [`JournalEntry`] data model, the [`SchemupError`] taxonomy, the
//! [`UpgradeLog`] sink, and cooperative [`CancelToken`] cancellation.

pub mod cancel;
pub mod error;
pub mod logging;
pub mod script;

pub use cancel::CancelToken;
pub use error::{SchemupError, SchemupResult};
pub use logging::{setup_logging, CaptureLog, NoopLog, TracingLog, UpgradeLog};
pub use script::{sort_for_run, JournalEntry, Script, DEFAULT_RUN_ORDER};
