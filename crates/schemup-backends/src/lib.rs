//! # schemup-backends
//!
//! The connection abstraction the schemup engine executes against, plus the
//! implementations shipped with the workspace: a `rusqlite`-based SQLite
//! driver (behind the `sqlite` feature) and an always-available
//! [`RecordingConnection`] test double.

pub mod base;
pub mod recording;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use base::DatabaseConnection;
pub use recording::RecordingConnection;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnection;
