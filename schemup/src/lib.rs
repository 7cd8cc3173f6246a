//! # schemup
//!
//! A transactional, journaled change-script upgrade engine: apply a sequence
//! of idempotent SQL scripts to a target database exactly once, in a
//! deterministic order.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. Depend on `schemup` for the whole engine, or on individual
//! crates for finer-grained control.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use schemup::core::{Script, TracingLog};
//! use schemup::engine::{UpgradeConfig, UpgradeEngine};
//! # async fn run(conn: &dyn schemup::backends::DatabaseConnection) {
//!
//! let scripts = vec![
//!     Script::new("0001_users", "CREATE TABLE users (id INTEGER PRIMARY KEY);"),
//!     Script::new("0002_posts", "CREATE TABLE posts (id INTEGER PRIMARY KEY);"),
//! ];
//! let engine = UpgradeEngine::with_log(UpgradeConfig::default(), scripts, Arc::new(TracingLog));
//! let report = engine.perform_upgrade(conn).await;
//! assert!(report.successful);
//! # }
//! ```

/// Core types: scripts, journal entries, errors, logging, cancellation.
pub use schemup_core as core;

/// Connection abstraction and the shipped backends.
pub use schemup_backends as backends;

/// The upgrade engine: splitter, journal, executor, orchestrator.
pub use schemup_engine as engine;
