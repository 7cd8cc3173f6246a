//! # schemup-engine
//!
//! The migration-execution subsystem of schemup: applies a sequence of
//! idempotent change-scripts to a target database exactly once, in a
//! deterministic order, recording applied scripts in a version journal so
//! repeated invocations are safe.
//!
//! ## Architecture
//!
//! - [`DelimiterConfig`](splitter::DelimiterConfig) splits raw script text
//!   into executable statements under database-specific delimiter rules.
//! - [`TableJournal`](journal::TableJournal) is the durable record of
//!   applied scripts inside the target database.
//! - [`ScriptExecutor`](executor::ScriptExecutor) drives one script's
//!   statements in order under the transaction and timeout policy.
//! - [`UpgradeEngine`](upgrade::UpgradeEngine) computes the pending subset,
//!   executes it in caller order, and returns an
//!   [`UpgradeReport`](upgrade::UpgradeReport).
//!
//! ## Module Overview
//!
//! - [`splitter`] - `DelimiterConfig` statement splitting
//! - [`journal`] - `TableJournal`
//! - [`executor`] - `ScriptExecutor`
//! - [`upgrade`] - `UpgradeEngine`, `UpgradeReport`, `ScriptStatus`
//! - [`config`] - `UpgradeConfig`, `TransactionMode`

#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::format_push_string)]
#![allow(clippy::result_large_err)]

pub mod config;
pub mod executor;
pub mod journal;
pub mod splitter;
pub mod upgrade;

// Re-export key types at the crate root.
pub use config::{TransactionMode, UpgradeConfig};
pub use executor::ScriptExecutor;
pub use journal::TableJournal;
pub use splitter::DelimiterConfig;
pub use upgrade::{ScriptStatus, UpgradeEngine, UpgradeReport};
