//! Engine configuration.
//!
//! One plain struct with named fields replaces the fluent fan-out of
//! builder overloads a host might offer: hosts assemble an [`UpgradeConfig`]
//! however they like, and the engine takes a finalized, immutable snapshot
//! at construction.

use std::time::Duration;

use crate::splitter::DelimiterConfig;

/// Transaction discipline applied to each script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionMode {
    /// Statements run directly. If a script fails partway, earlier
    /// statements' effects persist, so scripts must be written idempotently.
    #[default]
    NoTransactions,
    /// Each script runs inside its own transaction: failure rolls the
    /// database back to exactly the state before the script started.
    /// Falls back to direct execution on connections without transaction
    /// support.
    PerScript,
}

/// Configuration snapshot for one upgrade engine.
#[derive(Debug, Clone)]
pub struct UpgradeConfig {
    /// Statement delimiter rules for the target dialect.
    pub delimiters: DelimiterConfig,
    /// Schema holding the journal table, if the target uses schemas.
    pub schema: Option<String>,
    /// Journal table name. Must be stable across runs; renaming it orphans
    /// prior history.
    pub journal_table: String,
    /// Per-statement execution timeout. `None` waits indefinitely.
    pub statement_timeout: Option<Duration>,
    /// Transaction discipline per script.
    pub transaction_mode: TransactionMode,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            delimiters: DelimiterConfig::default(),
            schema: None,
            journal_table: "schemaversions".to_string(),
            statement_timeout: None,
            transaction_mode: TransactionMode::default(),
        }
    }
}

impl UpgradeConfig {
    /// Creates the default configuration: semicolon delimiters, the
    /// `schemaversions` journal table, no timeout, no transactions.
    pub fn new() -> Self {
        Self::default()
    }
}
