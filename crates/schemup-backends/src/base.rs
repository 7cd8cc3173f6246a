//! Base database connection trait.
//!
//! This module defines the [`DatabaseConnection`] trait the engine drives:
//! an open, reusable session handle that can execute statements and,
//! optionally, wrap them in a transaction. Implementations live behind
//! feature flags (see [`sqlite`](crate::sqlite)); the engine is generic over
//! this trait and holds a borrowed connection for the duration of a run.

use schemup_core::SchemupResult;

/// The core trait the upgrade engine executes against.
///
/// All methods are async because database operations are inherently
/// I/O-bound. Backends built on synchronous drivers (like `rusqlite`) wrap
/// operations in `spawn_blocking` to maintain the async interface.
///
/// Transaction methods come in begin/commit/rollback triplets operating on
/// the connection's single implicit transaction slot; the engine never
/// nests transactions. Backends without transactional DDL report
/// `supports_transactions() == false` and the engine falls back to direct
/// execution.
#[async_trait::async_trait]
pub trait DatabaseConnection: Send + Sync {
    /// Returns the vendor name (e.g. "sqlite", "postgresql", "oracle").
    fn vendor(&self) -> &str;

    /// Returns whether this connection can wrap a script in a transaction.
    fn supports_transactions(&self) -> bool {
        true
    }

    /// Executes a single SQL statement that does not return rows.
    ///
    /// Returns the number of rows affected.
    async fn execute(&self, sql: &str) -> SchemupResult<u64>;

    /// Executes a query and returns the first column of every row as text.
    ///
    /// This is the only read shape the engine needs: the journal stores
    /// script names and reads them back.
    async fn query_column(&self, sql: &str) -> SchemupResult<Vec<String>>;

    /// Begins a transaction on this connection.
    async fn begin_transaction(&self) -> SchemupResult<()>;

    /// Commits the current transaction.
    async fn commit(&self) -> SchemupResult<()>;

    /// Rolls back the current transaction.
    async fn rollback(&self) -> SchemupResult<()>;
}
