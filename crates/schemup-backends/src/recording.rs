//! A recording connection for tests.
//!
//! [`RecordingConnection`] implements
//! [`DatabaseConnection`](crate::base::DatabaseConnection) without any real
//! database: it records every statement it is asked to execute, returns
//! scripted query results, and can inject failures or delays at chosen
//! points. Engine tests use it to assert execution order, transaction
//! discipline, and failure handling.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use schemup_core::{SchemupError, SchemupResult};

use crate::base::DatabaseConnection;

/// An in-memory connection double that records executed SQL.
#[derive(Debug, Default)]
pub struct RecordingConnection {
    log: Mutex<Vec<String>>,
    query_results: Mutex<VecDeque<Vec<String>>>,
    executed: AtomicUsize,
    fail_on: Option<String>,
    fail_at: Option<usize>,
    statement_delay: Option<Duration>,
    no_transactions: bool,
}

impl RecordingConnection {
    /// Creates a connection that accepts everything and returns empty
    /// query results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails any executed statement whose SQL contains `fragment`.
    #[must_use]
    pub fn with_failure_on(mut self, fragment: impl Into<String>) -> Self {
        self.fail_on = Some(fragment.into());
        self
    }

    /// Fails the `index`-th executed statement (zero-based, queries and
    /// transaction control excluded).
    #[must_use]
    pub fn with_failure_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Sleeps for `delay` before executing each statement, for timeout tests.
    #[must_use]
    pub fn with_statement_delay(mut self, delay: Duration) -> Self {
        self.statement_delay = Some(delay);
        self
    }

    /// Reports no transaction support, so the engine executes directly.
    #[must_use]
    pub fn without_transactions(mut self) -> Self {
        self.no_transactions = true;
        self
    }

    /// Queues the result of the next `query_column` call. Results are
    /// consumed in FIFO order; an exhausted queue yields empty results.
    pub fn queue_query_result(&self, rows: Vec<String>) {
        if let Ok(mut queue) = self.query_results.lock() {
            queue.push_back(rows);
        }
    }

    /// Returns everything this connection was asked to run, in order,
    /// including `BEGIN`/`COMMIT`/`ROLLBACK` markers and queries.
    pub fn recorded(&self) -> Vec<String> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn record(&self, sql: &str) {
        if let Ok(mut log) = self.log.lock() {
            log.push(sql.to_string());
        }
    }
}

#[async_trait::async_trait]
impl DatabaseConnection for RecordingConnection {
    fn vendor(&self) -> &str {
        "recording"
    }

    fn supports_transactions(&self) -> bool {
        !self.no_transactions
    }

    async fn execute(&self, sql: &str) -> SchemupResult<u64> {
        if let Some(delay) = self.statement_delay {
            tokio::time::sleep(delay).await;
        }
        self.record(sql);

        let index = self.executed.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == Some(index) {
            return Err(SchemupError::Database(format!(
                "scripted failure at statement {index}"
            )));
        }
        if let Some(fragment) = &self.fail_on {
            if sql.contains(fragment.as_str()) {
                return Err(SchemupError::Database(format!(
                    "scripted failure on '{fragment}'"
                )));
            }
        }
        Ok(0)
    }

    async fn query_column(&self, sql: &str) -> SchemupResult<Vec<String>> {
        self.record(sql);
        let rows = self
            .query_results
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or_default();
        Ok(rows)
    }

    async fn begin_transaction(&self) -> SchemupResult<()> {
        self.record("BEGIN");
        Ok(())
    }

    async fn commit(&self) -> SchemupResult<()> {
        self.record("COMMIT");
        Ok(())
    }

    async fn rollback(&self) -> SchemupResult<()> {
        self.record("ROLLBACK");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_statements_in_order() {
        let conn = RecordingConnection::new();
        conn.execute("CREATE TABLE a (id INT)").await.unwrap();
        conn.execute("CREATE TABLE b (id INT)").await.unwrap();
        assert_eq!(
            conn.recorded(),
            ["CREATE TABLE a (id INT)", "CREATE TABLE b (id INT)"]
        );
    }

    #[tokio::test]
    async fn test_failure_on_fragment() {
        let conn = RecordingConnection::new().with_failure_on("DROP");
        conn.execute("CREATE TABLE a (id INT)").await.unwrap();
        let result = conn.execute("DROP TABLE a").await;
        assert!(matches!(result, Err(SchemupError::Database(_))));
    }

    #[tokio::test]
    async fn test_failure_at_index_counts_only_executes() {
        let conn = RecordingConnection::new().with_failure_at(1);
        conn.query_column("SELECT 1").await.unwrap();
        conn.execute("first").await.unwrap();
        let result = conn.execute("second").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_queued_query_results_fifo() {
        let conn = RecordingConnection::new();
        conn.queue_query_result(vec!["a".into()]);
        conn.queue_query_result(vec!["b".into()]);
        assert_eq!(conn.query_column("SELECT x").await.unwrap(), ["a"]);
        assert_eq!(conn.query_column("SELECT x").await.unwrap(), ["b"]);
        assert!(conn.query_column("SELECT x").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_without_transactions() {
        let conn = RecordingConnection::new().without_transactions();
        assert!(!conn.supports_transactions());
    }
}
