//! SQLite connection using `rusqlite`.
//!
//! Provides [`SqliteConnection`], which implements
//! [`DatabaseConnection`](crate::base::DatabaseConnection) by wrapping
//! `rusqlite` calls in `tokio::task::spawn_blocking` behind an async mutex.
//!
//! - WAL mode is enabled for file-based databases
//! - In-memory databases are supported via the `:memory:` path

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use schemup_core::{SchemupError, SchemupResult};

use crate::base::DatabaseConnection;

/// A SQLite connection.
///
/// Uses a `Mutex`-guarded `rusqlite::Connection`; all operations run via
/// `spawn_blocking` so they never block the async runtime.
pub struct SqliteConnection {
    /// The database file path (or ":memory:").
    path: PathBuf,
    conn: Arc<Mutex<rusqlite::Connection>>,
}

impl SqliteConnection {
    /// Opens a SQLite database at the given path.
    ///
    /// If the path is `:memory:`, an in-memory database is created. WAL
    /// journal mode and foreign keys are enabled for file databases.
    ///
    /// # Errors
    ///
    /// Returns [`SchemupError::Connection`] if the database cannot be opened.
    pub fn open(path: impl Into<PathBuf>) -> SchemupResult<Self> {
        let path = path.into();
        let in_memory = path.to_str() == Some(":memory:");
        let conn = if in_memory {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(&path)
        }
        .map_err(|e| SchemupError::Connection(format!("SQLite open failed: {e}")))?;

        if !in_memory {
            conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
                .map_err(|e| {
                    SchemupError::Connection(format!("Failed to set pragmas: {e}"))
                })?;
        }

        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory database (convenience constructor).
    pub fn memory() -> SchemupResult<Self> {
        Self::open(":memory:")
    }

    /// Returns the database file path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait::async_trait]
impl DatabaseConnection for SqliteConnection {
    fn vendor(&self) -> &str {
        "sqlite"
    }

    async fn execute(&self, sql: &str) -> SchemupResult<u64> {
        let conn = self.conn.clone();
        let sql = sql.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let count = conn
                .execute(&sql, [])
                .map_err(|e| SchemupError::Database(format!("{e}")))?;
            Ok(count as u64)
        })
        .await
        .map_err(|e| SchemupError::Database(format!("Task join error: {e}")))?
    }

    async fn query_column(&self, sql: &str) -> SchemupResult<Vec<String>> {
        let conn = self.conn.clone();
        let sql = sql.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| SchemupError::Database(format!("{e}")))?;

            let mut rows = stmt
                .query([])
                .map_err(|e| SchemupError::Database(format!("{e}")))?;

            let mut values = Vec::new();
            while let Some(row) = rows
                .next()
                .map_err(|e| SchemupError::Database(format!("{e}")))?
            {
                let value: String = match row.get_ref(0) {
                    Ok(rusqlite::types::ValueRef::Null) => String::new(),
                    Ok(rusqlite::types::ValueRef::Integer(v)) => v.to_string(),
                    Ok(rusqlite::types::ValueRef::Real(v)) => v.to_string(),
                    Ok(rusqlite::types::ValueRef::Text(b)) => {
                        String::from_utf8_lossy(b).to_string()
                    }
                    Ok(rusqlite::types::ValueRef::Blob(b)) => {
                        String::from_utf8_lossy(b).to_string()
                    }
                    Err(e) => return Err(SchemupError::Database(format!("{e}"))),
                };
                values.push(value);
            }

            Ok(values)
        })
        .await
        .map_err(|e| SchemupError::Database(format!("Task join error: {e}")))?
    }

    async fn begin_transaction(&self) -> SchemupResult<()> {
        self.execute("BEGIN").await?;
        Ok(())
    }

    async fn commit(&self) -> SchemupResult<()> {
        self.execute("COMMIT").await?;
        Ok(())
    }

    async fn rollback(&self) -> SchemupResult<()> {
        self.execute("ROLLBACK").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_execute_and_query_column() {
        let conn = SqliteConnection::memory().unwrap();
        conn.execute("CREATE TABLE t (name TEXT)").await.unwrap();
        conn.execute("INSERT INTO t VALUES ('a')").await.unwrap();
        conn.execute("INSERT INTO t VALUES ('b')").await.unwrap();

        let names = conn
            .query_column("SELECT name FROM t ORDER BY name")
            .await
            .unwrap();
        assert_eq!(names, ["a", "b"]);
    }

    #[tokio::test]
    async fn test_execute_reports_syntax_errors() {
        let conn = SqliteConnection::memory().unwrap();
        let result = conn.execute("NOT VALID SQL").await;
        assert!(matches!(result, Err(SchemupError::Database(_))));
    }

    #[tokio::test]
    async fn test_transaction_rollback_undoes_statements() {
        let conn = SqliteConnection::memory().unwrap();
        conn.execute("CREATE TABLE t (name TEXT)").await.unwrap();

        conn.begin_transaction().await.unwrap();
        conn.execute("INSERT INTO t VALUES ('a')").await.unwrap();
        conn.rollback().await.unwrap();

        let names = conn.query_column("SELECT name FROM t").await.unwrap();
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn test_vendor_and_transaction_support() {
        let conn = SqliteConnection::memory().unwrap();
        assert_eq!(conn.vendor(), "sqlite");
        assert!(conn.supports_transactions());
    }
}
