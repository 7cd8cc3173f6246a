//! The version journal.
//!
//! [`TableJournal`] keeps the durable record of applied scripts inside the
//! target database itself, in a version table (`schemaversions` by default).
//! The journal is the sole source of truth for "already applied" and, via
//! the table's UNIQUE script-name constraint, the sole arbitration point
//! between concurrent upgrade processes: two racing runs cannot both insert
//! the same script name.

use chrono::{DateTime, SecondsFormat, Utc};

use schemup_backends::DatabaseConnection;
use schemup_core::{SchemupError, SchemupResult};

/// Durable record of applied scripts, stored as a table in the target
/// database.
///
/// The table layout is one row per fully applied script: a unique
/// `script_name` column and an `applied` timestamp. Table and schema naming
/// is caller-configurable but must be stable across runs; renaming the table
/// orphans prior history.
#[derive(Debug, Clone)]
pub struct TableJournal {
    schema: Option<String>,
    table: String,
}

impl Default for TableJournal {
    fn default() -> Self {
        Self::new(None, "schemaversions")
    }
}

impl TableJournal {
    /// Creates a journal over the given schema and table name.
    pub fn new(schema: Option<&str>, table: &str) -> Self {
        Self {
            schema: schema.map(str::to_string),
            table: table.to_string(),
        }
    }

    /// Returns the quoted, schema-qualified table name.
    pub fn qualified_table(&self) -> String {
        match &self.schema {
            Some(schema) => format!("\"{}\".\"{}\"", schema, self.table),
            None => format!("\"{}\"", self.table),
        }
    }

    fn create_table_sql(&self, vendor: &str) -> String {
        let table = self.qualified_table();
        match vendor {
            "sqlite" => format!(
                "CREATE TABLE IF NOT EXISTS {table} (\
                    \"script_name\" TEXT NOT NULL UNIQUE, \
                    \"applied\" TEXT NOT NULL\
                )"
            ),
            _ => format!(
                "CREATE TABLE IF NOT EXISTS {table} (\
                    \"script_name\" VARCHAR(255) NOT NULL UNIQUE, \
                    \"applied\" TIMESTAMP NOT NULL\
                )"
            ),
        }
    }

    /// Idempotently creates the version table if it does not exist.
    ///
    /// Safe to call on every run; never drops or alters existing data.
    /// Failure here is fatal for the whole run: without a journal there is
    /// no safe execution.
    pub async fn ensure_storage_exists(
        &self,
        conn: &dyn DatabaseConnection,
    ) -> SchemupResult<()> {
        let sql = self.create_table_sql(conn.vendor());
        conn.execute(&sql).await.map_err(|e| {
            SchemupError::Journal(format!(
                "failed to create journal table {}: {e}",
                self.qualified_table()
            ))
        })?;
        Ok(())
    }

    /// Returns whether the named script has been recorded as applied.
    ///
    /// Reads the table fresh on every call; entries committed by other
    /// processes since the last call are visible.
    pub async fn is_applied(
        &self,
        conn: &dyn DatabaseConnection,
        script_name: &str,
    ) -> SchemupResult<bool> {
        let sql = format!(
            "SELECT \"script_name\" FROM {} WHERE \"script_name\" = '{}'",
            self.qualified_table(),
            escape_literal(script_name)
        );
        let rows = conn
            .query_column(&sql)
            .await
            .map_err(|e| SchemupError::Journal(format!("journal lookup failed: {e}")))?;
        Ok(!rows.is_empty())
    }

    /// Returns the names of all applied scripts, ordered by name.
    pub async fn applied_scripts(
        &self,
        conn: &dyn DatabaseConnection,
    ) -> SchemupResult<Vec<String>> {
        let sql = format!(
            "SELECT \"script_name\" FROM {} ORDER BY \"script_name\"",
            self.qualified_table()
        );
        conn.query_column(&sql)
            .await
            .map_err(|e| SchemupError::Journal(format!("journal lookup failed: {e}")))
    }

    /// Records a script as fully applied at the given time.
    ///
    /// # Errors
    ///
    /// Returns [`SchemupError::DuplicateEntry`] if the script is already
    /// recorded. The orchestrator never records a script twice; this guards
    /// against bugs and external tampering with the journal table.
    pub async fn record_applied(
        &self,
        conn: &dyn DatabaseConnection,
        script_name: &str,
        applied: DateTime<Utc>,
    ) -> SchemupResult<()> {
        if self.is_applied(conn, script_name).await? {
            return Err(SchemupError::DuplicateEntry(script_name.to_string()));
        }
        let sql = format!(
            "INSERT INTO {} (\"script_name\", \"applied\") VALUES ('{}', '{}')",
            self.qualified_table(),
            escape_literal(script_name),
            applied.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        conn.execute(&sql)
            .await
            .map_err(|e| SchemupError::Journal(format!("journal insert failed: {e}")))?;
        Ok(())
    }
}

/// Doubles single quotes for embedding a value in a SQL string literal.
fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemup_backends::RecordingConnection;

    #[test]
    fn test_qualified_table_with_and_without_schema() {
        assert_eq!(TableJournal::default().qualified_table(), "\"schemaversions\"");
        assert_eq!(
            TableJournal::new(Some("app"), "versions").qualified_table(),
            "\"app\".\"versions\""
        );
    }

    #[test]
    fn test_create_table_sql_is_vendor_aware() {
        let journal = TableJournal::default();
        let sqlite = journal.create_table_sql("sqlite");
        assert!(sqlite.contains("CREATE TABLE IF NOT EXISTS"));
        assert!(sqlite.contains("TEXT NOT NULL UNIQUE"));

        let generic = journal.create_table_sql("oracle");
        assert!(generic.contains("VARCHAR(255) NOT NULL UNIQUE"));
        assert!(generic.contains("TIMESTAMP"));
    }

    #[tokio::test]
    async fn test_ensure_storage_exists_issues_create() {
        let conn = RecordingConnection::new();
        let journal = TableJournal::default();
        journal.ensure_storage_exists(&conn).await.unwrap();

        let recorded = conn.recorded();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].starts_with("CREATE TABLE IF NOT EXISTS \"schemaversions\""));
    }

    #[tokio::test]
    async fn test_is_applied_reflects_query_result() {
        let conn = RecordingConnection::new();
        let journal = TableJournal::default();

        conn.queue_query_result(vec!["Script0001".into()]);
        assert!(journal.is_applied(&conn, "Script0001").await.unwrap());
        assert!(!journal.is_applied(&conn, "Script0002").await.unwrap());
    }

    #[tokio::test]
    async fn test_record_applied_escapes_quotes() {
        let conn = RecordingConnection::new();
        let journal = TableJournal::default();
        journal
            .record_applied(&conn, "it's a script", Utc::now())
            .await
            .unwrap();

        let recorded = conn.recorded();
        let insert = recorded.last().unwrap();
        assert!(insert.contains("'it''s a script'"));
    }

    #[tokio::test]
    async fn test_record_applied_rejects_duplicates() {
        let conn = RecordingConnection::new();
        conn.queue_query_result(vec!["Script0001".into()]);

        let journal = TableJournal::default();
        let result = journal.record_applied(&conn, "Script0001", Utc::now()).await;
        assert!(matches!(result, Err(SchemupError::DuplicateEntry(name)) if name == "Script0001"));
    }

    #[tokio::test]
    async fn test_failures_surface_as_journal_errors() {
        let conn = RecordingConnection::new().with_failure_on("CREATE TABLE");
        let journal = TableJournal::default();
        let result = journal.ensure_storage_exists(&conn).await;
        assert!(matches!(result, Err(SchemupError::Journal(_))));
    }
}
