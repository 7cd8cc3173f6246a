//! Script execution.
//!
//! [`ScriptExecutor`] drives one script: it asks the splitter for the
//! statement list, executes each statement against the connection strictly
//! in order, and reports either full success or the precise failure point.
//! Later statements are never run after a failure, and a failed script is
//! never journaled by the orchestrator.

use std::sync::Arc;
use std::time::Duration;

use schemup_backends::DatabaseConnection;
use schemup_core::{Script, SchemupError, SchemupResult, UpgradeLog};

use crate::config::{TransactionMode, UpgradeConfig};
use crate::splitter::DelimiterConfig;

/// Executes one script's statements in order under the configured
/// transaction and timeout policy.
pub struct ScriptExecutor {
    delimiters: DelimiterConfig,
    transaction_mode: TransactionMode,
    statement_timeout: Option<Duration>,
    log: Arc<dyn UpgradeLog>,
}

impl ScriptExecutor {
    /// Creates an executor from a configuration snapshot.
    pub fn new(config: &UpgradeConfig, log: Arc<dyn UpgradeLog>) -> Self {
        Self {
            delimiters: config.delimiters.clone(),
            transaction_mode: config.transaction_mode,
            statement_timeout: config.statement_timeout,
            log,
        }
    }

    /// Executes every statement of `script` against `conn`.
    ///
    /// With [`TransactionMode::PerScript`] on a transactional connection the
    /// whole script is atomic: any failure rolls back to the state before
    /// the script started. Otherwise earlier statements' effects persist on
    /// failure, so a re-run after fixing the script may re-execute them.
    ///
    /// A script that splits to zero statements succeeds vacuously.
    ///
    /// # Errors
    ///
    /// Returns [`SchemupError::Statement`] naming the zero-based index and
    /// verbatim text of the first failing statement. A timed-out statement
    /// carries [`SchemupError::Timeout`] as its source.
    pub async fn execute(
        &self,
        script: &Script,
        conn: &dyn DatabaseConnection,
    ) -> SchemupResult<()> {
        let statements = self.delimiters.split(&script.body);
        if statements.is_empty() {
            self.log.write_information(&format!(
                "Script {} contains no statements; nothing to execute",
                script.name
            ));
            return Ok(());
        }

        let wants_transaction = self.transaction_mode == TransactionMode::PerScript;
        let transactional = wants_transaction && conn.supports_transactions();
        if wants_transaction && !transactional {
            self.log.write_warning(&format!(
                "Connection does not support transactions; script {} runs without rollback protection",
                script.name
            ));
        }

        if transactional {
            conn.begin_transaction().await?;
        }

        match self.run_statements(&statements, conn).await {
            Ok(()) => {
                if transactional {
                    conn.commit().await?;
                }
                Ok(())
            }
            Err(err) => {
                if transactional {
                    if let Err(rollback_err) = conn.rollback().await {
                        self.log.write_error(&format!(
                            "Rollback of script {} failed: {rollback_err}",
                            script.name
                        ));
                    }
                }
                Err(err)
            }
        }
    }

    async fn run_statements(
        &self,
        statements: &[String],
        conn: &dyn DatabaseConnection,
    ) -> SchemupResult<()> {
        for (index, statement) in statements.iter().enumerate() {
            if let Err(err) = self.run_one(statement, conn).await {
                return Err(err.at_statement(index, statement.clone()));
            }
        }
        Ok(())
    }

    async fn run_one(&self, statement: &str, conn: &dyn DatabaseConnection) -> SchemupResult<()> {
        match self.statement_timeout {
            Some(limit) => match tokio::time::timeout(limit, conn.execute(statement)).await {
                Ok(result) => result.map(|_| ()),
                Err(_) => Err(SchemupError::Timeout(limit)),
            },
            None => conn.execute(statement).await.map(|_| ()),
        }
    }
}
