//! The upgrade orchestrator.
//!
//! [`UpgradeEngine`] takes an ordered candidate script list and a
//! connection, asks the [`TableJournal`](crate::journal::TableJournal) which
//! scripts are new, executes the pending subset in caller order via the
//! [`ScriptExecutor`](crate::executor::ScriptExecutor), records each success
//! in the journal, and stops at the first failure. The result of one run is
//! an [`UpgradeReport`].

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use schemup_backends::DatabaseConnection;
use schemup_core::{CancelToken, Script, SchemupError, TracingLog, UpgradeLog};

use crate::config::UpgradeConfig;
use crate::executor::ScriptExecutor;
use crate::journal::TableJournal;

/// Per-script outcome within one orchestrator run.
///
/// Every script starts `Pending`. A successful run ends with every script
/// `Applied` or `Skipped`; a failed run has exactly one `Failed` script and
/// leaves everything after it `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStatus {
    /// Not yet checked against the journal.
    Pending,
    /// The journal says this script was already applied; nothing executed.
    Skipped,
    /// Handed to the executor (transient; never appears in a final report).
    Running,
    /// Executed fully and recorded in the journal.
    Applied,
    /// Execution failed; terminal for the whole run.
    Failed,
}

/// The aggregate result of one orchestrator run.
#[derive(Debug)]
pub struct UpgradeReport {
    /// Whether every candidate script ended `Applied` or `Skipped`.
    pub successful: bool,
    /// Names of scripts applied in this run, in execution order.
    pub applied: Vec<String>,
    /// The script that failed, if any.
    pub failed_script: Option<String>,
    /// The underlying error, if the run was not successful.
    pub error: Option<SchemupError>,
    /// Final status of every candidate script, in candidate order.
    pub statuses: Vec<(String, ScriptStatus)>,
}

/// Applies an ordered set of scripts to a target database exactly once each.
///
/// The engine holds a finalized, immutable [`UpgradeConfig`] snapshot; the
/// candidate order is caller-supplied and preserved exactly. Repeated
/// invocations are safe: scripts already journaled are skipped.
pub struct UpgradeEngine {
    scripts: Vec<Script>,
    journal: TableJournal,
    executor: ScriptExecutor,
    log: Arc<dyn UpgradeLog>,
}

impl UpgradeEngine {
    /// Creates an engine over the given configuration and candidate
    /// scripts, logging through [`tracing`].
    pub fn new(config: UpgradeConfig, scripts: Vec<Script>) -> Self {
        Self::with_log(config, scripts, Arc::new(TracingLog))
    }

    /// Creates an engine with a caller-supplied log sink.
    pub fn with_log(
        config: UpgradeConfig,
        scripts: Vec<Script>,
        log: Arc<dyn UpgradeLog>,
    ) -> Self {
        let journal = TableJournal::new(config.schema.as_deref(), &config.journal_table);
        let executor = ScriptExecutor::new(&config, log.clone());
        Self {
            scripts,
            journal,
            executor,
            log,
        }
    }

    /// Returns the journal this engine records into.
    pub fn journal(&self) -> &TableJournal {
        &self.journal
    }

    /// Runs all pending scripts against `conn`.
    pub async fn perform_upgrade(&self, conn: &dyn DatabaseConnection) -> UpgradeReport {
        self.perform_upgrade_with_cancel(conn, &CancelToken::new())
            .await
    }

    /// Runs all pending scripts, honoring `token` between scripts.
    ///
    /// Cancellation is checked only at pending boundaries; a script in
    /// flight always runs to completion, so no statement's effects are left
    /// undefined.
    pub async fn perform_upgrade_with_cancel(
        &self,
        conn: &dyn DatabaseConnection,
        token: &CancelToken,
    ) -> UpgradeReport {
        let mut statuses: Vec<ScriptStatus> = vec![ScriptStatus::Pending; self.scripts.len()];
        let mut applied: Vec<String> = Vec::new();

        // Provision the journal before any lookup or execution; no journal,
        // no safe execution.
        if let Err(err) = self.journal.ensure_storage_exists(conn).await {
            self.log.write_error(&format!("{err}"));
            return self.report(false, applied, None, Some(err), &statuses);
        }

        let executed = match self.journal.applied_scripts(conn).await {
            Ok(names) => names.into_iter().collect::<HashSet<_>>(),
            Err(err) => {
                self.log.write_error(&format!("{err}"));
                return self.report(false, applied, None, Some(err), &statuses);
            }
        };

        for (index, script) in self.scripts.iter().enumerate() {
            if token.is_cancelled() {
                self.log.write_warning(&format!(
                    "Upgrade cancelled before script {}; {} script(s) applied",
                    script.name,
                    applied.len()
                ));
                return self.report(
                    false,
                    applied,
                    None,
                    Some(SchemupError::Cancelled),
                    &statuses,
                );
            }

            if executed.contains(&script.name) {
                statuses[index] = ScriptStatus::Skipped;
                self.log.write_information(&format!(
                    "Script {} was already applied, skipping",
                    script.name
                ));
                continue;
            }

            statuses[index] = ScriptStatus::Running;
            self.log
                .write_information(&format!("Applying script {}", script.name));

            if let Err(err) = self.executor.execute(script, conn).await {
                statuses[index] = ScriptStatus::Failed;
                self.log
                    .write_error(&format!("Script {} failed: {err}", script.name));
                return self.report(
                    false,
                    applied,
                    Some(script.name.clone()),
                    Some(err),
                    &statuses,
                );
            }

            if let Err(err) = self
                .journal
                .record_applied(conn, &script.name, Utc::now())
                .await
            {
                statuses[index] = ScriptStatus::Failed;
                self.log.write_error(&format!(
                    "Script {} executed but could not be journaled: {err}",
                    script.name
                ));
                return self.report(
                    false,
                    applied,
                    Some(script.name.clone()),
                    Some(err),
                    &statuses,
                );
            }

            statuses[index] = ScriptStatus::Applied;
            applied.push(script.name.clone());
        }

        self.log.write_information(&format!(
            "Upgrade successful; {} script(s) applied",
            applied.len()
        ));
        self.report(true, applied, None, None, &statuses)
    }

    fn report(
        &self,
        successful: bool,
        applied: Vec<String>,
        failed_script: Option<String>,
        error: Option<SchemupError>,
        statuses: &[ScriptStatus],
    ) -> UpgradeReport {
        let statuses = self
            .scripts
            .iter()
            .zip(statuses.iter())
            .map(|(script, status)| (script.name.clone(), *status))
            .collect();
        UpgradeReport {
            successful,
            applied,
            failed_script,
            error,
            statuses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemup_backends::RecordingConnection;
    use schemup_core::NoopLog;

    fn engine(scripts: Vec<Script>) -> UpgradeEngine {
        UpgradeEngine::with_log(UpgradeConfig::default(), scripts, Arc::new(NoopLog))
    }

    #[tokio::test]
    async fn test_journal_creation_failure_is_fatal() {
        let conn = RecordingConnection::new().with_failure_on("CREATE TABLE");
        let report = engine(vec![Script::new("a", "SELECT 1;")])
            .perform_upgrade(&conn)
            .await;

        assert!(!report.successful);
        assert!(report.applied.is_empty());
        assert!(report.failed_script.is_none());
        assert!(matches!(report.error, Some(SchemupError::Journal(_))));
        assert_eq!(report.statuses[0].1, ScriptStatus::Pending);
    }

    #[tokio::test]
    async fn test_already_applied_scripts_are_skipped() {
        let conn = RecordingConnection::new();
        conn.queue_query_result(vec!["a".into()]);

        let report = engine(vec![
            Script::new("a", "SELECT 1;"),
            Script::new("b", "SELECT 2;"),
        ])
        .perform_upgrade(&conn)
        .await;

        assert!(report.successful);
        assert_eq!(report.applied, ["b"]);
        assert_eq!(report.statuses[0], ("a".into(), ScriptStatus::Skipped));
        assert_eq!(report.statuses[1], ("b".into(), ScriptStatus::Applied));
        // "SELECT 1" never executed.
        assert!(!conn.recorded().iter().any(|sql| sql == "SELECT 1"));
    }

    #[tokio::test]
    async fn test_failure_halts_run_and_leaves_later_scripts_pending() {
        let conn = RecordingConnection::new().with_failure_on("SELECT 2");
        let report = engine(vec![
            Script::new("a", "SELECT 1;"),
            Script::new("b", "SELECT 2;"),
            Script::new("c", "SELECT 3;"),
        ])
        .perform_upgrade(&conn)
        .await;

        assert!(!report.successful);
        assert_eq!(report.applied, ["a"]);
        assert_eq!(report.failed_script.as_deref(), Some("b"));
        assert_eq!(report.statuses[1].1, ScriptStatus::Failed);
        assert_eq!(report.statuses[2].1, ScriptStatus::Pending);
        assert!(!conn.recorded().iter().any(|sql| sql == "SELECT 3"));
    }

    #[tokio::test]
    async fn test_candidate_order_is_preserved() {
        let conn = RecordingConnection::new();
        let report = engine(vec![
            Script::new("zzz", "SELECT 1;"),
            Script::new("aaa", "SELECT 2;"),
        ])
        .perform_upgrade(&conn)
        .await;

        assert!(report.successful);
        assert_eq!(report.applied, ["zzz", "aaa"]);
    }

    #[tokio::test]
    async fn test_cancellation_stops_at_script_boundary() {
        let conn = RecordingConnection::new();
        let token = CancelToken::new();
        token.cancel();

        let report = engine(vec![Script::new("a", "SELECT 1;")])
            .perform_upgrade_with_cancel(&conn, &token)
            .await;

        assert!(!report.successful);
        assert!(matches!(report.error, Some(SchemupError::Cancelled)));
        assert_eq!(report.statuses[0].1, ScriptStatus::Pending);
        // Only the journal provisioning and lookup ran.
        assert!(!conn.recorded().iter().any(|sql| sql == "SELECT 1"));
    }
}
