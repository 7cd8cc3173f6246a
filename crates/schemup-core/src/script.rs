//! Script and journal-entry data types.
//!
//! A [`Script`] is one named unit of change: a raw SQL body that the engine
//! splits into statements and applies exactly once. A [`JournalEntry`] is
//! the durable record that a script has been fully applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default run-order group for scripts that do not specify one.
pub const DEFAULT_RUN_ORDER: u32 = 100;

/// A named unit of change: one migration script.
///
/// Scripts are immutable once created and owned by the caller; the engine
/// only reads them. The `name` is the journal key, so it must be unique and
/// stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Unique identifier, used as the journal key.
    pub name: String,
    /// Raw script text, split into statements at execution time.
    pub body: String,
    /// Run-order hint. Lower groups run first; within a group, callers
    /// conventionally order by name. See [`sort_for_run`].
    pub run_order: u32,
}

impl Script {
    /// Creates a script with the default run-order group.
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            run_order: DEFAULT_RUN_ORDER,
        }
    }

    /// Sets the run-order group.
    #[must_use]
    pub fn with_run_order(mut self, run_order: u32) -> Self {
        self.run_order = run_order;
        self
    }
}

/// Stably orders scripts by `(run_order, name)`.
///
/// This is the conventional ordering for filesystem-discovered scripts. The
/// upgrade orchestrator itself never reorders the list it is handed; callers
/// that want this ordering apply it before constructing the engine.
pub fn sort_for_run(scripts: &mut [Script]) {
    scripts.sort_by(|a, b| a.run_order.cmp(&b.run_order).then_with(|| a.name.cmp(&b.name)));
}

/// A durable record of one fully applied script.
///
/// Presence of an entry means "fully applied", never "partially applied":
/// entries are written only after the executor reports full success for the
/// script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// The script name this entry records.
    pub script_name: String,
    /// When the script was applied.
    pub applied: DateTime<Utc>,
}

impl JournalEntry {
    /// Creates an entry for a script applied at the given time.
    pub fn new(script_name: impl Into<String>, applied: DateTime<Utc>) -> Self {
        Self {
            script_name: script_name.into(),
            applied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_new_defaults() {
        let script = Script::new("0001_initial", "CREATE TABLE t (id INT);");
        assert_eq!(script.name, "0001_initial");
        assert_eq!(script.run_order, DEFAULT_RUN_ORDER);
    }

    #[test]
    fn test_script_with_run_order() {
        let script = Script::new("9999_last", "SELECT 1;").with_run_order(200);
        assert_eq!(script.run_order, 200);
    }

    #[test]
    fn test_sort_for_run_orders_by_group_then_name() {
        let mut scripts = vec![
            Script::new("b", "").with_run_order(200),
            Script::new("c", "").with_run_order(100),
            Script::new("a", "").with_run_order(100),
        ];
        sort_for_run(&mut scripts);
        let names: Vec<_> = scripts.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "c", "b"]);
    }

    #[test]
    fn test_sort_for_run_is_stable_within_group() {
        let mut scripts = vec![
            Script::new("x", "first body"),
            Script::new("x", "second body"),
        ];
        sort_for_run(&mut scripts);
        assert_eq!(scripts[0].body, "first body");
    }

    #[test]
    fn test_journal_entry_roundtrip() {
        let entry = JournalEntry::new("0001_initial", Utc::now());
        let json = serde_json::to_string(&entry).unwrap();
        let back: JournalEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }
}
