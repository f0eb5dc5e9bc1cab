// ABOUTME: Per-run cache of trigger definitions grouped by database and table
// ABOUTME: Loads each database's triggers once, on first lookup

use crate::error::Result;
use crate::mysql::reader::{self, TriggerInfo};
use mysql_async::Conn;
use std::collections::HashMap;

type ByTable = HashMap<String, Vec<TriggerInfo>>;

/// Trigger definitions seen during one dump
///
/// Owned by a single `dump()` call and dropped with it, so separate runs never
/// share stale definitions.
#[derive(Debug, Default)]
pub struct TriggerCache {
    databases: HashMap<String, ByTable>,
}

impl TriggerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Triggers on `table`, in firing order
    pub async fn triggers_for(
        &mut self,
        conn: &mut Conn,
        database: &str,
        table: &str,
    ) -> Result<&[TriggerInfo]> {
        if !self.databases.contains_key(database) {
            let triggers = reader::list_triggers(conn, database).await?;
            tracing::debug!(
                "Cached {} trigger(s) of database '{}'",
                triggers.len(),
                database
            );
            self.insert(database, triggers);
        }

        Ok(self.lookup(database, table))
    }

    fn insert(&mut self, database: &str, triggers: Vec<TriggerInfo>) {
        let by_table = self.databases.entry(database.to_string()).or_default();
        for trigger in triggers {
            by_table.entry(trigger.table.clone()).or_default().push(trigger);
        }
    }

    fn lookup(&self, database: &str, table: &str) -> &[TriggerInfo] {
        self.databases
            .get(database)
            .and_then(|by_table| by_table.get(table))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
