//! SQLite-backed external scheduler tables.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Transaction};

use super::schema;
use super::{ExternalScheduler, PreferenceWriter, TimePrefRow};
use crate::error::Result;

/// The external scheduler's instructor and time-preference tables in a
/// SQLite database, with a single-row sequence for unique ids.
pub struct SqliteScheduler {
    conn: Connection,
}

impl SqliteScheduler {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn migrate(&self) -> Result<()> {
        schema::run_migrations(&self.conn)
    }

    /// Inserts an instructor row and returns its owner id.
    pub fn add_instructor(&mut self, external_uid: &str, name: &str) -> Result<i64> {
        let tx = self.conn.transaction()?;
        let id = next_id(&tx)?;
        tx.execute(
            "INSERT INTO departmental_instructor (uniqueid, external_uid, name) VALUES (?, ?, ?)",
            (id, external_uid, name),
        )?;
        tx.commit()?;
        Ok(id)
    }

    /// Number of time-preference rows across all owners.
    pub fn time_pref_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM time_pref", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn next_id(tx: &Transaction<'_>) -> Result<i64> {
    tx.execute("UPDATE unique_id_seq SET next_id = next_id + 1", [])?;
    let next: Option<i64> = tx
        .query_row("SELECT next_id - 1 FROM unique_id_seq", [], |row| row.get(0))
        .optional()?;
    next.ok_or_else(|| crate::Error::Storage("unique_id_seq is empty".to_string()))
}

struct SqliteWriter<'a, 'conn> {
    tx: &'a Transaction<'conn>,
}

impl PreferenceWriter for SqliteWriter<'_, '_> {
    fn next_unique_id(&mut self) -> Result<i64> {
        next_id(self.tx)
    }

    fn delete_owner_rows(&mut self, owner_id: i64) -> Result<usize> {
        Ok(self
            .tx
            .execute("DELETE FROM time_pref WHERE owner_id = ?", [owner_id])?)
    }

    fn insert_row(&mut self, row: &TimePrefRow) -> Result<()> {
        self.tx.execute(
            "INSERT INTO time_pref (owner_id, pref_level_id, preference, time_pattern_id, uniqueid)
             VALUES (?, ?, ?, ?, ?)",
            (
                row.owner_id,
                row.pref_level_id,
                &row.preference,
                row.time_pattern_id,
                row.unique_id,
            ),
        )?;
        Ok(())
    }
}

impl ExternalScheduler for SqliteScheduler {
    fn instructor_ids(&self, external_uid: &str) -> Result<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uniqueid FROM departmental_instructor WHERE external_uid = ?")?;
        let ids = stmt
            .query_map([external_uid], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    fn owner_rows(&self, owner_id: i64) -> Result<Vec<TimePrefRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT uniqueid, owner_id, pref_level_id, preference, time_pattern_id
             FROM time_pref WHERE owner_id = ? ORDER BY uniqueid",
        )?;
        let rows = stmt
            .query_map([owner_id], |row| {
                Ok(TimePrefRow {
                    unique_id: row.get(0)?,
                    owner_id: row.get(1)?,
                    pref_level_id: row.get(2)?,
                    preference: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    time_pattern_id: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn with_transaction<R, F>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn PreferenceWriter) -> Result<R>,
    {
        let tx = self.conn.transaction()?;
        let out = {
            let mut writer = SqliteWriter { tx: &tx };
            f(&mut writer)?
        };
        tx.commit()?;
        Ok(out)
    }
}
