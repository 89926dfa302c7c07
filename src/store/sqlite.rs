// SPDX-License-Identifier: MPL-2.0

use crate::store::schema::SCHEMA;
use crate::store::{ChangeTracker, StorageChange, Store, StoreError};
use rusqlite::{Connection, OptionalExtension, params};
use std::cell::Cell;
use std::path::Path;

/// File-backed store. Every handle owns its own connection, so two handles
/// on the same file behave like two browser tabs on one origin.
pub struct SqliteStore {
    conn: Connection,
    tracker: ChangeTracker,
    /// `PRAGMA data_version` as of the last poll
    data_version: Cell<i64>,
}

impl SqliteStore {
    /// Open or create the store database at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Path(format!("failed to create store dir: {}", e)))?;
        }

        let conn = Connection::open(path)?;
        Self::migrate(&conn)?;

        let store = Self {
            conn,
            tracker: ChangeTracker::default(),
            data_version: Cell::new(0),
        };
        store.data_version.set(store.read_data_version()?);
        let snapshot = store.entries()?;
        store.tracker.diff(snapshot);

        tracing::debug!(path = %path.display(), "local store opened");
        Ok(store)
    }

    /// Run schema migrations
    fn migrate(conn: &Connection) -> Result<(), StoreError> {
        // Execute the schema (all CREATE IF NOT EXISTS)
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Changes whenever another connection commits to the database file
    fn read_data_version(&self) -> Result<i64, StoreError> {
        Ok(self
            .conn
            .query_row("PRAGMA data_version", [], |row| row.get(0))?)
    }
}

impl Store for SqliteStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO local_storage (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value
            "#,
            params![key, value],
        )?;
        self.tracker.record(key, Some(value));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM local_storage WHERE key = ?", [key])?;
        self.tracker.record(key, None);
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        for key in keys {
            tx.execute("DELETE FROM local_storage WHERE key = ?", [key])?;
        }
        tx.commit()?;

        for key in keys {
            self.tracker.record(key, None);
        }
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(String, String)>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM local_storage ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn poll_external(&self) -> Result<Vec<StorageChange>, StoreError> {
        let version = self.read_data_version()?;
        if version == self.data_version.get() {
            return Ok(Vec::new());
        }
        self.data_version.set(version);

        let changes = self.tracker.diff(self.entries()?);
        if !changes.is_empty() {
            tracing::debug!(count = changes.len(), "external store changes detected");
        }
        Ok(changes)
    }
}
