mod schema;

use anyhow::Context;
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use crate::models::*;

#[derive(Debug, thiserror::Error)]
pub(crate) enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("a record needs a friend name")]
    EmptyFriend,
}

pub(crate) type StorageResult<T> = std::result::Result<T, StorageError>;

const RECORD_COLUMNS: &str = "id, owner, amount, friend, description, created_at";

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Drop every table so later statements fail like a lost connection would.
    #[cfg(test)]
    pub(crate) fn break_for_test(&self) -> anyhow::Result<()> {
        self.conn
            .execute_batch("DROP TABLE records; DROP TABLE pref;")?;
        Ok(())
    }

    fn migrate(&mut self) -> StorageResult<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(version = schema::CURRENT_VERSION, "created database schema");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(
                from = current,
                to = schema::CURRENT_VERSION,
                "migrated database schema"
            );
        }

        Ok(())
    }

    fn record_from_row(row: &Row<'_>) -> rusqlite::Result<Record> {
        let amount_str: String = row.get(2)?;
        Ok(Record {
            id: Some(row.get(0)?),
            owner: row.get(1)?,
            amount: Decimal::from_str(&amount_str).unwrap_or_default(),
            friend: row.get(3)?,
            desc: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    // ── Records ───────────────────────────────────────────────

    /// Persist a new record. The caller resolves the default friend first;
    /// an empty `friend` is rejected.
    pub(crate) fn add_record(
        &self,
        owner: i64,
        friend: &str,
        amount: Decimal,
        desc: &str,
    ) -> StorageResult<i64> {
        if friend.trim().is_empty() {
            return Err(StorageError::EmptyFriend);
        }
        let record = Record::new(owner, friend.to_string(), amount, desc.to_string());
        self.insert_record(&record)
    }

    pub(crate) fn insert_record(&self, record: &Record) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO records (owner, amount, friend, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.owner,
                record.amount.to_string(),
                record.friend,
                record.desc,
                record.created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Delete one record. Returns the rows that were removed, which is empty
    /// when `id` does not exist or belongs to another owner.
    pub(crate) fn delete_record(&self, owner: i64, id: i64) -> StorageResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(&format!(
            "DELETE FROM records WHERE owner = ?1 AND id = ?2 RETURNING {RECORD_COLUMNS}"
        ))?;
        let rows = stmt.query_map(params![owner, id], Self::record_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Delete every record between `owner` and `friend`, ignoring case.
    pub(crate) fn clear_records(&self, owner: i64, friend: &str) -> StorageResult<usize> {
        Ok(self.conn.execute(
            "DELETE FROM records WHERE owner = ?1 AND friend = ?2 COLLATE NOCASE",
            params![owner, friend],
        )?)
    }

    pub(crate) fn get_record_by_id(&self, owner: i64, id: i64) -> StorageResult<Option<Record>> {
        let result = self.conn.query_row(
            &format!("SELECT {RECORD_COLUMNS} FROM records WHERE owner = ?1 AND id = ?2"),
            params![owner, id],
            Self::record_from_row,
        );
        match result {
            Ok(r) => Ok(Some(r)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All records of `owner`, newest first.
    pub(crate) fn list_recent(&self, owner: i64) -> StorageResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM records WHERE owner = ?1 ORDER BY id DESC"
        ))?;
        let rows = stmt.query_map(params![owner], Self::record_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Records between `owner` and `friend` (case-insensitive), oldest first.
    pub(crate) fn list_records_for_friend(
        &self,
        owner: i64,
        friend: &str,
    ) -> StorageResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM records
             WHERE owner = ?1 AND friend = ?2 COLLATE NOCASE
             ORDER BY id ASC"
        ))?;
        let rows = stmt.query_map(params![owner, friend], Self::record_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Every friend `owner` has ever recorded, one entry per name regardless
    /// of ASCII case. A title-cased spelling ("Bob") wins over other spellings;
    /// otherwise the first spelling used is kept. Order is first use.
    pub(crate) fn list_friends(&self, owner: i64) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT friend FROM records WHERE owner = ?1 ORDER BY id ASC")?;
        let names = stmt
            .query_map(params![owner], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // ASCII folding, the same rule as COLLATE NOCASE in the lookups.
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut result: Vec<String> = Vec::new();
        for name in names {
            match seen.get(&name.to_ascii_lowercase()) {
                Some(&idx) => {
                    if !is_title_case(&result[idx]) && is_title_case(&name) {
                        result[idx] = name;
                    }
                }
                None => {
                    seen.insert(name.to_ascii_lowercase(), result.len());
                    result.push(name);
                }
            }
        }
        Ok(result)
    }

    // ── Preferences ───────────────────────────────────────────

    pub(crate) fn get_default_friend(&self, owner: i64) -> StorageResult<Option<Preference>> {
        let result = self.conn.query_row(
            "SELECT owner, default_friend FROM pref WHERE owner = ?1",
            params![owner],
            |row| Ok(Preference::new(row.get(0)?, row.get(1)?)),
        );
        match result {
            Ok(p) => Ok(Some(p)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn set_default_friend(&self, owner: i64, friend: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO pref (owner, default_friend) VALUES (?1, ?2)",
            params![owner, friend],
        )?;
        Ok(())
    }

    /// Returns whether a default was set.
    pub(crate) fn delete_default_friend(&self, owner: i64) -> StorageResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM pref WHERE owner = ?1", params![owner])?;
        Ok(removed > 0)
    }
}

/// "Bob" is title case; "bob" and "BOB" are not.
fn is_title_case(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(char::is_uppercase) && chars.all(|c| !c.is_uppercase())
}
