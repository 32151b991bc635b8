//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the storage traits.

use crate::config::QuotaConfig;
use crate::state::{CrawlState, TargetId};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Record, RecordRepository, Storage, StorageError, StorageResult};
use crate::CrawlError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(CrawlError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, CrawlError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, CrawlError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn load_call_history(&self, target: TargetId) -> StorageResult<Vec<DateTime<Utc>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT called_at FROM call_history WHERE target_id = ?1 ORDER BY id ASC")?;

        let millis = stmt
            .query_map(params![target.to_db_value()], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        millis
            .into_iter()
            .map(|ms| {
                DateTime::from_timestamp_millis(ms).ok_or_else(|| {
                    StorageError::Corrupt(format!(
                        "target {} has out-of-range call timestamp {}",
                        target, ms
                    ))
                })
            })
            .collect()
    }
}

impl Storage for SqliteStorage {
    fn load_crawl_state(
        &self,
        target: TargetId,
        quota: &QuotaConfig,
    ) -> StorageResult<Option<CrawlState>> {
        let row = self
            .conn
            .query_row(
                "SELECT subset, cursor, total_calls FROM crawl_states WHERE target_id = ?1",
                params![target.to_db_value()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((subset, cursor, total_calls)) = row else {
            return Ok(None);
        };

        let subset = u32::try_from(subset).map_err(|_| {
            StorageError::Corrupt(format!("target {} has subset {}", target, subset))
        })?;
        let total_calls = u64::try_from(total_calls).map_err(|_| {
            StorageError::Corrupt(format!("target {} has total_calls {}", target, total_calls))
        })?;
        let calls = self.load_call_history(target)?;

        let state = CrawlState::restore(target, subset, cursor, calls, total_calls, quota)
            .map_err(|e| match e {
                CrawlError::CorruptState(message) => StorageError::Corrupt(message),
                other => StorageError::Corrupt(other.to_string()),
            })?;

        Ok(Some(state))
    }

    fn save_crawl_state(&mut self, state: &CrawlState) -> StorageResult<()> {
        let target = state.target().to_db_value();
        let now = Utc::now().to_rfc3339();
        let total_calls = i64::try_from(state.total_calls()).unwrap_or(i64::MAX);

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO crawl_states (target_id, subset, cursor, total_calls, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(target_id) DO UPDATE SET
                subset = excluded.subset,
                cursor = excluded.cursor,
                total_calls = excluded.total_calls,
                updated_at = excluded.updated_at",
            params![target, state.subset(), state.cursor(), total_calls, now],
        )?;

        // History is rewritten as a whole; it only holds in-window calls
        tx.execute(
            "DELETE FROM call_history WHERE target_id = ?1",
            params![target],
        )?;
        {
            let mut insert = tx
                .prepare("INSERT INTO call_history (target_id, called_at) VALUES (?1, ?2)")?;
            for call in state.call_history() {
                insert.execute(params![target, call.timestamp_millis()])?;
            }
        }
        tx.commit()?;

        tracing::debug!(
            "Saved crawl state for target {} (subset {}, cursor {})",
            state.target(),
            state.subset(),
            state.cursor()
        );
        Ok(())
    }

    fn delete_crawl_state(&mut self, target: TargetId) -> StorageResult<bool> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM call_history WHERE target_id = ?1",
            params![target.to_db_value()],
        )?;
        let deleted = tx.execute(
            "DELETE FROM crawl_states WHERE target_id = ?1",
            params![target.to_db_value()],
        )?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    fn list_targets(&self) -> StorageResult<Vec<TargetId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT target_id FROM crawl_states ORDER BY target_id ASC")?;

        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        ids.into_iter()
            .map(|id| {
                TargetId::new(id)
                    .map_err(|_| StorageError::Corrupt(format!("stored target id {}", id)))
            })
            .collect()
    }
}

impl<R: Record> RecordRepository<R> for SqliteStorage {
    fn store_records(&mut self, records: &[R]) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut insert =
                tx.prepare("INSERT INTO records (kind, payload, stored_at) VALUES (?1, ?2, ?3)")?;
            for record in records {
                let payload = serde_json::to_string(record)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                insert.execute(params![R::KIND, payload, now])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    fn load_records(&self, limit: usize) -> StorageResult<Vec<R>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self
            .conn
            .prepare("SELECT payload FROM records WHERE kind = ?1 ORDER BY id ASC LIMIT ?2")?;

        let payloads = stmt
            .query_map(params![R::KIND, limit], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        payloads
            .iter()
            .map(|payload| {
                serde_json::from_str(payload)
                    .map_err(|e| StorageError::Serialization(e.to_string()))
            })
            .collect()
    }

    fn count_records(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE kind = ?1",
            params![R::KIND],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
