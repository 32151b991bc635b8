//! Storage module for persisting crawl progress
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Crawl state persistence keyed by target id
//! - Call history persistence for quota accounting across restarts
//! - A typed repository for entities collected during crawls

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Record, RecordRepository, Storage, StorageError, StorageResult};

use crate::config::QuotaConfig;
use crate::state::{CrawlState, TargetId};
use crate::CrawlError;

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(CrawlError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, CrawlError> {
    SqliteStorage::new(path)
}

/// Restores the state of `target`, or creates and saves a fresh one
///
/// This is the start-of-run entry point: there is exactly one state per
/// target, so an existing row always wins over a fresh state.
pub fn load_or_create_state<S>(
    storage: &mut S,
    target: TargetId,
    quota: &QuotaConfig,
) -> Result<CrawlState, CrawlError>
where
    S: Storage + ?Sized,
{
    if let Some(state) = storage.load_crawl_state(target, quota)? {
        tracing::info!(
            "Restored crawl state for target {} (subset {}, cursor {})",
            target,
            state.subset(),
            state.cursor()
        );
        return Ok(state);
    }

    let state = CrawlState::create(target, quota);
    storage.save_crawl_state(&state)?;
    Ok(state)
}
