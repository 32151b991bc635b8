//! Storage traits and error types
//!
//! This module defines the trait interfaces for storage backends and
//! associated error types.

use crate::config::QuotaConfig;
use crate::state::{CrawlState, TargetId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Corrupt crawl state: {0}")]
    Corrupt(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for crawl state persistence backends
///
/// Errors are surfaced to the caller as-is; implementations do not retry.
pub trait Storage {
    /// Loads the state stored for a target
    ///
    /// # Arguments
    ///
    /// * `target` - The target whose state to load
    /// * `quota` - Quota applied to the restored call history
    ///
    /// # Returns
    ///
    /// `None` if nothing is stored for this target
    fn load_crawl_state(
        &self,
        target: TargetId,
        quota: &QuotaConfig,
    ) -> StorageResult<Option<CrawlState>>;

    /// Saves a state, replacing whatever was stored for its target
    fn save_crawl_state(&mut self, state: &CrawlState) -> StorageResult<()>;

    /// Removes the state of an abandoned target
    ///
    /// Returns true if a state was stored.
    fn delete_crawl_state(&mut self, target: TargetId) -> StorageResult<bool>;

    /// Lists every target with a stored state, ascending
    fn list_targets(&self) -> StorageResult<Vec<TargetId>>;
}

/// An entity type that can be kept in a [`RecordRepository`]
pub trait Record: Serialize + DeserializeOwned {
    /// Stable name distinguishing this entity type in storage
    const KIND: &'static str;
}

/// Typed repository of collected entities
pub trait RecordRepository<R: Record> {
    /// Appends records, returning how many were stored
    fn store_records(&mut self, records: &[R]) -> StorageResult<usize>;

    /// Loads records in insertion order, capped at `limit`
    fn load_records(&self, limit: usize) -> StorageResult<Vec<R>>;

    /// Counts stored records of this type
    fn count_records(&self) -> StorageResult<u64>;
}
