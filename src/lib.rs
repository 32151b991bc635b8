//! Crawl Keeper: progress and quota bookkeeping for rate-limited crawls
//!
//! This crate tracks a long-running collection task against a remote service
//! with a strict call quota: rolling-window call accounting, a durable
//! pagination cursor that survives restarts, and similarity heuristics used to
//! match the entities collected along the way.

pub mod checkpoint;
pub mod config;
pub mod input;
pub mod similarity;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Crawl Keeper operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid target identifier: '{0}'")]
    InvalidTarget(String),

    #[error("Corrupt crawl state: {0}")]
    CorruptState(String),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input closed before a valid target identifier was read")]
    InputClosed,

    #[error("Crawl state lock poisoned")]
    LockPoisoned,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Crawl Keeper operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use checkpoint::{Checkpointer, SharedCrawlState};
pub use config::Config;
pub use state::{CallWindowTracker, CrawlCursor, CrawlState, TargetId};
