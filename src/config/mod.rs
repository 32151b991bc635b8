//! Configuration module for Crawl Keeper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use crawl_keeper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("keeper.toml")).unwrap();
//! println!("Database: {}", config.storage.database_path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CheckpointConfig, Config, QuotaConfig, StorageConfig};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
