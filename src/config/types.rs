use serde::Deserialize;

/// Main configuration structure for Crawl Keeper
///
/// Every section is optional; missing sections take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub checkpoint: CheckpointConfig,
}

/// Call quota of the remote service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuotaConfig {
    /// Maximum number of calls inside one window
    #[serde(rename = "max-calls", default = "default_max_calls")]
    pub max_calls: u32,

    /// Length of the rolling window (seconds)
    #[serde(rename = "window-secs", default = "default_window_secs")]
    pub window_secs: u64,
}

impl QuotaConfig {
    /// Window length as a chrono duration
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.window_secs as i64)
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_calls: default_max_calls(),
            window_secs: default_window_secs(),
        }
    }
}

/// Persistence configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Periodic checkpoint configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckpointConfig {
    /// Time between two checkpoints (seconds)
    #[serde(rename = "interval-secs", default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl CheckpointConfig {
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_secs)
    }
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_max_calls() -> u32 {
    15
}

fn default_window_secs() -> u64 {
    15 * 60
}

fn default_database_path() -> String {
    "./crawl.db".to_string()
}

fn default_interval_secs() -> u64 {
    60
}
