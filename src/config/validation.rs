use crate::config::types::{CheckpointConfig, Config, QuotaConfig, StorageConfig};
use crate::ConfigError;

/// Upper bound on `max-calls`
pub const MAX_CALLS_LIMIT: u32 = 100_000;

/// Upper bound on `window-secs` (one year)
pub const MAX_WINDOW_SECS: u64 = 365 * 24 * 60 * 60;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_quota_config(&config.quota)?;
    validate_storage_config(&config.storage)?;
    validate_checkpoint_config(&config.checkpoint)?;
    Ok(())
}

/// Validates quota configuration
fn validate_quota_config(config: &QuotaConfig) -> Result<(), ConfigError> {
    if config.max_calls < 1 || config.max_calls > MAX_CALLS_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_calls must be between 1 and {}, got {}",
            MAX_CALLS_LIMIT, config.max_calls
        )));
    }

    // window arithmetic on timestamps must stay inside chrono's range
    if config.window_secs < 1 || config.window_secs > MAX_WINDOW_SECS {
        return Err(ConfigError::Validation(format!(
            "window_secs must be between 1 and {}, got {}",
            MAX_WINDOW_SECS, config.window_secs
        )));
    }

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_checkpoint_config(config: &CheckpointConfig) -> Result<(), ConfigError> {
    if config.interval_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "interval_secs must be >= 1, got {}",
            config.interval_secs
        )));
    }

    Ok(())
}
