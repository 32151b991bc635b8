//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Crawl Keeper database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per crawl target
CREATE TABLE IF NOT EXISTS crawl_states (
    target_id INTEGER PRIMARY KEY CHECK (target_id > 0),
    subset INTEGER NOT NULL CHECK (subset >= 1),
    cursor INTEGER NOT NULL,
    total_calls INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL
);

-- Call timestamps still inside the quota window (epoch milliseconds)
CREATE TABLE IF NOT EXISTS call_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    target_id INTEGER NOT NULL REFERENCES crawl_states(target_id) ON DELETE CASCADE,
    called_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_call_history_target ON call_history(target_id);

-- Serialized entities collected during crawls
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    kind TEXT NOT NULL,
    payload TEXT NOT NULL,
    stored_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_records_kind ON records(kind);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
