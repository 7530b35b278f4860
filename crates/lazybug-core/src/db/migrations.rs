//! Database migrations

use crate::error::Result;
use rusqlite::{Connection, OptionalExtension};

/// Current schema version
const CURRENT_VERSION: i32 = 1;

/// Run all pending migrations
pub fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn)?;

    if version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

/// Get the current schema version
fn get_version(conn: &Connection) -> Result<i32> {
    // Check if schema_version table exists
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get::<_, i32>(0).map(|value| value != 0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get::<_, i32>(0),
        )
        .optional()?
        .unwrap_or(0);

    Ok(version)
}

/// Migration to version 1: feedback outbox table
fn migrate_v1(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;

    let statements = [
        // Schema version tracking
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        // Unsynced feedback; rows are deleted once the endpoint acknowledges them
        "CREATE TABLE IF NOT EXISTS feedbacks (
            id TEXT PRIMARY KEY,
            content TEXT NOT NULL,
            snapshot BLOB NOT NULL,
            created_at INTEGER NOT NULL,
            meta BLOB
        )",
        "CREATE INDEX IF NOT EXISTS idx_feedbacks_created ON feedbacks(created_at ASC)",
        "INSERT INTO schema_version (version) VALUES (1)",
    ];

    for stmt in statements {
        tx.execute(stmt, [])?;
    }
    tx.commit()?;

    tracing::info!("Migrated database to version {CURRENT_VERSION}");
    Ok(())
}
