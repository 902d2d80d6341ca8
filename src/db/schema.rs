use anyhow::{Context, Result};
use rusqlite::Connection;

// Names carry no UNIQUE constraint; the services check uniqueness and
// lookups report duplicates as ambiguous.
const SCHEMA: &str = include_str!("schema.sql");

/// Create the store tables if they are missing. Safe to run on every start.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Failed to create store schema")?;

    tracing::debug!("Store schema ready");
    Ok(())
}
