//! `parcel` table bootstrap.
//!
//! # Invariants
//! - `SCHEMA_VERSION` is mirrored to `PRAGMA user_version` once the table exists.
//! - A database stamped with a newer version is never touched.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

pub const SCHEMA_VERSION: u32 = 1;

const PARCEL_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS parcel (
    number INTEGER PRIMARY KEY AUTOINCREMENT,
    client INTEGER NOT NULL,
    status TEXT NOT NULL,
    address TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS parcel_client_idx ON parcel (client);";

/// Creates the `parcel` table when the database has not been initialized yet.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;

    if current_version > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: SCHEMA_VERSION,
        });
    }

    if current_version == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(PARCEL_TABLE_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;

    Ok(())
}

pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
