//! Schema migration registry and runner.
//!
//! # Responsibility
//! - List every schema change this build knows, in the order it shipped.
//! - Bring an older database up to the current version in one transaction.
//!
//! # Invariants
//! - Registry versions are strictly increasing.
//! - After a successful run, `PRAGMA user_version` equals [`latest_version`].

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_parcel.sql"),
}];

/// Highest schema version this build can produce.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Runs every migration the database has not seen yet.
///
/// A database stamped with a version above [`latest_version`] was written by
/// a newer build; it is refused with [`DbError::UnsupportedSchemaVersion`]
/// rather than read with stale assumptions.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let stored = stored_version(conn)?;
    let target = latest_version();

    if stored > target {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: stored,
            latest_supported: target,
        });
    }
    if stored == target {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for pending in MIGRATIONS.iter().filter(|m| m.version > stored) {
        tx.execute_batch(pending.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", pending.version))?;
    }
    tx.commit()?;

    Ok(())
}

fn stored_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}
