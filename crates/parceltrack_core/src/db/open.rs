//! SQLite connection bootstrap.
//!
//! # Responsibility
//! - Open file-backed or in-memory connections through one code path.
//! - Apply pragmas and migrations before anyone else touches the handle.
//!
//! # Invariants
//! - Every returned connection has `foreign_keys=ON` and a busy timeout.
//! - Every returned connection is migrated to [`latest_version`].
//!
//! [`latest_version`]: super::migrations::latest_version

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (creating if needed) a database file and brings it up to date.
///
/// Emits `db_open` log events carrying outcome and elapsed time.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_with("file", || Connection::open(path))
}

/// Opens a fresh in-memory database, migrated and ready.
///
/// Mostly a test vehicle; every call yields an independent empty store.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            let elapsed_ms = started_at.elapsed().as_millis();
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={elapsed_ms} error_code=open_failed error={err}"
            );
            return Err(err.into());
        }
    };

    match configure_connection(&mut conn) {
        Ok(()) => {
            let elapsed_ms = started_at.elapsed().as_millis();
            info!("event=db_open module=db status=ok mode={mode} duration_ms={elapsed_ms}");
            Ok(conn)
        }
        Err(err) => {
            let elapsed_ms = started_at.elapsed().as_millis();
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={elapsed_ms} error_code=migrate_failed error={err}"
            );
            Err(err)
        }
    }
}

fn configure_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    Ok(())
}
