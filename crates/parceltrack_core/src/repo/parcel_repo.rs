//! Parcel repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the complete data-access surface over the `parcel` table.
//! - Enforce the registered-only mutation rule at the storage boundary.
//!
//! # Invariants
//! - `set_address` and `delete` express their status precondition inside the
//!   same SQL statement as the mutation, so no writer can interleave a
//!   status change between check and write.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::parcel::{ClientId, NewParcel, Parcel, ParcelNumber, STATUS_REGISTERED};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PARCEL_SELECT_SQL: &str = "SELECT
    number,
    client,
    status,
    address,
    created_at
FROM parcel";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for parcel persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap failure.
    Db(DbError),
    /// A read addressed a parcel number with no matching row.
    NotFound(ParcelNumber),
    /// A gated address change matched no row: the parcel does not exist or
    /// has already left the `registered` status. The two cases are
    /// indistinguishable because the gate and the mutation are one
    /// statement.
    AddressLocked(ParcelNumber),
    /// A gated delete matched no row; same conflation as [`Self::AddressLocked`].
    DeleteLocked(ParcelNumber),
    /// Persisted row cannot be converted to a valid read model.
    InvalidData(String),
    /// The connection's schema version is not the one this build migrates to.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// A table the repository depends on is absent.
    MissingRequiredTable(&'static str),
    /// A column the repository depends on is absent from its table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(number) => write!(f, "parcel not found: {number}"),
            Self::AddressLocked(number) => write!(
                f,
                "address of parcel {number} can change only while its status is `registered`"
            ),
            Self::DeleteLocked(number) => write!(
                f,
                "parcel {number} can be deleted only while its status is `registered`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted parcel data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "parcel repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "parcel repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "parcel repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::AddressLocked(_) => None,
            Self::DeleteLocked(_) => None,
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface over the parcel table.
///
/// Concurrent callers are safe to the extent the underlying store makes a
/// single statement atomic; the contract relies on no in-process locking.
pub trait ParcelRepository {
    /// Inserts one parcel; storage assigns and returns its number.
    ///
    /// Either the row exists with a valid number afterwards, or nothing was
    /// persisted.
    fn add(&self, parcel: &NewParcel) -> RepoResult<ParcelNumber>;

    /// Loads the full record for `number`.
    ///
    /// # Errors
    /// - [`RepoError::NotFound`] when no row matches, so callers can branch
    ///   on "does not exist" vs "store unavailable".
    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel>;

    /// Loads every parcel owned by `client`.
    ///
    /// Rows come back in storage-determined order; callers needing a
    /// specific order must sort themselves. An empty result is `Ok`.
    ///
    /// # Errors
    /// - The first row that fails to decode aborts the whole call; no
    ///   partial vector is ever returned. Cursor faults surfacing after the
    ///   last row propagate the same way.
    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>>;

    /// Overwrites the status of `number` unconditionally.
    ///
    /// Unlike the gated mutations, the affected-row count is deliberately
    /// not inspected: setting the status of a nonexistent parcel reports
    /// success. Callers that need existence should `get` first.
    fn set_status(&self, number: ParcelNumber, status: &str) -> RepoResult<()>;

    /// Changes the address of `number`, allowed only while the parcel is
    /// still `registered`.
    ///
    /// The status check rides in the UPDATE's own WHERE clause, making the
    /// gate race-free under concurrent status writers.
    ///
    /// # Errors
    /// - [`RepoError::AddressLocked`] when no row was updated (missing
    ///   parcel or non-`registered` status; not distinguished).
    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()>;

    /// Deletes `number`, allowed only while the parcel is still
    /// `registered`. Same single-statement gating as [`Self::set_address`].
    ///
    /// # Errors
    /// - [`RepoError::DeleteLocked`] when no row was removed.
    fn delete(&self, number: ParcelNumber) -> RepoResult<()>;
}

/// SQLite-backed parcel repository.
pub struct SqliteParcelRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParcelRepository<'conn> {
    /// Wraps a connection after verifying it carries the migrated schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_parcel_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ParcelRepository for SqliteParcelRepository<'_> {
    fn add(&self, parcel: &NewParcel) -> RepoResult<ParcelNumber> {
        self.conn.execute(
            "INSERT INTO parcel (client, status, address, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                parcel.client,
                parcel.status.as_str(),
                parcel.address.as_str(),
                parcel.created_at.as_str(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PARCEL_SELECT_SQL} WHERE number = ?1;"))?;

        let mut rows = stmt.query(params![number])?;
        match rows.next()? {
            Some(row) => parse_parcel_row(row),
            None => Err(RepoError::NotFound(number)),
        }
    }

    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PARCEL_SELECT_SQL} WHERE client = ?1;"))?;

        let mut rows = stmt.query(params![client])?;
        let mut parcels = Vec::new();

        // The trailing `rows.next()?` also surfaces cursor faults deferred
        // until after the final row.
        while let Some(row) = rows.next()? {
            parcels.push(parse_parcel_row(row)?);
        }

        Ok(parcels)
    }

    fn set_status(&self, number: ParcelNumber, status: &str) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE parcel SET status = ?1 WHERE number = ?2;",
            params![status, number],
        )?;

        Ok(())
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE parcel SET address = ?1 WHERE number = ?2 AND status = ?3;",
            params![address, number, STATUS_REGISTERED],
        )?;

        if changed == 0 {
            return Err(RepoError::AddressLocked(number));
        }

        Ok(())
    }

    fn delete(&self, number: ParcelNumber) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM parcel WHERE number = ?1 AND status = ?2;",
            params![number, STATUS_REGISTERED],
        )?;

        if changed == 0 {
            return Err(RepoError::DeleteLocked(number));
        }

        Ok(())
    }
}

fn parse_parcel_row(row: &Row<'_>) -> RepoResult<Parcel> {
    let number: i64 = row.get("number")?;
    if number <= 0 {
        // Storage never assigns such a number; only out-of-band writes can.
        return Err(RepoError::InvalidData(format!(
            "invalid number value `{number}` in parcel.number"
        )));
    }

    Ok(Parcel {
        number,
        client: row.get("client")?,
        status: row.get("status")?,
        address: row.get("address")?,
        created_at: row.get("created_at")?,
    })
}

fn ensure_parcel_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "parcel")? {
        return Err(RepoError::MissingRequiredTable("parcel"));
    }

    for column in ["number", "client", "status", "address", "created_at"] {
        if !table_has_column(conn, "parcel", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "parcel",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [table],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2;",
            params![table, column],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}
