//! Parcel repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Map `Parcel` values to rows of the `parcel` table and back.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every operation issues exactly one statement; no multi-statement transactions.
//! - The `registered` gate for address changes and deletion lives in the
//!   statement's `WHERE` clause, never in a read-then-write sequence.
//! - A single-row read that matches nothing is `RepoError::NotFound`, never a
//!   zero-valued parcel.

use crate::db::DbError;
use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus, ParcelValidationError};
use log::{debug, error};
use rusqlite::{named_params, Connection, OptionalExtension, Row};
use thiserror::Error;

const PARCEL_TABLE: &str = "parcel";
const PARCEL_COLUMNS: [&str; 5] = ["number", "client", "status", "address", "created_at"];

const PARCEL_SELECT_SQL: &str = "SELECT
    number,
    client,
    status,
    address,
    created_at
FROM parcel";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for parcel persistence and query operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    Validation(#[from] ParcelValidationError),
    /// Store-level failure; the underlying `rusqlite::Error` is kept as source.
    #[error("{0}")]
    Db(#[from] DbError),
    #[error("parcel not found: {0}")]
    NotFound(ParcelNumber),
    #[error("connection is missing required table `{0}`")]
    MissingRequiredTable(&'static str),
    #[error("table `{table}` is missing required column `{column}`")]
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Repository interface for parcel CRUD operations.
///
/// Mutations return whether a row was affected. `false` is still a success:
/// the row was absent or, for `set_address`/`delete`, no longer `registered`.
pub trait ParcelRepository {
    /// Inserts a parcel and returns the store-assigned number. `parcel.number` is ignored.
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber>;
    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel>;
    /// All parcels of one client, ascending by number. Empty when none match.
    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>>;
    /// Overwrites the status regardless of the current one.
    fn set_status(&self, number: ParcelNumber, status: &ParcelStatus) -> RepoResult<bool>;
    /// Overwrites the address only while the parcel is `registered`.
    /// A blank address is rejected before touching the store.
    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<bool>;
    /// Deletes the parcel only while it is `registered`.
    fn delete(&self, number: ParcelNumber) -> RepoResult<bool>;
}

/// SQLite-backed parcel repository.
pub struct SqliteParcelRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParcelRepository<'conn> {
    /// Wraps a connection without checking its schema.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Wraps a connection after verifying the `parcel` table and its columns.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_parcel_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ParcelRepository for SqliteParcelRepository<'_> {
    fn add(&self, parcel: &Parcel) -> RepoResult<ParcelNumber> {
        parcel.validate()?;

        self.conn
            .execute(
                "INSERT INTO parcel (client, status, address, created_at)
                 VALUES (:client, :status, :address, :created_at);",
                named_params! {
                    ":client": parcel.client,
                    ":status": parcel.status.as_str(),
                    ":address": parcel.address.as_str(),
                    ":created_at": parcel.created_at.as_str(),
                },
            )
            .map_err(|err| log_failure("parcel_add", err))?;

        let number = ParcelNumber(self.conn.last_insert_rowid());
        debug!(
            "event=parcel_add module=repo status=ok number={} client={}",
            number, parcel.client
        );
        Ok(number)
    }

    fn get(&self, number: ParcelNumber) -> RepoResult<Parcel> {
        let parcel = self
            .conn
            .query_row(
                &format!("{PARCEL_SELECT_SQL} WHERE number = :number;"),
                named_params! { ":number": number.get() },
                parse_parcel_row,
            )
            .optional()
            .map_err(|err| log_failure("parcel_get", err))?;

        parcel.ok_or(RepoError::NotFound(number))
    }

    fn get_by_client(&self, client: ClientId) -> RepoResult<Vec<Parcel>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "{PARCEL_SELECT_SQL} WHERE client = :client ORDER BY number ASC;"
            ))
            .map_err(|err| log_failure("parcel_get_by_client", err))?;

        let rows = stmt
            .query_map(named_params! { ":client": client }, parse_parcel_row)
            .map_err(|err| log_failure("parcel_get_by_client", err))?;
        let parcels = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|err| log_failure("parcel_get_by_client", err))?;

        Ok(parcels)
    }

    fn set_status(&self, number: ParcelNumber, status: &ParcelStatus) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute(
                "UPDATE parcel SET status = :status WHERE number = :number;",
                named_params! {
                    ":status": status.as_str(),
                    ":number": number.get(),
                },
            )
            .map_err(|err| log_failure("parcel_set_status", err))?;

        debug!(
            "event=parcel_set_status module=repo status=ok number={} affected={}",
            number, changed
        );
        Ok(changed > 0)
    }

    fn set_address(&self, number: ParcelNumber, address: &str) -> RepoResult<bool> {
        if address.trim().is_empty() {
            return Err(ParcelValidationError::EmptyAddress.into());
        }

        let changed = self
            .conn
            .execute(
                "UPDATE parcel SET address = :address
                 WHERE number = :number AND status = :registered;",
                named_params! {
                    ":address": address,
                    ":number": number.get(),
                    ":registered": ParcelStatus::Registered.as_str(),
                },
            )
            .map_err(|err| log_failure("parcel_set_address", err))?;

        debug!(
            "event=parcel_set_address module=repo status=ok number={} affected={}",
            number, changed
        );
        Ok(changed > 0)
    }

    fn delete(&self, number: ParcelNumber) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute(
                "DELETE FROM parcel WHERE number = :number AND status = :registered;",
                named_params! {
                    ":number": number.get(),
                    ":registered": ParcelStatus::Registered.as_str(),
                },
            )
            .map_err(|err| log_failure("parcel_delete", err))?;

        debug!(
            "event=parcel_delete module=repo status=ok number={} affected={}",
            number, changed
        );
        Ok(changed > 0)
    }
}

fn parse_parcel_row(row: &Row<'_>) -> rusqlite::Result<Parcel> {
    Ok(Parcel {
        number: ParcelNumber(row.get("number")?),
        client: row.get("client")?,
        status: ParcelStatus::from(row.get::<_, String>("status")?),
        address: row.get("address")?,
        created_at: row.get("created_at")?,
    })
}

fn log_failure(event: &str, err: rusqlite::Error) -> RepoError {
    error!("event={event} module=repo status=error error={err}");
    err.into()
}

fn ensure_parcel_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, PARCEL_TABLE)? {
        return Err(RepoError::MissingRequiredTable(PARCEL_TABLE));
    }

    for column in PARCEL_COLUMNS {
        if !table_has_column(conn, PARCEL_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: PARCEL_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
