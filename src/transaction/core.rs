//! Defines the core data model and database table for transactions.

use std::fmt::Display;

use rand::RngCore;
use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use time::PrimitiveDateTime;
use uuid::Builder;

// ============================================================================
// MODELS
// ============================================================================

/// The maximum number of characters the database accepts for a transaction ID.
pub const TRANSACTION_ID_MAX_LENGTH: usize = 50;

/// The unique identifier of a transaction.
///
/// IDs are normally chosen by the client. The server only creates one with
/// [TransactionId::generate] when configured to fill in missing IDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionId(String);

impl TransactionId {
    /// Wrap `id` as a transaction ID without validating it.
    ///
    /// The caller should ensure `id` is not empty.
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a random UUID v4 transaction ID from `rng`.
    ///
    /// The same seeded `rng` always produces the same sequence of IDs.
    pub fn generate<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);

        Self(Builder::from_random_bytes(bytes).into_uuid().to_string())
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ToSql for TransactionId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for TransactionId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(Self)
    }
}

/// A financial event that has been stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The unique ID of the transaction.
    pub id: TransactionId,
    /// The amount of money that moved in this transaction.
    pub amount: f64,
    /// When the transaction happened, in UTC.
    pub timestamp: PrimitiveDateTime,
}

/// A validated transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The unique ID of the transaction.
    pub id: TransactionId,
    /// The amount of money that moved in this transaction.
    pub amount: f64,
    /// When the transaction happened, in UTC.
    pub timestamp: PrimitiveDateTime,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                transaction_id TEXT PRIMARY KEY NOT NULL
                    CHECK (length(transaction_id) BETWEEN 1 AND {TRANSACTION_ID_MAX_LENGTH}),
                amount REAL NOT NULL,
                timestamp TEXT NOT NULL
            )"
        ),
        (),
    )?;

    Ok(())
}

/// Map a row selected as `transaction_id, amount, timestamp` to a [Transaction].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        amount: row.get(1)?,
        timestamp: row.get(2)?,
    })
}
