//! Defines the transaction store trait and its SQLite implementation.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::{
    Error,
    transaction::core::{NewTransaction, Transaction, TransactionId, map_transaction_row},
};

/// Handles the creation and retrieval of transactions.
pub trait TransactionStore {
    /// Create a new transaction in the store.
    ///
    /// The insert is atomic: either the whole transaction is stored or
    /// nothing is.
    ///
    /// # Errors
    /// Implementers must return [Error::DuplicateTransactionId] if a
    /// transaction with the same ID already exists, and must not overwrite
    /// the existing transaction.
    fn create(&self, transaction: NewTransaction) -> Result<Transaction, Error>;

    /// Retrieve a transaction from the store by its ID.
    fn get(&self, id: &TransactionId) -> Result<Transaction, Error>;

    /// Count the transactions in the store.
    fn count(&self) -> Result<u32, Error>;
}

/// Stores transactions in a SQLite database.
///
/// The transaction table must be set up with [crate::initialize_db] first.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Insert `transaction` and commit.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DuplicateTransactionId] if the ID is already in the database,
    /// - [Error::DatabaseLockError] if the connection lock is poisoned,
    /// - or [Error::SqlError] if there is some other SQL error, e.g. the ID is
    ///   longer than the column allows.
    fn create(&self, transaction: NewTransaction) -> Result<Transaction, Error> {
        let connection = self.lock()?;
        // Dropping the SQL transaction without committing rolls it back.
        let sql_transaction = connection.unchecked_transaction()?;

        let created = sql_transaction
            .prepare(
                "INSERT INTO \"transaction\" (transaction_id, amount, timestamp)
                 VALUES (?1, ?2, ?3)
                 RETURNING transaction_id, amount, timestamp",
            )?
            .query_row(
                (&transaction.id, transaction.amount, transaction.timestamp),
                map_transaction_row,
            )
            .map_err(|error| match error {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error {
                        code: _,
                        extended_code:
                            rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                            | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                    },
                    _,
                ) => Error::DuplicateTransactionId(transaction.id.clone()),
                error => error.into(),
            })?;

        sql_transaction.commit()?;

        Ok(created)
    }

    /// Retrieve a transaction in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a stored transaction,
    /// - or [Error::SqlError] there is some other SQL error.
    fn get(&self, id: &TransactionId) -> Result<Transaction, Error> {
        let transaction = self
            .lock()?
            .prepare(
                "SELECT transaction_id, amount, timestamp FROM \"transaction\"
                 WHERE transaction_id = :id",
            )?
            .query_row(&[(":id", id)], map_transaction_row)?;

        Ok(transaction)
    }

    fn count(&self) -> Result<u32, Error> {
        self.lock()?
            .query_row(
                "SELECT COUNT(transaction_id) FROM \"transaction\";",
                [],
                |row| row.get::<_, u32>(0),
            )
            .map_err(|error| error.into())
    }
}
