//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rand::{SeedableRng, rngs::StdRng};
use rusqlite::Connection;

use crate::{
    Error,
    db::initialize,
    transaction::{MissingIdPolicy, SQLiteTransactionStore, TransactionStore},
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState<S>
where
    S: TransactionStore,
{
    /// The store that ingested [transactions](crate::Transaction) are written to.
    pub transaction_store: S,
    /// Whether to reject payloads without a transaction ID or generate one.
    pub id_policy: MissingIdPolicy,
    /// The random source for generated transaction IDs.
    pub id_rng: Arc<Mutex<StdRng>>,
}

impl<S> AppState<S>
where
    S: TransactionStore,
{
    /// Create a new [AppState] that generates IDs from an OS-seeded random source.
    pub fn new(transaction_store: S, id_policy: MissingIdPolicy) -> Self {
        Self::with_rng(transaction_store, id_policy, StdRng::from_entropy())
    }

    /// Create a new [AppState] that generates IDs from `rng`.
    ///
    /// Pass a seeded `rng` to make generated IDs reproducible.
    pub fn with_rng(transaction_store: S, id_policy: MissingIdPolicy, rng: StdRng) -> Self {
        Self {
            transaction_store,
            id_policy,
            id_rng: Arc::new(Mutex::new(rng)),
        }
    }
}

impl AppState<SQLiteTransactionStore> {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn from_connection(
        db_connection: Connection,
        id_policy: MissingIdPolicy,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self::new(SQLiteTransactionStore::new(connection), id_policy))
    }
}
