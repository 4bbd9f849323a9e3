use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use rusqlite::Connection;

use crate::{
    Error, NewTransaction, SQLiteTransactionStore, Transaction, TransactionId, TransactionStore,
    initialize_db,
};

pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize_db(&connection).expect("Could not initialize database");
    connection
}

pub(crate) fn get_test_store() -> SQLiteTransactionStore {
    SQLiteTransactionStore::new(Arc::new(Mutex::new(get_test_connection())))
}

/// A store whose inserts always fail, counting how often it was asked to insert.
#[derive(Debug, Clone, Default)]
pub(crate) struct FailingStore {
    create_calls: Arc<AtomicUsize>,
}

impl FailingStore {
    pub(crate) fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

impl TransactionStore for FailingStore {
    fn create(&self, _transaction: NewTransaction) -> Result<Transaction, Error> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::DatabaseLockError)
    }

    fn get(&self, _id: &TransactionId) -> Result<Transaction, Error> {
        Err(Error::NotFound)
    }

    fn count(&self) -> Result<u32, Error> {
        Ok(0)
    }
}
