//! Transaction ingestion.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and its database table
//! - The `TransactionStore` trait and its SQLite implementation
//! - Payload validation, including ISO-8601 timestamp parsing
//! - The route handler that ingests a transaction

mod core;
mod ingest;
mod ingest_endpoint;
mod store;
mod timestamp;

pub use core::{NewTransaction, Transaction, TransactionId, create_transaction_table};
pub use ingest::{MissingIdPolicy, TransactionPayload, submit_transaction};
pub use ingest_endpoint::ingest_transaction_endpoint;
pub use store::{SQLiteTransactionStore, TransactionStore};
pub use timestamp::parse_timestamp;
