//! A small web service for ingesting financial transactions.
//!
//! Clients submit a transaction (ID, amount and ISO-8601 timestamp) as JSON to
//! a single REST endpoint, and the service validates it and stores it in a
//! SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod db;
mod endpoints;
mod logging;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use endpoints::TRANSACTION_API;
pub use logging::{LOG_BODY_LENGTH_LIMIT, MAX_BODY_SIZE, logging_middleware};
pub use routing::build_router;
pub use transaction::{
    MissingIdPolicy, NewTransaction, SQLiteTransactionStore, Transaction, TransactionId,
    TransactionPayload, TransactionStore, parse_timestamp, submit_transaction,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The transaction ID, amount or timestamp was absent, null or an empty
    /// string.
    #[error("the transaction ID, amount or timestamp is missing")]
    MissingData,

    /// The timestamp could not be parsed as an ISO-8601 date-time.
    ///
    /// Holds the text the client sent.
    #[error("\"{0}\" is not an ISO-8601 date-time")]
    InvalidTimestamp(String),

    /// The request body was not a JSON object with the expected field types.
    #[error("invalid JSON payload: {0}")]
    MalformedPayload(String),

    /// The request body was larger than [MAX_BODY_SIZE] or could not be read.
    #[error("the request body could not be read within the size limit")]
    PayloadTooLarge,

    /// A transaction with the same ID has already been stored.
    ///
    /// Transaction IDs are assigned by the client, so this usually means the
    /// client submitted the same transaction twice.
    #[error("a transaction with the ID \"{0}\" already exists")]
    DuplicateTransactionId(TransactionId),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Could not acquire the lock on the random source used to generate IDs.
    #[error("could not acquire the ID generator lock")]
    IdGeneratorLockError,
}

/// Constraint violations on insert are classified by the store, which knows
/// the colliding ID; see [SQLiteTransactionStore](crate::SQLiteTransactionStore).
impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::MissingData => (StatusCode::BAD_REQUEST, "Missing data"),
            Error::InvalidTimestamp(_) => (StatusCode::BAD_REQUEST, "Invalid timestamp format"),
            Error::MalformedPayload(_) => (StatusCode::BAD_REQUEST, "Invalid JSON payload"),
            Error::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large"),
            Error::NotFound => (StatusCode::NOT_FOUND, "Not found"),
            // Storage errors are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::{Value, json};

    use crate::{Error, TransactionId};

    async fn status_and_body(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("could not read response body");

        (
            status,
            serde_json::from_slice(&bytes).expect("response body is not JSON"),
        )
    }

    #[tokio::test]
    async fn validation_errors_are_client_errors() {
        assert_eq!(
            status_and_body(Error::MissingData).await,
            (StatusCode::BAD_REQUEST, json!({ "error": "Missing data" }))
        );
        assert_eq!(
            status_and_body(Error::InvalidTimestamp("banana".to_owned())).await,
            (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid timestamp format" })
            )
        );
    }

    #[tokio::test]
    async fn storage_errors_do_not_leak_details() {
        let (status, body) = status_and_body(Error::DuplicateTransactionId(
            TransactionId::new_unchecked("tx-1"),
        ))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }
}
