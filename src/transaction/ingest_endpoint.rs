//! Defines the endpoint for ingesting a transaction.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    AppState, Error,
    transaction::{TransactionPayload, TransactionStore, submit_transaction},
};

/// A route handler for ingesting a new transaction.
///
/// Responds with 201 once the transaction is stored, 400 if the body is not
/// valid JSON or fails validation, and 500 if the store rejects the insert
/// (including duplicate IDs).
pub async fn ingest_transaction_endpoint<S>(
    State(state): State<AppState<S>>,
    payload: Result<Json<TransactionPayload>, JsonRejection>,
) -> Response
where
    S: TransactionStore + Clone + Send + Sync + 'static,
{
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            tracing::warn!("rejected transaction payload: {}", rejection.body_text());
            return Error::MalformedPayload(rejection.body_text()).into_response();
        }
    };

    match submit_transaction(
        payload,
        state.id_policy,
        &*state.id_rng,
        &state.transaction_store,
    ) {
        Ok(transaction) => {
            tracing::info!(
                "stored transaction {} ({} at {})",
                transaction.id,
                transaction.amount,
                transaction.timestamp
            );

            (
                StatusCode::CREATED,
                Json(json!({ "message": "Transaction added" })),
            )
                .into_response()
        }
        Err(error @ (Error::MissingData | Error::InvalidTimestamp(_))) => {
            tracing::warn!("rejected transaction: {error}");
            error.into_response()
        }
        Err(error) => {
            tracing::error!("could not store transaction: {error}");
            error.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rand::{SeedableRng, rngs::StdRng};
    use serde_json::json;
    use time::macros::datetime;

    use crate::{
        AppState, MissingIdPolicy, TRANSACTION_API, TransactionId, TransactionStore,
        test_utils::{FailingStore, get_test_server, get_test_state},
    };

    #[tokio::test]
    async fn valid_transaction_is_created() {
        let state = get_test_state(MissingIdPolicy::Reject);
        let server = get_test_server(state.clone());

        let response = server
            .post(TRANSACTION_API)
            .json(&json!({
                "transactionId": "tx-1",
                "amount": 42.5,
                "timestamp": "2024-01-15T10:30:00",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        response.assert_json(&json!({ "message": "Transaction added" }));

        let stored = state
            .transaction_store
            .get(&TransactionId::new_unchecked("tx-1"))
            .expect("transaction was not stored");
        assert_eq!(stored.amount, 42.5);
        assert_eq!(stored.timestamp, datetime!(2024-01-15 10:30:00));
    }

    #[tokio::test]
    async fn missing_timestamp_is_rejected() {
        let state = get_test_state(MissingIdPolicy::Reject);
        let server = get_test_server(state.clone());

        let response = server
            .post(TRANSACTION_API)
            .json(&json!({ "transactionId": "tx-2", "amount": 10.0 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Missing data" }));
        assert_eq!(state.transaction_store.count(), Ok(0));
    }

    #[tokio::test]
    async fn null_fields_are_missing_data() {
        let state = get_test_state(MissingIdPolicy::Reject);
        let server = get_test_server(state.clone());

        let response = server
            .post(TRANSACTION_API)
            .json(&json!({
                "transactionId": "tx-2",
                "amount": null,
                "timestamp": "2024-01-15T10:30:00",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Missing data" }));
        assert_eq!(state.transaction_store.count(), Ok(0));
    }

    #[tokio::test]
    async fn invalid_timestamp_is_rejected() {
        let state = get_test_state(MissingIdPolicy::Reject);
        let server = get_test_server(state.clone());

        let response = server
            .post(TRANSACTION_API)
            .json(&json!({
                "transactionId": "tx-3",
                "amount": 10.0,
                "timestamp": "banana",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Invalid timestamp format" }));
        assert_eq!(state.transaction_store.count(), Ok(0));
    }

    #[tokio::test]
    async fn out_of_range_timestamp_does_not_block_later_requests() {
        let state = get_test_state(MissingIdPolicy::Reject);
        let server = get_test_server(state.clone());

        let response = server
            .post(TRANSACTION_API)
            .json(&json!({
                "transactionId": "tx-late",
                "amount": 10.0,
                "timestamp": "9999-12-31T23:00:00-05:00",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Invalid timestamp format" }));

        let response = server
            .post(TRANSACTION_API)
            .json(&json!({
                "transactionId": "tx-1",
                "amount": 42.5,
                "timestamp": "2024-01-15T10:30:00",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(state.transaction_store.count(), Ok(1));
    }

    #[tokio::test]
    async fn duplicate_id_is_server_error_and_keeps_first() {
        let state = get_test_state(MissingIdPolicy::Reject);
        let server = get_test_server(state.clone());

        server
            .post(TRANSACTION_API)
            .json(&json!({
                "transactionId": "tx-1",
                "amount": 42.5,
                "timestamp": "2024-01-15T10:30:00",
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post(TRANSACTION_API)
            .json(&json!({
                "transactionId": "tx-1",
                "amount": 1.0,
                "timestamp": "2024-02-01T00:00:00",
            }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({ "error": "Internal server error" }));
        assert_eq!(state.transaction_store.count(), Ok(1));
        let stored = state
            .transaction_store
            .get(&TransactionId::new_unchecked("tx-1"))
            .unwrap();
        assert_eq!(stored.amount, 42.5);
    }

    #[tokio::test]
    async fn non_json_body_is_rejected() {
        let state = get_test_state(MissingIdPolicy::Reject);
        let server = get_test_server(state.clone());

        let response = server.post(TRANSACTION_API).text("tx-1,42.5").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Invalid JSON payload" }));
        assert_eq!(state.transaction_store.count(), Ok(0));
    }

    #[tokio::test]
    async fn wrongly_typed_field_is_rejected() {
        let state = get_test_state(MissingIdPolicy::Reject);
        let server = get_test_server(state.clone());

        let response = server
            .post(TRANSACTION_API)
            .json(&json!({
                "transactionId": "tx-1",
                "amount": "a lot",
                "timestamp": "2024-01-15T10:30:00",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Invalid JSON payload" }));
    }

    #[tokio::test]
    async fn missing_id_is_generated_when_enabled() {
        let state = get_test_state(MissingIdPolicy::Generate);
        let server = get_test_server(state.clone());
        // get_test_state seeds the ID generator with 42.
        let expected_id = TransactionId::generate(&mut StdRng::seed_from_u64(42));

        let response = server
            .post(TRANSACTION_API)
            .json(&json!({ "amount": 10.0, "timestamp": "2024-01-15T10:30:00" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert!(state.transaction_store.get(&expected_id).is_ok());
    }

    #[tokio::test]
    async fn store_failure_is_server_error() {
        let store = FailingStore::default();
        let server = get_test_server(AppState::new(store.clone(), MissingIdPolicy::Reject));

        let response = server
            .post(TRANSACTION_API)
            .json(&json!({
                "transactionId": "tx-1",
                "amount": 42.5,
                "timestamp": "2024-01-15T10:30:00",
            }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({ "error": "Internal server error" }));
        assert_eq!(store.create_calls(), 1);
    }

    #[tokio::test]
    async fn validation_failure_never_reaches_store() {
        let store = FailingStore::default();
        let server = get_test_server(AppState::new(store.clone(), MissingIdPolicy::Reject));

        server
            .post(TRANSACTION_API)
            .json(&json!({ "transactionId": "tx-2", "amount": 10.0 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        assert_eq!(store.create_calls(), 0);
    }
}
