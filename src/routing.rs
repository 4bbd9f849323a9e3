//! Application router configuration.

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::post,
};

use crate::{
    AppState, Error, endpoints,
    transaction::{TransactionStore, ingest_transaction_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router<S>(state: AppState<S>) -> Router
where
    S: TransactionStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            endpoints::TRANSACTION_API,
            post(ingest_transaction_endpoint::<S>),
        )
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
