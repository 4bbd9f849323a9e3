use axum_test::TestServer;
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    AppState, MissingIdPolicy, SQLiteTransactionStore, TransactionStore, build_router,
    test_utils::get_test_store,
};

/// App state backed by an in-memory database whose ID generator is seeded with 42.
pub(crate) fn get_test_state(id_policy: MissingIdPolicy) -> AppState<SQLiteTransactionStore> {
    AppState::with_rng(get_test_store(), id_policy, StdRng::seed_from_u64(42))
}

pub(crate) fn get_test_server<S>(state: AppState<S>) -> TestServer
where
    S: TransactionStore + Clone + Send + Sync + 'static,
{
    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}
