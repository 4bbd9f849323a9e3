//! The API endpoint URIs.

/// The route for ingesting a transaction.
pub const TRANSACTION_API: &str = "/api/transaction";
