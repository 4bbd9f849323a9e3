//! Validates incoming transaction payloads and stores them.

use std::sync::Mutex;

use rand::RngCore;
use serde::Deserialize;

use crate::{
    Error,
    transaction::{
        core::{NewTransaction, Transaction, TransactionId},
        store::TransactionStore,
        timestamp::parse_timestamp,
    },
};

/// What to do when a payload does not include a transaction ID.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingIdPolicy {
    /// Treat a missing ID like any other missing field.
    #[default]
    Reject,
    /// Generate a random UUID v4 for the transaction.
    Generate,
}

/// The JSON body of a request to ingest a transaction.
///
/// Every field is optional here so that missing fields can be reported as
/// [Error::MissingData] instead of a deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    /// The client's unique ID for the transaction.
    pub transaction_id: Option<String>,
    /// The amount of money that moved.
    pub amount: Option<f64>,
    /// When the transaction happened, as an ISO-8601 date-time string.
    pub timestamp: Option<String>,
}

impl TransactionPayload {
    /// Check the payload and convert it into a transaction ready to be stored.
    ///
    /// Checks run in order: first that every field is present and not an empty
    /// string, then that the timestamp is a valid ISO-8601 date-time. An
    /// amount of zero counts as present. Under [MissingIdPolicy::Generate] a
    /// missing ID is not an error and a new ID is drawn from `id_source` once
    /// all other checks have passed. `id_source` is not locked otherwise.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::MissingData] if a required field is missing or empty,
    /// - [Error::InvalidTimestamp] if the timestamp cannot be parsed,
    /// - or [Error::IdGeneratorLockError] if an ID must be generated and
    ///   `id_source` is poisoned.
    pub fn validate<R: RngCore>(
        self,
        policy: MissingIdPolicy,
        id_source: &Mutex<R>,
    ) -> Result<NewTransaction, Error> {
        let id = self.transaction_id.filter(|id| !id.is_empty());
        let timestamp = self.timestamp.filter(|timestamp| !timestamp.is_empty());

        let (Some(amount), Some(timestamp)) = (self.amount, timestamp) else {
            return Err(Error::MissingData);
        };

        if id.is_none() && policy == MissingIdPolicy::Reject {
            return Err(Error::MissingData);
        }

        let timestamp = parse_timestamp(&timestamp)?;

        let id = match id {
            Some(id) => TransactionId::new_unchecked(id),
            None => {
                let mut rng = id_source.lock().map_err(|error| {
                    tracing::error!("could not acquire ID generator lock: {error}");
                    Error::IdGeneratorLockError
                })?;

                TransactionId::generate(&mut *rng)
            }
        };

        Ok(NewTransaction {
            id,
            amount,
            timestamp,
        })
    }
}

/// Validate `payload` and store it as a new transaction in `store`.
///
/// `id_source` is only drawn from when `policy` is [MissingIdPolicy::Generate]
/// and the payload has no ID. Nothing is written to `store` unless validation
/// passes, and then exactly one transaction is inserted.
///
/// # Errors
/// Returns the errors of [TransactionPayload::validate] or any error from
/// [TransactionStore::create].
pub fn submit_transaction<S, R>(
    payload: TransactionPayload,
    policy: MissingIdPolicy,
    id_source: &Mutex<R>,
    store: &S,
) -> Result<Transaction, Error>
where
    S: TransactionStore + ?Sized,
    R: RngCore,
{
    let new_transaction = payload.validate(policy, id_source)?;

    store.create(new_transaction)
}
