//! Idempotent execution of a creation.

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::IdempotencyRequest;
use crate::domain::Error;
use crate::domain::ports::IdempotencyStore;

/// A created record and whether it was replayed from an earlier request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created<T> {
    /// The stored record.
    pub record: T,
    /// Whether the record was replayed rather than written by this request.
    pub replayed: bool,
}

impl<T> Created<T> {
    /// Record produced by this request.
    pub fn fresh(record: T) -> Self {
        Self {
            record,
            replayed: false,
        }
    }
}

fn serialize_snapshot<T: Serialize>(record: &T) -> Result<serde_json::Value, Error> {
    serde_json::to_value(record)
        .map_err(|err| Error::internal(format!("failed to serialize response: {err}")))
}

fn deserialize_snapshot<T: DeserializeOwned>(snapshot: serde_json::Value) -> Result<T, Error> {
    serde_json::from_value(snapshot)
        .map_err(|err| Error::internal(format!("failed to deserialize response: {err}")))
}

/// Run `create` at most once per key within the request's scope.
///
/// Without a request (no key supplied) the creation always runs and nothing
/// is stored.
///
/// # Errors
/// Propagates the error of `create` (which is never stored), the store's
/// conflict for a reused key with a different body, and reports snapshot
/// encoding failures as internal errors.
pub async fn run_idempotent<'a, T, F>(
    store: &'a dyn IdempotencyStore,
    request: Option<&'a IdempotencyRequest>,
    create: F,
) -> Result<Created<T>, Error>
where
    T: Serialize + DeserializeOwned + Send + 'a,
    F: Future<Output = Result<T, Error>> + Send + 'a,
{
    let Some(request) = request else {
        return create.await.map(Created::fresh);
    };

    let outcome = store
        .get_or_compute(
            request,
            Box::pin(async move {
                let record = create.await?;
                serialize_snapshot(&record)
            }),
        )
        .await?;

    if outcome.replayed {
        debug!(
            mutation = request.scope.mutation.as_str(),
            owner = ?request.scope.owner,
            "replaying stored creation"
        );
    }
    Ok(Created {
        record: deserialize_snapshot(outcome.snapshot)?,
        replayed: outcome.replayed,
    })
}
