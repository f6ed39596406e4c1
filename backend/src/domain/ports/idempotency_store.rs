//! Port abstraction for the idempotency cache.
//!
//! The [`IdempotencyStore`] trait wraps the creation path: the first request
//! carrying a key computes and stores its response snapshot together with the
//! body fingerprint. Later requests with the same key in the same scope
//! receive that snapshot without computing again, unless their body differs,
//! in which case they are refused.

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::domain::{Error, IdempotencyRequest, IdempotentOutcome};

/// Snapshot computation handed to the store; runs at most once per key.
pub type SnapshotFuture<'a> = BoxFuture<'a, Result<Value, Error>>;

/// Port for idempotent creation.
///
/// Implementations must be safe for concurrent use: two in-flight requests
/// with the same key must not both run `compute`. A failed computation is
/// not stored, so the caller may retry with the same key.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Return the stored snapshot for the request's key, or run `compute`
    /// and store it.
    ///
    /// # Errors
    /// Returns [`crate::domain::ErrorCode::IdempotencyConflict`] when the key
    /// was stored for a different body, and propagates the error of
    /// `compute`.
    async fn get_or_compute<'a>(
        &'a self,
        request: &'a IdempotencyRequest,
        compute: SnapshotFuture<'a>,
    ) -> Result<IdempotentOutcome, Error>;
}

/// Fixture store that never remembers anything.
///
/// Every call computes. Use it where idempotency behaviour is not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdempotencyStore;

#[async_trait]
impl IdempotencyStore for FixtureIdempotencyStore {
    async fn get_or_compute<'a>(
        &'a self,
        _request: &'a IdempotencyRequest,
        compute: SnapshotFuture<'a>,
    ) -> Result<IdempotentOutcome, Error> {
        compute.await.map(IdempotentOutcome::fresh)
    }
}
