//! What an idempotency key is looked up by.

use serde::Serialize;

use super::{IdempotencyKey, MutationType, PayloadHash};
use crate::domain::Error;

/// Namespace an idempotency key lives in.
///
/// Keys sent to different endpoints, or to the same nested endpoint under
/// different parents, never see each other's entries.
///
/// # Example
///
/// ```
/// # use staffing::domain::idempotency::{IdempotencyScope, MutationType};
/// let first = IdempotencyScope::owned(MutationType::AddProjectMember, 1);
/// let second = IdempotencyScope::owned(MutationType::AddProjectMember, 2);
/// assert_ne!(first, second);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdempotencyScope {
    /// The creation endpoint.
    pub mutation: MutationType,
    /// Parent record of a nested creation, e.g. the project of a member.
    pub owner: Option<i64>,
}

impl IdempotencyScope {
    /// Scope for a top-level collection.
    #[must_use]
    pub const fn global(mutation: MutationType) -> Self {
        Self {
            mutation,
            owner: None,
        }
    }

    /// Scope for a collection nested under `owner`.
    #[must_use]
    pub const fn owned(mutation: MutationType, owner: i64) -> Self {
        Self {
            mutation,
            owner: Some(owner),
        }
    }
}

/// A keyed creation: where the key lives and what body it was sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyRequest {
    /// Namespace of the key.
    pub scope: IdempotencyScope,
    /// Caller-supplied key.
    pub key: IdempotencyKey,
    /// Fingerprint of the request body.
    pub payload: PayloadHash,
}

impl IdempotencyRequest {
    /// Build a request when the caller supplied a key.
    ///
    /// The body is only fingerprinted when a key is present.
    ///
    /// # Errors
    /// Returns an internal error when the body cannot be encoded.
    pub fn keyed<T: Serialize + ?Sized>(
        scope: IdempotencyScope,
        key: Option<IdempotencyKey>,
        payload: &T,
    ) -> Result<Option<Self>, Error> {
        key.map(|key| {
            Ok(Self {
                scope,
                key,
                payload: PayloadHash::of(payload)?,
            })
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn no_key_means_no_request() {
        let request = IdempotencyRequest::keyed(
            IdempotencyScope::global(MutationType::CreateEmployee),
            None,
            &json!({"email": "ada@example.com"}),
        )
        .expect("built");
        assert!(request.is_none());
    }

    #[test]
    fn keyed_request_carries_the_body_fingerprint() {
        let body = json!({"email": "ada@example.com"});
        let request = IdempotencyRequest::keyed(
            IdempotencyScope::global(MutationType::CreateEmployee),
            Some(IdempotencyKey::new("k1").expect("valid key")),
            &body,
        )
        .expect("built")
        .expect("keyed");
        assert_eq!(request.payload, PayloadHash::of(&body).expect("hash"));
        assert_eq!(request.scope.owner, None);
    }
}
