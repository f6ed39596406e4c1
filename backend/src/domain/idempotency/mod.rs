//! Idempotency primitives for safely retryable creations.
//!
//! - [`IdempotencyKey`]: opaque token sent via the `Idempotency-Key` header.
//! - [`MutationType`]: scope separating keys per creation endpoint.
//! - [`IdempotencyScope`]: namespace of a key, including a parent record for
//!   nested creations.
//! - [`PayloadHash`]: fingerprint of the body a key was first used with.
//! - [`IdempotencyConfig`]: injectable expiry and capacity policy.
//! - [`IdempotentOutcome`]: a stored or freshly computed response snapshot.
//! - [`run_idempotent`]: wraps one creation in the store.
//!
//! The cache is process-local and best effort: a restart forgets every key.

mod config;
mod creation;
mod key;
mod mutation_type;
mod payload;
mod request;

use serde_json::Value;

pub use config::IdempotencyConfig;
pub use creation::{Created, run_idempotent};
pub use key::{IdempotencyKey, IdempotencyKeyValidationError, MAX_IDEMPOTENCY_KEY_LEN};
pub use mutation_type::MutationType;
pub use payload::PayloadHash;
pub use request::{IdempotencyRequest, IdempotencyScope};

/// Response snapshot returned by the idempotency store.
#[derive(Debug, Clone, PartialEq)]
pub struct IdempotentOutcome {
    /// Serialised response body.
    pub snapshot: Value,
    /// Whether the snapshot came from an earlier request with the same key.
    pub replayed: bool,
}

impl IdempotentOutcome {
    /// Snapshot computed by this request.
    #[must_use]
    pub fn fresh(snapshot: Value) -> Self {
        Self {
            snapshot,
            replayed: false,
        }
    }

    /// Snapshot replayed from an earlier request.
    #[must_use]
    pub fn replayed(snapshot: Value) -> Self {
        Self {
            snapshot,
            replayed: true,
        }
    }
}
