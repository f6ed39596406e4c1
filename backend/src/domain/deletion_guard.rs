//! Pre-delete check that refuses removal while dependents exist.
//!
//! The guard looks the owner up first, then asks a dependent-count source.
//! Local sources (project members) always answer; remote sources (employees
//! per department) may fail, in which case the configured
//! [`OnRemoteFailure`] decides whether the deletion is blocked.

use std::future::Future;

use tracing::{info, warn};

use super::Error;
use super::ports::RemoteReferenceError;
use super::reference::OnRemoteFailure;

/// Answer from a dependent-count source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependentCount {
    /// The number of live dependents.
    Known(u64),
    /// The remote source could not be asked.
    Unavailable(RemoteReferenceError),
}

impl From<Result<u64, RemoteReferenceError>> for DependentCount {
    fn from(value: Result<u64, RemoteReferenceError>) -> Self {
        match value {
            Ok(count) => Self::Known(count),
            Err(error) => Self::Unavailable(error),
        }
    }
}

/// The record whose deletion is being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardedOwner {
    /// Entity name used in messages, e.g. `Department`.
    pub entity: &'static str,
    /// Owner identity.
    pub id: i64,
    /// Plural dependent label used in messages, e.g. `employee(s)`.
    pub dependents: &'static str,
}

/// Deletion guard with an explicit remote failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletionGuard {
    on_remote_failure: OnRemoteFailure,
}

impl DeletionGuard {
    /// Guard whose dependents are counted remotely.
    #[must_use]
    pub const fn new(on_remote_failure: OnRemoteFailure) -> Self {
        Self { on_remote_failure }
    }

    /// Guard for same-service dependents, which cannot be unavailable.
    #[must_use]
    pub const fn local() -> Self {
        Self::new(OnRemoteFailure::Block)
    }

    /// Policy applied when the dependent count is unavailable.
    #[must_use]
    pub const fn on_remote_failure(&self) -> OnRemoteFailure {
        self.on_remote_failure
    }

    /// Succeed only if the owner exists and has no dependents.
    ///
    /// `count` is not polled when the owner is absent.
    ///
    /// # Errors
    /// - `NotFound` when `exists` resolves to `false`.
    /// - `DependentsExist` when the count is positive.
    /// - `ServiceUnavailable` when the count is unavailable under
    ///   [`OnRemoteFailure::Block`].
    /// - Any error produced by `exists` or `count` themselves.
    pub async fn assert_deletable<E, C>(
        &self,
        owner: GuardedOwner,
        exists: E,
        count: C,
    ) -> Result<(), Error>
    where
        E: Future<Output = Result<bool, Error>>,
        C: Future<Output = Result<DependentCount, Error>>,
    {
        if !exists.await? {
            return Err(Error::not_found(format!(
                "{} {} not found",
                owner.entity, owner.id
            )));
        }

        match count.await? {
            DependentCount::Known(0) => Ok(()),
            DependentCount::Known(count) => {
                info!(
                    entity = owner.entity,
                    id = owner.id,
                    dependent_count = count,
                    "deletion refused while dependents exist"
                );
                Err(Error::dependents_exist(
                    owner.entity,
                    owner.id,
                    owner.dependents,
                    count,
                ))
            }
            DependentCount::Unavailable(error) => self.on_unavailable(owner, &error),
        }
    }

    fn on_unavailable(&self, owner: GuardedOwner, error: &RemoteReferenceError) -> Result<(), Error> {
        warn!(
            entity = owner.entity,
            id = owner.id,
            policy = self.on_remote_failure.as_str(),
            error_kind = error.kind(),
            %error,
            "dependent count unavailable"
        );
        match self.on_remote_failure {
            OnRemoteFailure::Block => Err(Error::service_unavailable(format!(
                "Cannot verify {} for {} {}; deletion refused",
                owner.dependents, owner.entity, owner.id
            ))),
            OnRemoteFailure::Proceed | OnRemoteFailure::TreatAsAbsent => Ok(()),
        }
    }
}
