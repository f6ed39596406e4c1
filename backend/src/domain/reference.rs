//! Failure policies for calls that resolve soft references.
//!
//! Every call site that asks a peer service a question names what happens
//! when the peer cannot answer. Enrichment never fails the surrounding
//! operation and works with [`Detail`]; guards and validators pick an
//! [`OnRemoteFailure`] policy explicitly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Error;
use super::ports::{RemoteReferenceError, RemoteTarget};

/// What a guard or validator does when the remote call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnRemoteFailure {
    /// Refuse the operation with a service-unavailable error.
    Block,
    /// Continue as if the check had passed.
    Proceed,
    /// Continue as if the remote record were absent (zero, empty, missing).
    TreatAsAbsent,
}

impl OnRemoteFailure {
    /// Stable label for configuration and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Proceed => "proceed",
            Self::TreatAsAbsent => "treat-as-absent",
        }
    }
}

impl fmt::Display for OnRemoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a policy label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown remote failure policy '{0}': expected block, proceed or treat-as-absent")]
pub struct ParseOnRemoteFailureError(String);

impl FromStr for OnRemoteFailure {
    type Err = ParseOnRemoteFailureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "block" => Ok(Self::Block),
            "proceed" => Ok(Self::Proceed),
            "treat-as-absent" => Ok(Self::TreatAsAbsent),
            _ => Err(ParseOnRemoteFailureError(s.to_owned())),
        }
    }
}

/// Remotely sourced detail that may be missing.
///
/// `Absent` covers "no reference", "peer says not found" and "peer could not
/// be reached" alike; enrichment callers never see the difference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Detail<T> {
    /// The peer returned the detail.
    Present(T),
    /// No detail is available.
    #[default]
    Absent,
}

impl<T> Detail<T> {
    /// Whether detail was found.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Convert into an `Option` for serialisation.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }
}

impl<T> From<Option<T>> for Detail<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Present)
    }
}

/// Turn a remote lookup into a [`Detail`], logging failures.
pub fn degrade_detail<T>(
    result: Result<Option<T>, RemoteReferenceError>,
    target: RemoteTarget,
    operation: &'static str,
) -> Detail<T> {
    match result {
        Ok(found) => Detail::from(found),
        Err(error) => {
            log_degraded(target, operation, &error);
            Detail::Absent
        }
    }
}

/// Turn a remote list lookup into a possibly empty list, logging failures.
pub fn degrade_list<T>(
    result: Result<Vec<T>, RemoteReferenceError>,
    target: RemoteTarget,
    operation: &'static str,
) -> Vec<T> {
    result.unwrap_or_else(|error| {
        log_degraded(target, operation, &error);
        Vec::new()
    })
}

pub(crate) fn log_degraded(
    target: RemoteTarget,
    operation: &'static str,
    error: &RemoteReferenceError,
) {
    warn!(
        target_service = target.label(),
        operation,
        error_kind = error.kind(),
        %error,
        "remote lookup failed; continuing without remote detail"
    );
}

/// Require a referenced remote record to exist.
///
/// `Ok(false)` from the peer always fails with
/// [`ErrorCode::ReferencedEntityMissing`](super::ErrorCode::ReferencedEntityMissing).
/// A failed call follows `policy`: `TreatAsAbsent` fails the same way,
/// `Block` fails with a service-unavailable error, `Proceed` accepts the
/// reference unverified.
///
/// # Errors
/// Returns the domain error chosen by the rules above.
pub fn require_reference(
    result: Result<bool, RemoteReferenceError>,
    policy: OnRemoteFailure,
    target: RemoteTarget,
    id: i64,
) -> Result<(), Error> {
    match result {
        Ok(true) => Ok(()),
        Ok(false) => Err(Error::referenced_entity_missing(target.entity(), id)),
        Err(error) => {
            warn!(
                target_service = target.label(),
                reference_id = id,
                policy = policy.as_str(),
                error_kind = error.kind(),
                %error,
                "reference check could not reach the owning service"
            );
            match policy {
                OnRemoteFailure::Proceed => Ok(()),
                OnRemoteFailure::TreatAsAbsent => {
                    Err(Error::referenced_entity_missing(target.entity(), id))
                }
                OnRemoteFailure::Block => Err(Error::service_unavailable(format!(
                    "{} service is unavailable; cannot verify {} {id}",
                    target.label(),
                    target.label()
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn timeout() -> RemoteReferenceError {
        RemoteReferenceError::timeout("2s elapsed")
    }

    #[rstest]
    #[case::block("block", OnRemoteFailure::Block)]
    #[case::proceed(" Proceed ", OnRemoteFailure::Proceed)]
    #[case::kebab("treat-as-absent", OnRemoteFailure::TreatAsAbsent)]
    #[case::snake("treat_as_absent", OnRemoteFailure::TreatAsAbsent)]
    fn parses_policy_labels(#[case] raw: &str, #[case] expected: OnRemoteFailure) {
        assert_eq!(raw.parse::<OnRemoteFailure>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!("retry".parse::<OnRemoteFailure>().is_err());
    }

    #[rstest]
    #[case::exists(Ok(true), OnRemoteFailure::Block, None)]
    #[case::missing(Ok(false), OnRemoteFailure::Proceed, Some(ErrorCode::ReferencedEntityMissing))]
    #[case::failed_absent(Err(timeout()), OnRemoteFailure::TreatAsAbsent, Some(ErrorCode::ReferencedEntityMissing))]
    #[case::failed_block(Err(timeout()), OnRemoteFailure::Block, Some(ErrorCode::ServiceUnavailable))]
    #[case::failed_proceed(Err(timeout()), OnRemoteFailure::Proceed, None)]
    fn reference_checks_follow_policy(
        #[case] result: Result<bool, RemoteReferenceError>,
        #[case] policy: OnRemoteFailure,
        #[case] expected: Option<ErrorCode>,
    ) {
        let outcome = require_reference(result, policy, RemoteTarget::Department, 999);
        assert_eq!(outcome.err().map(|err| err.code()), expected);
    }

    #[test]
    fn degrade_detail_hides_failures() {
        let detail: Detail<u8> =
            degrade_detail(Err(timeout()), RemoteTarget::Employee, "fetch_employee");
        assert_eq!(detail, Detail::Absent);
        assert_eq!(
            degrade_detail(Ok(Some(3_u8)), RemoteTarget::Employee, "fetch_employee"),
            Detail::Present(3)
        );
    }

    #[test]
    fn degrade_list_returns_empty_on_failure() {
        let list: Vec<u8> = degrade_list(
            Err(RemoteReferenceError::status(502_u16, "bad gateway")),
            RemoteTarget::Employee,
            "employees_in_department",
        );
        assert!(list.is_empty());
    }
}
