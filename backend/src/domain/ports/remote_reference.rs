//! Shared contract for calls that resolve soft references in another service.
//!
//! The domain owns the summary shapes it reads from peers; adapters only
//! translate transport payloads into them.

use serde::{Deserialize, Serialize};

use super::define_port_error;
use crate::domain::{DepartmentId, EmployeeId};

define_port_error! {
    /// Errors surfaced while calling a peer service.
    pub enum RemoteReferenceError {
        /// Network transport failed before a response arrived.
        Transport { message: String } => "remote transport failed: {message}",
        /// The call exceeded its timeout.
        Timeout { message: String } => "remote call timed out: {message}",
        /// The peer answered with a non-success status.
        Status { status: u16, message: String } => "remote returned status {status}: {message}",
        /// The peer's payload could not be decoded.
        Decode { message: String } => "remote response decode failed: {message}",
    }
}

/// Remote collection a soft reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteTarget {
    /// Records owned by the employee service.
    Employee,
    /// Records owned by the department service.
    Department,
}

impl RemoteTarget {
    /// Display name used in messages.
    #[must_use]
    pub const fn entity(self) -> &'static str {
        match self {
            Self::Employee => "Employee",
            Self::Department => "Department",
        }
    }

    /// Lowercase label used in log fields.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Department => "department",
        }
    }
}

/// Employee detail as published by the employee service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    /// Employee identity.
    pub id: EmployeeId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Department the employee belongs to, if any.
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
}

/// Department detail as published by the department service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSummary {
    /// Department identity.
    pub id: DepartmentId,
    /// Department name.
    pub name: String,
    /// Department code.
    pub code: String,
    /// Optional office location.
    #[serde(default)]
    pub location: Option<String>,
}
