//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! problem documents; the domain only decides the category, the message and
//! any field-level violations.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::TraceId;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails shape validation.
    InvalidRequest,
    /// The requested local entity does not exist.
    NotFound,
    /// A uniqueness-constrained field collides with another record.
    DuplicateField,
    /// A soft reference points at a record the owning service does not have.
    ReferencedEntityMissing,
    /// Deletion refused because live dependents still reference the record.
    DependentsExist,
    /// An idempotency key was reused with a different request body.
    IdempotencyConflict,
    /// A fail-closed remote check could not be completed.
    ServiceUnavailable,
    /// An unexpected error occurred inside the service.
    InternalError,
}

impl ErrorCode {
    /// Stable slug used in problem type URIs.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::InvalidRequest => "validation-error",
            Self::NotFound => "not-found",
            Self::DuplicateField => "duplicate-field",
            Self::ReferencedEntityMissing => "referenced-entity-missing",
            Self::DependentsExist => "resource-in-use",
            Self::IdempotencyConflict => "idempotency-key-conflict",
            Self::ServiceUnavailable => "service-unavailable",
            Self::InternalError => "internal-error",
        }
    }

    /// Short human-readable summary of the category.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::InvalidRequest => "Validation Failed",
            Self::NotFound => "Resource Not Found",
            Self::DuplicateField => "Duplicate Value",
            Self::ReferencedEntityMissing => "Referenced Entity Not Found",
            Self::DependentsExist => "Resource In Use",
            Self::IdempotencyConflict => "Idempotency Key Conflict",
            Self::ServiceUnavailable => "Dependent Service Unavailable",
            Self::InternalError => "Internal Server Error",
        }
    }
}

/// One offending input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// External (camelCase) field name.
    pub field: String,
    /// What is wrong with the value.
    pub message: String,
}

impl FieldViolation {
    /// Build a violation for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Domain error payload.
///
/// Captures the trace identifier in scope at construction so adapters can
/// correlate the response with logs.
///
/// # Examples
/// ```
/// use staffing::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("Employee 7 not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    trace_id: Option<String>,
    errors: Vec<FieldViolation>,
    details: Option<Value>,
}

impl Error {
    /// Create a new error, capturing the current trace identifier if any.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            errors: Vec::new(),
            details: None,
        }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Correlation identifier, when one was in scope.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Field violations; empty unless this is a validation failure.
    #[must_use]
    pub fn errors(&self) -> &[FieldViolation] {
        &self.errors
    }

    /// Supplementary structured details.
    #[must_use]
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach a trace identifier to the error.
    #[must_use]
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Attach structured details to the error.
    ///
    /// ```
    /// use staffing::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "name" }));
    /// assert!(err.details().is_some());
    /// ```
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Validation failure listing every offending field.
    #[must_use]
    pub fn validation(errors: Vec<FieldViolation>) -> Self {
        let mut error = Self::invalid_request("Validation failed for the request");
        error.errors = errors;
        error
    }

    /// Validation failure for a single field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::validation(vec![FieldViolation::new(field, message)])
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Uniqueness violation naming the field and the colliding value.
    #[must_use]
    pub fn duplicate_field(entity: &str, field: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::DuplicateField,
            format!("{entity} with {field} '{value}' already exists"),
        )
        .with_details(json!({ "field": field, "value": value }))
    }

    /// Soft reference to a remote record that does not exist.
    #[must_use]
    pub fn referenced_entity_missing(entity: &str, id: i64) -> Self {
        Self::new(
            ErrorCode::ReferencedEntityMissing,
            format!("{entity} with id {id} does not exist"),
        )
        .with_details(json!({ "entity": entity, "id": id }))
    }

    /// Deletion refused while dependents exist.
    #[must_use]
    pub fn dependents_exist(entity: &str, id: i64, dependents: &str, count: u64) -> Self {
        Self::new(
            ErrorCode::DependentsExist,
            format!("Cannot delete {entity} {id}: {count} {dependents} still reference it"),
        )
        .with_details(json!({ "dependentCount": count }))
    }

    /// A key already used for a different body on the same endpoint.
    #[must_use]
    pub fn idempotency_conflict(key: &str) -> Self {
        Self::new(
            ErrorCode::IdempotencyConflict,
            format!("Idempotency key '{key}' was already used with a different request body"),
        )
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl From<pagination::PaginationError> for Error {
    fn from(err: pagination::PaginationError) -> Self {
        Self::invalid_field(err.parameter(), err.to_string())
    }
}
