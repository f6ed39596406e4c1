//! Error contract shared by the record repositories.

use tracing::error;

use super::define_port_error;
use crate::domain::Error;

define_port_error! {
    /// Errors raised by record repository adapters.
    pub enum RecordRepositoryError {
        /// Storage could not be reached.
        Connection { message: String } => "record repository connection failed: {message}",
        /// A read or write failed during execution.
        Query { message: String } => "record repository query failed: {message}",
        /// A unique constraint rejected the write.
        UniqueViolation { field: String, value: String } =>
            "unique constraint violated on {field}: {value}",
        /// The record a nested row belongs to was removed before the write.
        MissingOwner { entity: String, id: i64 } => "{entity} {id} no longer exists",
    }
}

/// Translate a repository failure into the domain error for `entity`.
///
/// A unique violation that slipped past the pre-write check (two racing
/// writers) still surfaces as a duplicate-field conflict.
pub(crate) fn map_repository_error(entity: &str, err: RecordRepositoryError) -> Error {
    match err {
        RecordRepositoryError::Connection { message } => {
            error!(entity, %message, "record storage unavailable");
            Error::service_unavailable(format!("{entity} storage unavailable"))
        }
        RecordRepositoryError::Query { message } => {
            error!(entity, %message, "record storage query failed");
            Error::internal(format!("{entity} storage error: {message}"))
        }
        RecordRepositoryError::UniqueViolation { field, value } => {
            Error::duplicate_field(entity, &field, &value)
        }
        RecordRepositoryError::MissingOwner { entity, id } => {
            Error::not_found(format!("{entity} with id {id} not found"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(RecordRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(RecordRepositoryError::query("syntax"), ErrorCode::InternalError)]
    #[case(RecordRepositoryError::unique_violation("code", "ENG"), ErrorCode::DuplicateField)]
    #[case(RecordRepositoryError::missing_owner("Project", 5), ErrorCode::NotFound)]
    fn maps_to_domain_codes(#[case] err: RecordRepositoryError, #[case] expected: ErrorCode) {
        assert_eq!(map_repository_error("Department", err).code(), expected);
    }
}
