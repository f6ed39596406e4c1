//! Helpers for idempotent creations in HTTP handlers.

use actix_web::HttpResponse;
use actix_web::http::header::{HeaderMap, LOCATION};
use serde::Serialize;

use crate::domain::{Created, Error, IdempotencyKey, IdempotencyKeyValidationError};

/// HTTP header name for idempotency keys.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Response header flagging a creation served from the idempotency cache.
pub const IDEMPOTENT_REPLAYED_HEADER: &str = "Idempotent-Replayed";

/// Extract the idempotency key from request headers.
///
/// # Errors
///
/// Returns the validation failure when the header is present but unusable.
pub fn extract_idempotency_key(
    headers: &HeaderMap,
) -> Result<Option<IdempotencyKey>, IdempotencyKeyValidationError> {
    let Some(header_value) = headers.get(IDEMPOTENCY_KEY_HEADER) else {
        return Ok(None);
    };

    let key_str = header_value
        .to_str()
        .map_err(|_| IdempotencyKeyValidationError::InvalidKey)?;

    IdempotencyKey::new(key_str).map(Some)
}

/// Map idempotency key validation errors to domain errors.
#[must_use]
pub fn map_idempotency_key_error(err: IdempotencyKeyValidationError) -> Error {
    Error::invalid_field(IDEMPOTENCY_KEY_HEADER, err.to_string())
}

/// Parse the optional key, reporting an unusable header as a bad request.
///
/// # Errors
///
/// Returns an `InvalidRequest` error naming the header.
pub fn idempotency_key(headers: &HeaderMap) -> Result<Option<IdempotencyKey>, Error> {
    extract_idempotency_key(headers).map_err(map_idempotency_key_error)
}

/// `201 Created` response for a creation, flagged when replayed.
#[must_use]
pub fn created_response<T: Serialize>(created: Created<T>, location: String) -> HttpResponse {
    let mut builder = HttpResponse::Created();
    builder.insert_header((LOCATION, location));
    if created.replayed {
        builder.insert_header((IDEMPOTENT_REPLAYED_HEADER, "true"));
    }
    builder.json(created.record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::http::header::{HeaderName, HeaderValue};
    use rstest::rstest;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("idempotency-key"),
            HeaderValue::from_str(value).expect("valid header value"),
        );
        headers
    }

    #[test]
    fn absent_header_yields_no_key() {
        assert_eq!(extract_idempotency_key(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn opaque_tokens_are_accepted() {
        let key = extract_idempotency_key(&headers_with("create-emp-0001"))
            .expect("valid key")
            .expect("key present");
        assert_eq!(key.as_ref(), "create-emp-0001");
    }

    #[rstest]
    #[case("   ", IdempotencyKeyValidationError::EmptyKey)]
    #[case(" padded", IdempotencyKeyValidationError::InvalidKey)]
    fn unusable_headers_are_rejected(
        #[case] value: &str,
        #[case] expected: IdempotencyKeyValidationError,
    ) {
        assert_eq!(extract_idempotency_key(&headers_with(value)), Err(expected));
    }

    #[test]
    fn overlong_header_maps_to_field_violation() {
        let err = idempotency_key(&headers_with(&"k".repeat(256))).expect_err("too long");
        assert_eq!(err.errors()[0].field, IDEMPOTENCY_KEY_HEADER);
    }

    #[rstest]
    #[case(false, None)]
    #[case(true, Some("true"))]
    fn created_response_flags_replays(#[case] replayed: bool, #[case] header: Option<&str>) {
        let response = created_response(
            Created {
                record: serde_json::json!({"id": 1}),
                replayed,
            },
            "/api/v1/employees/1".to_owned(),
        );
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response
                .headers()
                .get(IDEMPOTENT_REPLAYED_HEADER)
                .and_then(|v| v.to_str().ok()),
            header
        );
        assert_eq!(
            response.headers().get(LOCATION).and_then(|v| v.to_str().ok()),
            Some("/api/v1/employees/1")
        );
    }
}
