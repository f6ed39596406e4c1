//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into `application/problem+json`
//! documents with consistent status codes. Extractor failures (malformed
//! JSON bodies, bad path segments and bad query strings) are routed through
//! the same renderer.

use actix_web::http::StatusCode;
use actix_web::http::header::HeaderValue;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, FieldViolation, TRACE_ID_HEADER, TraceId};
use crate::middleware::RequestContext;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Base of every problem `type` URI.
pub const PROBLEM_TYPE_BASE: &str = "https://api.company.com/problems/";

/// Media type of problem documents.
pub const PROBLEM_JSON: &str = "application/problem+json";

const REDACTED_DETAIL: &str = "An unexpected error occurred. Please try again later.";

const RESERVED_MEMBERS: [&str; 8] = [
    "type", "title", "status", "detail", "timestamp", "traceId", "instance", "errors",
];

/// Problem document served for every failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
    pub trace_id: String,
    pub instance: String,
    /// Field-level violations; only present for validation failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldViolation>,
    /// Extension members such as `dependentCount`.
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

pub(crate) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::DuplicateField
        | ErrorCode::DependentsExist
        | ErrorCode::IdempotencyConflict => StatusCode::CONFLICT,
        ErrorCode::ReferencedEntityMissing => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn extensions_from(details: Option<&Value>) -> Map<String, Value> {
    match details {
        Some(Value::Object(members)) => members
            .iter()
            .filter(|(name, _)| !RESERVED_MEMBERS.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
        _ => Map::new(),
    }
}

impl ProblemDetails {
    /// Render `error` for the request currently in scope.
    ///
    /// Internal errors lose their message, field list and details.
    #[must_use]
    pub fn from_error(error: &Error, trace_id: &str) -> Self {
        let code = error.code();
        let context = RequestContext::current();
        let internal = matches!(code, ErrorCode::InternalError);
        Self {
            problem_type: format!("{PROBLEM_TYPE_BASE}{}", code.slug()),
            title: code.title().to_owned(),
            status: status_for(code).as_u16(),
            detail: if internal {
                REDACTED_DETAIL.to_owned()
            } else {
                error.message().to_owned()
            },
            timestamp: context
                .as_ref()
                .map_or_else(Utc::now, |request| request.received_at),
            trace_id: trace_id.to_owned(),
            instance: context.map(|request| request.path).unwrap_or_default(),
            errors: if internal {
                Vec::new()
            } else {
                error.errors().to_vec()
            },
            extensions: if internal {
                Map::new()
            } else {
                extensions_from(error.details())
            },
        }
    }
}

fn response_trace_id(error: &Error) -> String {
    error
        .trace_id()
        .map(str::to_owned)
        .or_else(|| TraceId::current().map(|id| id.to_string()))
        .unwrap_or_else(|| TraceId::generate().to_string())
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let trace_id = response_trace_id(self);
        if matches!(self.code(), ErrorCode::InternalError) {
            error!(trace_id = %trace_id, message = self.message(), "request failed");
        }
        let problem = ProblemDetails::from_error(self, &trace_id);
        let mut builder = HttpResponse::build(self.status_code());
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            builder.insert_header((TRACE_ID_HEADER, value));
        }
        match serde_json::to_vec(&problem) {
            Ok(body) => builder.content_type(PROBLEM_JSON).body(body),
            Err(err) => {
                error!(error = %err, "failed to encode problem document");
                builder.finish()
            }
        }
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

/// JSON body extractor settings rendering failures as problems.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req: &HttpRequest| {
        warn!(path = req.path(), error = %err, "rejected request body");
        Error::invalid_request(format!("Malformed request body: {err}")).into()
    })
}

/// Path extractor settings rendering failures as problems.
#[must_use]
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, req: &HttpRequest| {
        warn!(path = req.path(), error = %err, "rejected path parameter");
        Error::invalid_request(format!("Invalid path parameter: {err}")).into()
    })
}

/// Query extractor settings rendering failures as problems.
#[must_use]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, req: &HttpRequest| {
        warn!(path = req.path(), error = %err, "rejected query string");
        Error::invalid_request(format!("Invalid query parameter: {err}")).into()
    })
}
