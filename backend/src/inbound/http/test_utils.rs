//! Test helpers for inbound HTTP components.

use actix_web::dev::ServiceResponse;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::test;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::Value;

use crate::inbound::http::error::PROBLEM_JSON;
use crate::test_support::FixedClock;

/// Timestamp stamped on records built by handler tests.
pub fn fixed_now() -> DateTime<Utc> {
    FixedClock::default().utc()
}

/// Read a problem document, checking its media type and status member.
pub async fn read_problem(response: ServiceResponse) -> Value {
    let status = response.status().as_u16();
    assert_eq!(
        response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some(PROBLEM_JSON)
    );
    let problem: Value = test::read_body_json(response).await;
    assert_eq!(problem.get("status").and_then(Value::as_u64), Some(u64::from(status)));
    problem
}

/// Slug at the end of a problem `type` URI.
pub fn problem_slug(problem: &Value) -> &str {
    problem
        .get("type")
        .and_then(Value::as_str)
        .and_then(|uri| uri.rsplit('/').next())
        .unwrap_or_default()
}

/// Build the app under test with the problem-rendering extractor configs.
macro_rules! test_app {
    ($state:expr, $configure:path) => {
        actix_web::App::new()
            .wrap($crate::middleware::Trace::default())
            .app_data($crate::inbound::http::error::json_config())
            .app_data($crate::inbound::http::error::path_config())
            .app_data($crate::inbound::http::error::query_config())
            .app_data(actix_web::web::Data::new($state))
            .service(actix_web::web::scope("/api/v1").configure($configure))
    };
}

pub(crate) use test_app;
