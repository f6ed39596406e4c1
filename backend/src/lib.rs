//! Staffing record services.
//!
//! One library backs three HTTP services: employees, departments and
//! projects. Each keeps its own records and refers to the others' records by
//! identity only, checking and enriching those references over HTTP.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
pub mod settings;
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
