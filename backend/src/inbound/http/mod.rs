//! HTTP inbound adapter exposing the REST endpoints of the record services.
//!
//! Each resource module exposes a `configure` function registering its
//! handlers; the server mounts the ones belonging to the selected service
//! under `/api/v1`.

pub mod departments;
pub mod employees;
pub mod error;
pub mod health;
pub mod idempotency;
pub mod members;
pub mod projects;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
