//! Outbound adapters implementing domain ports for infrastructure.
//!
//! - **persistence**: in-process record repositories
//! - **cache**: `moka`-backed idempotency cache
//! - **remote**: `reqwest` clients for peer record services
//! - **metrics**: Prometheus-backed metrics exporters (feature-gated)
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod cache;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
pub mod remote;
