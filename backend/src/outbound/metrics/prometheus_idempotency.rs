//! Prometheus adapter for idempotency cache metrics.
//!
//! Counters are registered with the registry that also backs the HTTP
//! middleware, so they appear on the same `/metrics` endpoint.

use async_trait::async_trait;
use prometheus::{IntCounterVec, Opts, Registry};

use crate::domain::MutationType;
use crate::domain::ports::{IdempotencyMetrics, IdempotencyMetricsError};

/// Prometheus-backed idempotency metrics recorder.
///
/// # Metric Specification
///
/// - **Name**: `staffing_idempotency_requests_total`
/// - **Type**: Counter
/// - **Labels**:
///   - `outcome`: `miss` or `hit`
///   - `mutation`: e.g. `create_employee`, `add_project_member`
pub struct PrometheusIdempotencyMetrics {
    requests_total: IntCounterVec,
}

impl PrometheusIdempotencyMetrics {
    /// Create and register metrics with the given registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric with the same name is already
    /// registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let requests_total = IntCounterVec::new(
            Opts::new(
                "staffing_idempotency_requests_total",
                "Keyed creation requests by cache outcome",
            ),
            &["outcome", "mutation"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;
        Ok(Self { requests_total })
    }

    fn record(&self, outcome: &str, mutation: MutationType) {
        self.requests_total
            .with_label_values(&[outcome, mutation.as_str()])
            .inc();
    }
}

#[async_trait]
impl IdempotencyMetrics for PrometheusIdempotencyMetrics {
    async fn record_miss(&self, mutation: MutationType) -> Result<(), IdempotencyMetricsError> {
        self.record("miss", mutation);
        Ok(())
    }

    async fn record_hit(&self, mutation: MutationType) -> Result<(), IdempotencyMetricsError> {
        self.record("hit", mutation);
        Ok(())
    }
}
