//! Domain port surface for recording idempotency cache outcomes.
//!
//! This port enables observability of replayed and fresh creations without
//! coupling the cache adapter to a specific metrics backend.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::MutationType;

define_port_error! {
    /// Errors exposed when recording idempotency metrics.
    pub enum IdempotencyMetricsError {
        /// Metric exporter rejected the write.
        Export { message: String } => "idempotency metrics exporter failed: {message}",
    }
}

/// Metrics recording port for idempotency outcomes.
///
/// Implementors record hits (replayed responses) and misses (fresh
/// computations) per mutation type.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdempotencyMetrics: Send + Sync {
    /// Record a miss: the key was new and the creation ran.
    async fn record_miss(&self, mutation: MutationType) -> Result<(), IdempotencyMetricsError>;

    /// Record a hit: the stored snapshot was replayed.
    async fn record_hit(&self, mutation: MutationType) -> Result<(), IdempotencyMetricsError>;
}

/// No-op implementation for when metrics are disabled or in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpIdempotencyMetrics;

#[async_trait]
impl IdempotencyMetrics for NoOpIdempotencyMetrics {
    async fn record_miss(&self, _mutation: MutationType) -> Result<(), IdempotencyMetricsError> {
        Ok(())
    }

    async fn record_hit(&self, _mutation: MutationType) -> Result<(), IdempotencyMetricsError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Ensures NoOpIdempotencyMetrics accepts hit and miss events.
    use super::*;

    #[tokio::test]
    async fn noop_accepts_every_event() {
        let metrics = NoOpIdempotencyMetrics;
        for mutation in MutationType::ALL {
            assert!(metrics.record_miss(mutation).await.is_ok());
            assert!(metrics.record_hit(mutation).await.is_ok());
        }
    }
}
