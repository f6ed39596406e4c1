//! Process-local idempotency cache backed by `moka`.
//!
//! Entries are keyed by scope (mutation type plus any parent record) and
//! idempotency key, expire after the configured TTL and are bounded in
//! number. Each entry remembers the fingerprint of the body that created it;
//! a later request with the same key but another body is refused. Concurrent
//! requests carrying the same key are coalesced onto a single computation; a
//! failed computation stores nothing.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use serde_json::Value;
use tracing::warn;

use crate::domain::ports::{
    IdempotencyMetrics, IdempotencyStore, NoOpIdempotencyMetrics, SnapshotFuture,
};
use crate::domain::{
    Error, IdempotencyConfig, IdempotencyKey, IdempotencyRequest, IdempotencyScope,
    IdempotentOutcome, MutationType, PayloadHash,
};

type CacheKey = (IdempotencyScope, IdempotencyKey);

/// A stored creation and the body fingerprint it was made with.
#[derive(Debug, Clone)]
struct StoredCreation {
    payload: PayloadHash,
    snapshot: Value,
}

/// In-memory [`IdempotencyStore`] with TTL expiry and request coalescing.
///
/// # Examples
/// ```
/// use staffing::domain::IdempotencyConfig;
/// use staffing::outbound::cache::MokaIdempotencyStore;
///
/// let store = MokaIdempotencyStore::new(IdempotencyConfig::default());
/// # let _ = store;
/// ```
#[derive(Clone)]
pub struct MokaIdempotencyStore {
    entries: Cache<CacheKey, StoredCreation>,
    metrics: Arc<dyn IdempotencyMetrics>,
}

impl MokaIdempotencyStore {
    /// Build a store without metrics.
    #[must_use]
    pub fn new(config: IdempotencyConfig) -> Self {
        Self::with_metrics(config, Arc::new(NoOpIdempotencyMetrics))
    }

    /// Build a store reporting hits and misses to `metrics`.
    #[must_use]
    pub fn with_metrics(config: IdempotencyConfig, metrics: Arc<dyn IdempotencyMetrics>) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_entries())
            .time_to_live(config.ttl())
            .build();
        Self { entries, metrics }
    }

    async fn record(&self, mutation: MutationType, replayed: bool) {
        let result = if replayed {
            self.metrics.record_hit(mutation).await
        } else {
            self.metrics.record_miss(mutation).await
        };
        if let Err(error) = result {
            warn!(mutation = mutation.as_str(), %error, "failed to record idempotency metric");
        }
    }
}

#[async_trait]
impl IdempotencyStore for MokaIdempotencyStore {
    async fn get_or_compute<'a>(
        &'a self,
        request: &'a IdempotencyRequest,
        compute: SnapshotFuture<'a>,
    ) -> Result<IdempotentOutcome, Error> {
        let payload = request.payload;
        let entry = self
            .entries
            .entry((request.scope, request.key.clone()))
            .or_try_insert_with(async move {
                let snapshot = compute.await?;
                Ok::<_, Error>(StoredCreation { payload, snapshot })
            })
            .await
            .map_err(|shared: Arc<Error>| Error::clone(&shared))?;

        let replayed = !entry.is_fresh();
        let stored = entry.into_value();
        if stored.payload != request.payload {
            warn!(
                mutation = request.scope.mutation.as_str(),
                owner = ?request.scope.owner,
                stored = %stored.payload,
                received = %request.payload,
                "idempotency key reused with a different body"
            );
            return Err(Error::idempotency_conflict(request.key.as_ref()));
        }

        self.record(request.scope.mutation, replayed).await;
        Ok(if replayed {
            IdempotentOutcome::replayed(stored.snapshot)
        } else {
            IdempotentOutcome::fresh(stored.snapshot)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockIdempotencyMetrics;
    use futures_util::future::join_all;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn store() -> MokaIdempotencyStore {
        MokaIdempotencyStore::new(IdempotencyConfig::default())
    }

    fn request(scope: IdempotencyScope, raw: &str, body: &Value) -> IdempotencyRequest {
        IdempotencyRequest::keyed(scope, Some(IdempotencyKey::new(raw).expect("valid key")), body)
            .expect("request")
            .expect("keyed")
    }

    fn global(mutation: MutationType, raw: &str) -> IdempotencyRequest {
        request(IdempotencyScope::global(mutation), raw, &json!({"name": "Finance"}))
    }

    fn counting(calls: &AtomicUsize, body: Value) -> SnapshotFuture<'_> {
        Box::pin(async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(body)
        })
    }

    #[rstest]
    #[tokio::test]
    async fn second_request_replays_first_snapshot(store: MokaIdempotencyStore) {
        let calls = AtomicUsize::new(0);
        let request = global(MutationType::CreateEmployee, "order-1");

        let first = store
            .get_or_compute(&request, counting(&calls, json!({"id": 1})))
            .await
            .expect("first");
        let second = store
            .get_or_compute(&request, counting(&calls, json!({"id": 2})))
            .await
            .expect("second");

        assert!(!first.replayed);
        assert!(second.replayed);
        assert_eq!(second.snapshot, json!({"id": 1}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn same_key_on_other_mutation_does_not_collide(store: MokaIdempotencyStore) {
        let calls = AtomicUsize::new(0);

        for mutation in [MutationType::CreateEmployee, MutationType::CreateDepartment] {
            let outcome = store
                .get_or_compute(&global(mutation, "shared"), counting(&calls, json!({})))
                .await
                .expect("computed");
            assert!(!outcome.replayed);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn same_key_under_other_parent_does_not_collide(store: MokaIdempotencyStore) {
        let calls = AtomicUsize::new(0);
        let body = json!({"employeeId": 7, "role": "Engineer", "allocationPercent": 50});
        let first_project = request(
            IdempotencyScope::owned(MutationType::AddProjectMember, 1),
            "k1",
            &body,
        );
        let second_project = request(
            IdempotencyScope::owned(MutationType::AddProjectMember, 2),
            "k1",
            &body,
        );

        store
            .get_or_compute(&first_project, counting(&calls, json!({"projectId": 1})))
            .await
            .expect("first project");
        let outcome = store
            .get_or_compute(&second_project, counting(&calls, json!({"projectId": 2})))
            .await
            .expect("second project");

        assert!(!outcome.replayed);
        assert_eq!(outcome.snapshot, json!({"projectId": 2}));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn reused_key_with_other_body_is_refused(store: MokaIdempotencyStore) {
        let calls = AtomicUsize::new(0);
        let scope = IdempotencyScope::global(MutationType::CreateDepartment);
        let original = request(scope, "create-fin", &json!({"name": "Finance", "code": "FIN"}));
        let altered = request(scope, "create-fin", &json!({"name": "Legal", "code": "LEG"}));

        store
            .get_or_compute(&original, counting(&calls, json!({"id": 1})))
            .await
            .expect("original");
        let err = store
            .get_or_compute(&altered, counting(&calls, json!({"id": 2})))
            .await
            .expect_err("conflicting body");

        assert_eq!(err.code(), ErrorCode::IdempotencyConflict);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_computation_is_not_stored(store: MokaIdempotencyStore) {
        let calls = AtomicUsize::new(0);
        let request = global(MutationType::CreateProject, "retry-me");

        let err = store
            .get_or_compute(
                &request,
                Box::pin(async { Err(Error::service_unavailable("peer down")) }),
            )
            .await
            .expect_err("first attempt fails");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);

        let retried = store
            .get_or_compute(&request, counting(&calls, json!({"id": 3})))
            .await
            .expect("retry computes");
        assert!(!retried.replayed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn concurrent_requests_compute_once(store: MokaIdempotencyStore) {
        let counter = AtomicUsize::new(0);
        let burst = request(
            IdempotencyScope::owned(MutationType::AddProjectMember, 5),
            "burst",
            &json!({"employeeId": 9}),
        );
        let (calls, request, store) = (&counter, &burst, &store);

        let outcomes = join_all((0..8).map(move |_| {
            store.get_or_compute(
                request,
                Box::pin(async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok(json!({"id": 9}))
                }),
            )
        }))
        .await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        let fresh = outcomes
            .iter()
            .filter(|outcome| outcome.as_ref().is_ok_and(|o| !o.replayed))
            .count();
        assert_eq!(fresh, 1);
    }

    #[tokio::test]
    async fn records_miss_then_hit() {
        let mut metrics = MockIdempotencyMetrics::new();
        metrics
            .expect_record_miss()
            .times(1)
            .returning(|_| Ok(()));
        metrics.expect_record_hit().times(1).returning(|_| Ok(()));
        let store =
            MokaIdempotencyStore::with_metrics(IdempotencyConfig::default(), Arc::new(metrics));
        let request = global(MutationType::CreateEmployee, "metered");

        for _ in 0..2 {
            store
                .get_or_compute(&request, Box::pin(async { Ok(json!({})) }))
                .await
                .expect("computed");
        }
    }
}
