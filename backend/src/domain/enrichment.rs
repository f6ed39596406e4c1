//! Attach remotely sourced detail to locally owned records.
//!
//! Enrichment degrades instead of failing: a missing reference, an unknown
//! id or an unreachable peer all leave the detail [`Detail::Absent`] while
//! the base records are still returned. The batch form makes exactly one
//! remote call per batch, and none when no record carries a reference.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::hash::Hash;

use super::ports::{DepartmentSummary, EmployeeSummary, RemoteReferenceError, RemoteTarget};
use super::reference::{Detail, degrade_detail, log_degraded};
use super::{DepartmentId, EmployeeId};

/// Remote detail addressable by its identity.
pub trait Keyed {
    /// Identity type shared with the soft reference.
    type Key;

    /// Identity of this detail record.
    fn key(&self) -> Self::Key;
}

impl Keyed for EmployeeSummary {
    type Key = EmployeeId;

    fn key(&self) -> EmployeeId {
        self.id
    }
}

impl Keyed for DepartmentSummary {
    type Key = DepartmentId;

    fn key(&self) -> DepartmentId {
        self.id
    }
}

/// A local record carrying an optional soft reference.
pub trait Enrichable: Sized {
    /// Identity of the referenced remote record.
    type Key: Copy + Ord + Hash;
    /// Remote detail type.
    type Detail: Keyed<Key = Self::Key> + Clone;
    /// Record with detail attached.
    type Enriched;

    /// Soft reference held by this record, if any.
    fn reference(&self) -> Option<Self::Key>;

    /// Combine the record with its (possibly absent) detail.
    fn attach(self, detail: Detail<Self::Detail>) -> Self::Enriched;
}

/// Enrich one record with a single-record lookup.
///
/// `fetch` is not called when the record carries no reference.
pub async fn enrich_one<R, F, Fut>(record: R, target: RemoteTarget, fetch: F) -> R::Enriched
where
    R: Enrichable,
    F: FnOnce(R::Key) -> Fut,
    Fut: Future<Output = Result<Option<R::Detail>, RemoteReferenceError>>,
{
    let Some(key) = record.reference() else {
        return record.attach(Detail::Absent);
    };
    let detail = degrade_detail(fetch(key).await, target, "fetch_one");
    record.attach(detail)
}

/// Enrich a batch with one call for all distinct references.
///
/// Records keep their order. Details missing from the remote answer, and all
/// details when the call fails, are left absent.
pub async fn enrich_batch<R, F, Fut>(
    records: Vec<R>,
    target: RemoteTarget,
    fetch_many: F,
) -> Vec<R::Enriched>
where
    R: Enrichable,
    F: FnOnce(Vec<R::Key>) -> Fut,
    Fut: Future<Output = Result<Vec<R::Detail>, RemoteReferenceError>>,
{
    let keys: BTreeSet<R::Key> = records.iter().filter_map(Enrichable::reference).collect();
    if keys.is_empty() {
        return records
            .into_iter()
            .map(|record| record.attach(Detail::Absent))
            .collect();
    }

    let details: HashMap<R::Key, R::Detail> = match fetch_many(keys.into_iter().collect()).await {
        Ok(found) => found.into_iter().map(|detail| (detail.key(), detail)).collect(),
        Err(error) => {
            log_degraded(target, "fetch_many", &error);
            HashMap::new()
        }
    };

    records
        .into_iter()
        .map(|record| {
            let detail = record
                .reference()
                .and_then(|key| details.get(&key).cloned());
            record.attach(Detail::from(detail))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        department: Option<DepartmentId>,
    }

    impl Enrichable for Row {
        type Key = DepartmentId;
        type Detail = DepartmentSummary;
        type Enriched = (i64, Option<String>);

        fn reference(&self) -> Option<DepartmentId> {
            self.department
        }

        fn attach(self, detail: Detail<DepartmentSummary>) -> Self::Enriched {
            (self.id, detail.into_option().map(|d| d.name))
        }
    }

    fn department(id: i64, name: &str) -> DepartmentSummary {
        DepartmentSummary {
            id: DepartmentId::new(id),
            name: name.to_owned(),
            code: name.to_uppercase(),
            location: None,
        }
    }

    fn row(id: i64, department: Option<i64>) -> Row {
        Row {
            id,
            department: department.map(DepartmentId::new),
        }
    }

    #[tokio::test]
    async fn batch_makes_one_call_with_distinct_keys() {
        let calls = Mutex::new(Vec::new());
        let rows = vec![row(1, Some(10)), row(2, Some(10)), row(3, Some(20)), row(4, None)];

        let enriched = enrich_batch(rows, RemoteTarget::Department, |keys| {
            calls.lock().expect("lock").push(keys.clone());
            async move { Ok(vec![department(10, "Ops")]) }
        })
        .await;

        assert_eq!(
            calls.into_inner().expect("lock"),
            vec![vec![DepartmentId::new(10), DepartmentId::new(20)]]
        );
        assert_eq!(
            enriched,
            vec![
                (1, Some("Ops".to_owned())),
                (2, Some("Ops".to_owned())),
                (3, None),
                (4, None),
            ]
        );
    }

    #[tokio::test]
    async fn batch_skips_call_without_references() {
        let called = AtomicBool::new(false);
        let enriched = enrich_batch(vec![row(1, None)], RemoteTarget::Department, |_| {
            called.store(true, Ordering::SeqCst);
            async { Ok(Vec::new()) }
        })
        .await;
        assert_eq!(enriched, vec![(1, None)]);
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn batch_failure_returns_base_records() {
        let enriched = enrich_batch(
            vec![row(1, Some(10)), row(2, Some(11))],
            RemoteTarget::Department,
            |_| async { Err(RemoteReferenceError::transport("connection refused")) },
        )
        .await;
        assert_eq!(enriched, vec![(1, None), (2, None)]);
    }

    #[tokio::test]
    async fn single_skips_call_for_null_reference() {
        let called = AtomicBool::new(false);
        let enriched = enrich_one(row(5, None), RemoteTarget::Department, |_| {
            called.store(true, Ordering::SeqCst);
            async { Ok(None) }
        })
        .await;
        assert_eq!(enriched, (5, None));
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn single_failure_leaves_detail_absent() {
        let enriched = enrich_one(row(5, Some(10)), RemoteTarget::Department, |_| async {
            Err(RemoteReferenceError::timeout("slow"))
        })
        .await;
        assert_eq!(enriched, (5, None));
    }
}
