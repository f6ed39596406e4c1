//! Shared row storage for the in-process repositories.

use std::cmp::Ordering as SortOrdering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use pagination::{Page, PageRequest, SortKey};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::fold_case;
use crate::domain::ports::RecordRepositoryError;

/// A stored row with a numeric identity.
pub(super) trait Row: Clone + Send + Sync {
    fn row_id(&self) -> i64;
}

/// Rows keyed by identity, plus the sequence that hands out identities.
#[derive(Debug)]
pub(super) struct MemoryTable<T> {
    rows: RwLock<BTreeMap<i64, T>>,
    sequence: AtomicI64,
}

impl<T> Default for MemoryTable<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            sequence: AtomicI64::new(0),
        }
    }
}

/// A table held for writing, so several steps (possibly across tables)
/// happen under one lock.
pub(super) struct TableWrite<'a, T> {
    rows: RwLockWriteGuard<'a, BTreeMap<i64, T>>,
    sequence: &'a AtomicI64,
}

impl<T: Row> TableWrite<'_, T> {
    /// Store a row built under the next identity.
    ///
    /// `conflict` is run against every stored row. A rejected row still
    /// consumes its identity.
    pub(super) fn insert<B, C>(&mut self, build: B, conflict: C) -> Result<T, RecordRepositoryError>
    where
        B: FnOnce(i64) -> T,
        C: Fn(&T, &T) -> Result<(), RecordRepositoryError>,
    {
        let id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let row = build(id);
        self.rows
            .values()
            .try_for_each(|existing| conflict(existing, &row))?;
        self.rows.insert(id, row.clone());
        Ok(row)
    }

    pub(super) fn contains(&self, id: i64) -> bool {
        self.rows.contains_key(&id)
    }

    pub(super) fn remove(&mut self, id: i64) -> bool {
        self.rows.remove(&id).is_some()
    }

    /// Remove every row accepted by `predicate`; returns how many went.
    pub(super) fn remove_where<P>(&mut self, predicate: P) -> usize
    where
        P: Fn(&T) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|_, row| !predicate(row));
        before - self.rows.len()
    }
}

/// How many of `rows` are accepted by `predicate`.
pub(super) fn count_matching<'a, T: 'a, P>(rows: impl Iterator<Item = &'a T>, predicate: P) -> u64
where
    P: Fn(&T) -> bool,
{
    let matching = rows.filter(|row| predicate(row)).count();
    u64::try_from(matching).unwrap_or(u64::MAX)
}

impl<T: Row> MemoryTable<T> {
    /// Hold the table for writing.
    pub(super) async fn write(&self) -> TableWrite<'_, T> {
        TableWrite {
            rows: self.rows.write().await,
            sequence: &self.sequence,
        }
    }

    /// Hold the table for reading.
    pub(super) async fn read(&self) -> RwLockReadGuard<'_, BTreeMap<i64, T>> {
        self.rows.read().await
    }

    /// Store a row built under the next identity; see [`TableWrite::insert`].
    pub(super) async fn insert<B, C>(&self, build: B, conflict: C) -> Result<T, RecordRepositoryError>
    where
        B: FnOnce(i64) -> T,
        C: Fn(&T, &T) -> Result<(), RecordRepositoryError>,
    {
        self.write().await.insert(build, conflict)
    }

    /// Overwrite a stored row; `Ok(None)` when it is gone.
    ///
    /// `conflict` is only run against the other rows.
    pub(super) async fn replace<C>(&self, row: T, conflict: C) -> Result<Option<T>, RecordRepositoryError>
    where
        C: Fn(&T, &T) -> Result<(), RecordRepositoryError>,
    {
        let mut rows = self.rows.write().await;
        let id = row.row_id();
        if !rows.contains_key(&id) {
            return Ok(None);
        }
        rows.values()
            .filter(|existing| existing.row_id() != id)
            .try_for_each(|existing| conflict(existing, &row))?;
        rows.insert(id, row.clone());
        Ok(Some(row))
    }

    pub(super) async fn get(&self, id: i64) -> Option<T> {
        self.rows.read().await.get(&id).cloned()
    }

    /// First row, in identity order, accepted by `predicate`.
    pub(super) async fn find<P>(&self, predicate: P) -> Option<T>
    where
        P: Fn(&T) -> bool,
    {
        self.rows
            .read()
            .await
            .values()
            .find(|row| predicate(row))
            .cloned()
    }

    /// Every row accepted by `predicate`, in identity order.
    pub(super) async fn select<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        self.rows
            .read()
            .await
            .values()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }

    pub(super) async fn count<P>(&self, predicate: P) -> u64
    where
        P: Fn(&T) -> bool,
    {
        count_matching(self.rows.read().await.values(), predicate)
    }

    /// Filter, order and slice one page.
    pub(super) async fn page<K, P, F>(
        &self,
        predicate: P,
        request: &PageRequest<K>,
        by_field: F,
    ) -> Page<T>
    where
        K: SortKey,
        P: Fn(&T) -> bool,
        F: Fn(K, &T, &T) -> SortOrdering,
    {
        let mut rows = self.select(predicate).await;
        rows.sort_by(|left, right| request.sort().compare(left, right, &by_field));
        Page::paginate(rows, request)
    }

    pub(super) async fn remove(&self, id: i64) -> bool {
        self.write().await.remove(id)
    }

    /// Remove every row accepted by `predicate`; returns how many went.
    pub(super) async fn remove_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&T) -> bool,
    {
        self.write().await.remove_where(predicate)
    }
}

/// Reject `candidate` when it folds to the same value as `stored`.
///
/// The violation names the stored value, matching what a pre-write check
/// would have reported.
pub(super) fn clash(field: &str, stored: &str, candidate: &str) -> Result<(), RecordRepositoryError> {
    if fold_case(stored) == fold_case(candidate) {
        Err(RecordRepositoryError::unique_violation(field, stored))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagination::PageLimits;
    use rstest::rstest;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Key {
        Id,
    }

    impl SortKey for Key {
        const IDENTITY: Self = Self::Id;

        fn parse(field: &str) -> Option<Self> {
            (field == "id").then_some(Self::Id)
        }

        fn as_str(self) -> &'static str {
            "id"
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Tag {
        id: i64,
        label: String,
    }

    impl Row for Tag {
        fn row_id(&self) -> i64 {
            self.id
        }
    }

    fn tag(label: &str) -> impl FnOnce(i64) -> Tag + '_ {
        move |id| Tag {
            id,
            label: label.to_owned(),
        }
    }

    fn unique_label(stored: &Tag, candidate: &Tag) -> Result<(), RecordRepositoryError> {
        clash("label", &stored.label, &candidate.label)
    }

    #[tokio::test]
    async fn identities_are_monotonic_even_after_rejection() {
        let table = MemoryTable::default();
        let first = table.insert(tag("alpha"), unique_label).await.expect("first");
        table
            .insert(tag("ALPHA"), unique_label)
            .await
            .expect_err("folded duplicate");
        let third = table.insert(tag("beta"), unique_label).await.expect("third");

        assert_eq!((first.id, third.id), (1, 3));
    }

    #[tokio::test]
    async fn replace_ignores_own_row_and_reports_missing() {
        let table = MemoryTable::default();
        let stored = table.insert(tag("alpha"), unique_label).await.expect("stored");

        let renamed = Tag {
            label: "Alpha".to_owned(),
            ..stored
        };
        let saved = table
            .replace(renamed.clone(), unique_label)
            .await
            .expect("own value");
        assert_eq!(saved, Some(renamed));

        let ghost = Tag {
            id: 99,
            label: "ghost".to_owned(),
        };
        assert_eq!(table.replace(ghost, unique_label).await.expect("no error"), None);
    }

    #[rstest]
    #[case(Some(0), Some(2), vec![1, 2])]
    #[case(Some(1), Some(2), vec![3])]
    #[tokio::test]
    async fn pages_rows_in_sort_order(
        #[case] page: Option<i64>,
        #[case] size: Option<i64>,
        #[case] expected: Vec<i64>,
    ) {
        let table = MemoryTable::default();
        for label in ["c", "a", "b"] {
            table.insert(tag(label), unique_label).await.expect("stored");
        }
        let request =
            PageRequest::<Key>::compose(page, size, None, PageLimits::default()).expect("request");

        let slice = table
            .page(|_| true, &request, |_, l: &Tag, r: &Tag| l.id.cmp(&r.id))
            .await;

        let ids: Vec<_> = slice.content.iter().map(|row| row.id).collect();
        assert_eq!(ids, expected);
        assert_eq!(slice.total_elements, 3);
    }
}
