//! In-process `DepartmentRepository`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use super::table::{MemoryTable, Row, clash};
use crate::domain::ports::{DepartmentRepository, RecordRepositoryError};
use crate::domain::{
    Department, DepartmentDraft, DepartmentFilter, DepartmentId, DepartmentSortField,
};

impl Row for Department {
    fn row_id(&self) -> i64 {
        self.id.get()
    }
}

fn unique_name_and_code(
    stored: &Department,
    candidate: &Department,
) -> Result<(), RecordRepositoryError> {
    clash("name", &stored.name, &candidate.name)?;
    clash("code", &stored.code, &candidate.code)
}

/// Department rows held in process memory.
#[derive(Debug, Default)]
pub struct MemoryDepartmentRepository {
    table: MemoryTable<Department>,
}

#[async_trait]
impl DepartmentRepository for MemoryDepartmentRepository {
    async fn insert(
        &self,
        draft: DepartmentDraft,
        now: DateTime<Utc>,
    ) -> Result<Department, RecordRepositoryError> {
        self.table
            .insert(
                |id| Department::from_draft(DepartmentId::new(id), draft, now),
                unique_name_and_code,
            )
            .await
    }

    async fn update(
        &self,
        department: Department,
    ) -> Result<Option<Department>, RecordRepositoryError> {
        self.table.replace(department, unique_name_and_code).await
    }

    async fn find(&self, id: DepartmentId) -> Result<Option<Department>, RecordRepositoryError> {
        Ok(self.table.get(id.get()).await)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Department>, RecordRepositoryError> {
        Ok(self
            .table
            .find(|department| clash("name", &department.name, name).is_err())
            .await)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Department>, RecordRepositoryError> {
        Ok(self
            .table
            .find(|department| clash("code", &department.code, code).is_err())
            .await)
    }

    async fn find_by_ids(
        &self,
        ids: Vec<DepartmentId>,
    ) -> Result<Vec<Department>, RecordRepositoryError> {
        let wanted: BTreeSet<_> = ids.into_iter().collect();
        Ok(self
            .table
            .select(|department| wanted.contains(&department.id))
            .await)
    }

    async fn list(
        &self,
        filter: DepartmentFilter,
        request: PageRequest<DepartmentSortField>,
    ) -> Result<Page<Department>, RecordRepositoryError> {
        Ok(self
            .table
            .page(
                |department| filter.matches(department),
                &request,
                |field, left, right| field.compare(left, right),
            )
            .await)
    }

    async fn delete(&self, id: DepartmentId) -> Result<bool, RecordRepositoryError> {
        Ok(self.table.remove(id.get()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FixedClock;
    use mockable::Clock;
    use rstest::rstest;

    fn draft(name: &str, code: &str) -> DepartmentDraft {
        DepartmentDraft {
            name: name.to_owned(),
            code: code.to_owned(),
            description: None,
            manager_email: None,
            location: Some("Berlin".to_owned()),
        }
    }

    async fn seeded() -> MemoryDepartmentRepository {
        let repository = MemoryDepartmentRepository::default();
        repository
            .insert(draft("Engineering", "ENG"), FixedClock::default().utc())
            .await
            .expect("seeded");
        repository
    }

    #[rstest]
    #[case::name(draft("ENGINEERING", "OPS"), "name", "Engineering")]
    #[case::code(draft("Operations", "eng"), "code", "ENG")]
    #[tokio::test]
    async fn name_and_code_are_unique_ignoring_case(
        #[case] candidate: DepartmentDraft,
        #[case] field: &str,
        #[case] stored: &str,
    ) {
        let repository = seeded().await;

        let err = repository
            .insert(candidate, FixedClock::default().utc())
            .await
            .expect_err("duplicate");

        assert_eq!(err, RecordRepositoryError::unique_violation(field, stored));
    }

    #[tokio::test]
    async fn lookups_ignore_case() {
        let repository = seeded().await;

        let by_name = repository.find_by_name("engineering").await.expect("name");
        let by_code = repository.find_by_code("Eng").await.expect("code");

        assert_eq!(by_name, by_code);
        assert!(by_name.is_some());
    }

    #[tokio::test]
    async fn update_may_keep_own_code() {
        let repository = seeded().await;
        let mut stored = repository
            .find(DepartmentId::new(1))
            .await
            .expect("lookup")
            .expect("present");
        stored.code = "eng".to_owned();

        let saved = repository.update(stored).await.expect("update");

        assert_eq!(saved.map(|department| department.code), Some("eng".to_owned()));
    }
}
