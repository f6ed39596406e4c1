//! In-process `EmployeeRepository`.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use super::table::{MemoryTable, Row, clash};
use crate::domain::ports::{EmployeeRepository, RecordRepositoryError};
use crate::domain::{
    DepartmentCount, DepartmentId, Employee, EmployeeDraft, EmployeeFilter, EmployeeId,
    EmployeeSortField,
};

impl Row for Employee {
    fn row_id(&self) -> i64 {
        self.id.get()
    }
}

fn unique_email(stored: &Employee, candidate: &Employee) -> Result<(), RecordRepositoryError> {
    clash("email", &stored.email, &candidate.email)
}

/// Employee rows held in process memory.
#[derive(Debug, Default)]
pub struct MemoryEmployeeRepository {
    table: MemoryTable<Employee>,
}

#[async_trait]
impl EmployeeRepository for MemoryEmployeeRepository {
    async fn insert(
        &self,
        draft: EmployeeDraft,
        now: DateTime<Utc>,
    ) -> Result<Employee, RecordRepositoryError> {
        self.table
            .insert(
                |id| Employee::from_draft(EmployeeId::new(id), draft, now),
                unique_email,
            )
            .await
    }

    async fn update(&self, employee: Employee) -> Result<Option<Employee>, RecordRepositoryError> {
        self.table.replace(employee, unique_email).await
    }

    async fn find(&self, id: EmployeeId) -> Result<Option<Employee>, RecordRepositoryError> {
        Ok(self.table.get(id.get()).await)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, RecordRepositoryError> {
        Ok(self
            .table
            .find(|employee| clash("email", &employee.email, email).is_err())
            .await)
    }

    async fn find_by_ids(
        &self,
        ids: Vec<EmployeeId>,
    ) -> Result<Vec<Employee>, RecordRepositoryError> {
        let wanted: BTreeSet<_> = ids.into_iter().collect();
        Ok(self
            .table
            .select(|employee| wanted.contains(&employee.id))
            .await)
    }

    async fn list(
        &self,
        filter: EmployeeFilter,
        request: PageRequest<EmployeeSortField>,
    ) -> Result<Page<Employee>, RecordRepositoryError> {
        Ok(self
            .table
            .page(
                |employee| filter.matches(employee),
                &request,
                |field, left, right| field.compare(left, right),
            )
            .await)
    }

    async fn find_by_department(
        &self,
        department_id: DepartmentId,
    ) -> Result<Vec<Employee>, RecordRepositoryError> {
        Ok(self
            .table
            .select(|employee| employee.department_id == Some(department_id))
            .await)
    }

    async fn count_by_department(
        &self,
        department_id: DepartmentId,
    ) -> Result<u64, RecordRepositoryError> {
        Ok(self
            .table
            .count(|employee| employee.department_id == Some(department_id))
            .await)
    }

    async fn head_counts(&self) -> Result<Vec<DepartmentCount>, RecordRepositoryError> {
        let mut counts: BTreeMap<Option<DepartmentId>, u64> = BTreeMap::new();
        for employee in self.table.select(|_| true).await {
            *counts.entry(employee.department_id).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(department_id, count)| DepartmentCount {
                department_id,
                count,
                department_name: None,
            })
            .collect())
    }

    async fn delete(&self, id: EmployeeId) -> Result<bool, RecordRepositoryError> {
        Ok(self.table.remove(id.get()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FixedClock;
    use mockable::Clock;
    use pagination::PageLimits;
    use rstest::{fixture, rstest};

    fn draft(email: &str, department: Option<i64>) -> EmployeeDraft {
        EmployeeDraft {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: email.to_owned(),
            department_id: department.map(DepartmentId::new),
        }
    }

    #[fixture]
    fn repository() -> MemoryEmployeeRepository {
        MemoryEmployeeRepository::default()
    }

    async fn seed(repository: &MemoryEmployeeRepository, rows: &[(&str, Option<i64>)]) {
        for (email, department) in rows {
            repository
                .insert(draft(email, *department), FixedClock::default().utc())
                .await
                .expect("seeded");
        }
    }

    #[rstest]
    #[tokio::test]
    async fn email_is_unique_ignoring_case(repository: MemoryEmployeeRepository) {
        seed(&repository, &[("ada@example.com", None)]).await;

        let err = repository
            .insert(draft("ADA@example.com", None), FixedClock::default().utc())
            .await
            .expect_err("duplicate email");

        assert_eq!(
            err,
            RecordRepositoryError::unique_violation("email", "ada@example.com")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn finds_by_email_ignoring_case(repository: MemoryEmployeeRepository) {
        seed(&repository, &[("ada@example.com", None)]).await;

        let found = repository
            .find_by_email("Ada@Example.COM")
            .await
            .expect("lookup");

        assert_eq!(found.map(|e| e.id), Some(EmployeeId::new(1)));
    }

    #[rstest]
    #[tokio::test]
    async fn counts_and_groups_by_department(repository: MemoryEmployeeRepository) {
        seed(
            &repository,
            &[
                ("a@example.com", Some(1)),
                ("b@example.com", Some(1)),
                ("c@example.com", Some(2)),
                ("d@example.com", None),
            ],
        )
        .await;

        assert_eq!(
            repository
                .count_by_department(DepartmentId::new(1))
                .await
                .expect("count"),
            2
        );
        let counts: Vec<_> = repository
            .head_counts()
            .await
            .expect("head counts")
            .into_iter()
            .map(|row| (row.department_id.map(DepartmentId::get), row.count))
            .collect();
        assert_eq!(counts, [(None, 1), (Some(1), 2), (Some(2), 1)]);
    }

    #[rstest]
    #[tokio::test]
    async fn lists_filtered_page_in_requested_order(repository: MemoryEmployeeRepository) {
        seed(
            &repository,
            &[
                ("b@example.com", Some(1)),
                ("c@example.com", Some(2)),
                ("a@example.com", Some(1)),
            ],
        )
        .await;
        let request = PageRequest::compose(None, Some(10), Some("email,desc"), PageLimits::default())
            .expect("request");
        let filter = EmployeeFilter {
            department_id: Some(DepartmentId::new(1)),
            ..EmployeeFilter::default()
        };

        let page = repository.list(filter, request).await.expect("page");

        let emails: Vec<_> = page.content.iter().map(|e| e.email.as_str()).collect();
        assert_eq!(emails, ["b@example.com", "a@example.com"]);
        assert_eq!(page.sort, "email,desc");
    }

    #[rstest]
    #[tokio::test]
    async fn batch_lookup_skips_unknown_ids(repository: MemoryEmployeeRepository) {
        seed(&repository, &[("a@example.com", None), ("b@example.com", None)]).await;

        let found = repository
            .find_by_ids(vec![EmployeeId::new(2), EmployeeId::new(42), EmployeeId::new(2)])
            .await
            .expect("batch");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, EmployeeId::new(2));
    }

    #[rstest]
    #[tokio::test]
    async fn update_of_deleted_employee_reports_absence(repository: MemoryEmployeeRepository) {
        seed(&repository, &[("a@example.com", None)]).await;
        let stored = repository
            .find(EmployeeId::new(1))
            .await
            .expect("lookup")
            .expect("present");

        assert!(repository.delete(stored.id).await.expect("delete"));
        assert!(!repository.delete(stored.id).await.expect("second delete"));
        assert_eq!(repository.update(stored).await.expect("update"), None);
    }
}
