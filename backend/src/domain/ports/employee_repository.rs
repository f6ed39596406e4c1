//! Port for employee persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use super::RecordRepositoryError;
use crate::domain::{
    DepartmentCount, DepartmentId, Employee, EmployeeDraft, EmployeeFilter, EmployeeId,
    EmployeeSortField,
};

/// Storage for employee records.
///
/// Email uniqueness is case-insensitive; adapters enforce it on insert and
/// update and report collisions as
/// [`RecordRepositoryError::UniqueViolation`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Store a new employee under a freshly assigned identity.
    async fn insert(
        &self,
        draft: EmployeeDraft,
        now: DateTime<Utc>,
    ) -> Result<Employee, RecordRepositoryError>;

    /// Overwrite a stored employee; `Ok(None)` when it no longer exists.
    async fn update(&self, employee: Employee) -> Result<Option<Employee>, RecordRepositoryError>;

    async fn find(&self, id: EmployeeId) -> Result<Option<Employee>, RecordRepositoryError>;

    /// Case-insensitive email lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, RecordRepositoryError>;

    /// Employees among `ids`; unknown ids are skipped.
    async fn find_by_ids(
        &self,
        ids: Vec<EmployeeId>,
    ) -> Result<Vec<Employee>, RecordRepositoryError>;

    /// One filtered, sorted page.
    async fn list(
        &self,
        filter: EmployeeFilter,
        request: PageRequest<EmployeeSortField>,
    ) -> Result<Page<Employee>, RecordRepositoryError>;

    async fn find_by_department(
        &self,
        department_id: DepartmentId,
    ) -> Result<Vec<Employee>, RecordRepositoryError>;

    async fn count_by_department(
        &self,
        department_id: DepartmentId,
    ) -> Result<u64, RecordRepositoryError>;

    /// Head counts grouped by department reference, without names.
    async fn head_counts(&self) -> Result<Vec<DepartmentCount>, RecordRepositoryError>;

    /// Remove an employee; `Ok(false)` when it did not exist.
    async fn delete(&self, id: EmployeeId) -> Result<bool, RecordRepositoryError>;
}
