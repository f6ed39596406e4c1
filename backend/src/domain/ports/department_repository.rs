//! Port for department persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use super::RecordRepositoryError;
use crate::domain::{Department, DepartmentDraft, DepartmentFilter, DepartmentId, DepartmentSortField};

/// Storage for department records.
///
/// Name and code are each unique, case-insensitively.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    async fn insert(
        &self,
        draft: DepartmentDraft,
        now: DateTime<Utc>,
    ) -> Result<Department, RecordRepositoryError>;

    /// Overwrite a stored department; `Ok(None)` when it no longer exists.
    async fn update(
        &self,
        department: Department,
    ) -> Result<Option<Department>, RecordRepositoryError>;

    async fn find(&self, id: DepartmentId) -> Result<Option<Department>, RecordRepositoryError>;

    /// Case-insensitive name lookup.
    async fn find_by_name(&self, name: &str) -> Result<Option<Department>, RecordRepositoryError>;

    /// Case-insensitive code lookup.
    async fn find_by_code(&self, code: &str) -> Result<Option<Department>, RecordRepositoryError>;

    async fn find_by_ids(
        &self,
        ids: Vec<DepartmentId>,
    ) -> Result<Vec<Department>, RecordRepositoryError>;

    async fn list(
        &self,
        filter: DepartmentFilter,
        request: PageRequest<DepartmentSortField>,
    ) -> Result<Page<Department>, RecordRepositoryError>;

    async fn delete(&self, id: DepartmentId) -> Result<bool, RecordRepositoryError>;
}
