//! Driving port for the department service's record operations.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use super::{DepartmentSummary, EmployeeSummary};
use crate::domain::{
    Created, Department, DepartmentFilter, DepartmentId, DepartmentInput, DepartmentSortField,
    Error, IdempotencyKey,
};

/// Use cases served by the department service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DepartmentRecords: Send + Sync {
    async fn list(
        &self,
        filter: DepartmentFilter,
        request: PageRequest<DepartmentSortField>,
    ) -> Result<Page<Department>, Error>;

    /// Free-text search over name, code and description.
    async fn search(
        &self,
        query: String,
        request: PageRequest<DepartmentSortField>,
    ) -> Result<Page<Department>, Error>;

    async fn get(&self, id: DepartmentId) -> Result<Department, Error>;

    async fn get_by_code(&self, code: String) -> Result<Department, Error>;

    /// Employees referencing the department, empty when the roster is
    /// unavailable.
    async fn employees(&self, id: DepartmentId) -> Result<Vec<EmployeeSummary>, Error>;

    async fn create(
        &self,
        input: DepartmentInput,
        key: Option<IdempotencyKey>,
    ) -> Result<Created<Department>, Error>;

    async fn update(&self, id: DepartmentId, input: DepartmentInput) -> Result<Department, Error>;

    async fn patch(&self, id: DepartmentId, input: DepartmentInput) -> Result<Department, Error>;

    /// Delete unless employees still reference the department.
    async fn delete(&self, id: DepartmentId) -> Result<(), Error>;

    async fn by_ids(&self, ids: Vec<DepartmentId>) -> Result<Vec<DepartmentSummary>, Error>;

    async fn exists(&self, id: DepartmentId) -> Result<bool, Error>;
}
