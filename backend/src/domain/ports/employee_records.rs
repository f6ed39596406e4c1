//! Driving port for the employee service's record operations.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use super::EmployeeSummary;
use crate::domain::{
    Created, DepartmentId, Employee, EmployeeFilter, EmployeeId, EmployeeInput,
    EmployeeSortField, EmployeeStats, EmployeeView, Error, IdempotencyKey,
};

/// Use cases served by the employee service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeRecords: Send + Sync {
    /// One page of employees with department detail attached best effort.
    async fn list(
        &self,
        filter: EmployeeFilter,
        request: PageRequest<EmployeeSortField>,
    ) -> Result<Page<EmployeeView>, Error>;

    /// Free-text search over names and email; `query` must not be blank.
    async fn search(
        &self,
        query: String,
        request: PageRequest<EmployeeSortField>,
    ) -> Result<Page<Employee>, Error>;

    async fn get(&self, id: EmployeeId, enrich: bool) -> Result<EmployeeView, Error>;

    async fn create(
        &self,
        input: EmployeeInput,
        key: Option<IdempotencyKey>,
    ) -> Result<Created<Employee>, Error>;

    async fn update(&self, id: EmployeeId, input: EmployeeInput) -> Result<Employee, Error>;

    async fn patch(&self, id: EmployeeId, input: EmployeeInput) -> Result<Employee, Error>;

    async fn delete(&self, id: EmployeeId) -> Result<(), Error>;

    async fn stats(&self) -> Result<EmployeeStats, Error>;

    async fn by_department(&self, id: DepartmentId) -> Result<Vec<EmployeeSummary>, Error>;

    async fn count_by_department(&self, id: DepartmentId) -> Result<u64, Error>;

    async fn by_ids(&self, ids: Vec<EmployeeId>) -> Result<Vec<EmployeeSummary>, Error>;

    async fn exists(&self, id: EmployeeId) -> Result<bool, Error>;
}
