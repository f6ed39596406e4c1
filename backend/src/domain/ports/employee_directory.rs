//! Driven port for reading employees from the employee service.
//!
//! Used by the department service (dependent counts, department rosters) and
//! the project service (member validation and enrichment).

use async_trait::async_trait;

use super::{EmployeeSummary, RemoteReferenceError};
use crate::domain::{DepartmentId, EmployeeId};

/// Port for resolving employee references held by other services.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Fetch one employee; `Ok(None)` when the peer reports it absent.
    async fn fetch_employee(
        &self,
        id: EmployeeId,
    ) -> Result<Option<EmployeeSummary>, RemoteReferenceError>;

    /// Fetch many employees in one call; unknown ids are silently omitted.
    async fn fetch_employees(
        &self,
        ids: Vec<EmployeeId>,
    ) -> Result<Vec<EmployeeSummary>, RemoteReferenceError>;

    /// Whether the employee exists.
    async fn employee_exists(&self, id: EmployeeId) -> Result<bool, RemoteReferenceError>;

    /// Number of employees referencing the department.
    async fn count_by_department(
        &self,
        department_id: DepartmentId,
    ) -> Result<u64, RemoteReferenceError>;

    /// Employees referencing the department.
    async fn employees_in_department(
        &self,
        department_id: DepartmentId,
    ) -> Result<Vec<EmployeeSummary>, RemoteReferenceError>;
}

/// Fixture directory where no employee exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEmployeeDirectory;

#[async_trait]
impl EmployeeDirectory for FixtureEmployeeDirectory {
    async fn fetch_employee(
        &self,
        _id: EmployeeId,
    ) -> Result<Option<EmployeeSummary>, RemoteReferenceError> {
        Ok(None)
    }

    async fn fetch_employees(
        &self,
        _ids: Vec<EmployeeId>,
    ) -> Result<Vec<EmployeeSummary>, RemoteReferenceError> {
        Ok(Vec::new())
    }

    async fn employee_exists(&self, _id: EmployeeId) -> Result<bool, RemoteReferenceError> {
        Ok(false)
    }

    async fn count_by_department(
        &self,
        _department_id: DepartmentId,
    ) -> Result<u64, RemoteReferenceError> {
        Ok(0)
    }

    async fn employees_in_department(
        &self,
        _department_id: DepartmentId,
    ) -> Result<Vec<EmployeeSummary>, RemoteReferenceError> {
        Ok(Vec::new())
    }
}
