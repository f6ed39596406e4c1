//! Driven port for reading departments from the department service.

use async_trait::async_trait;

use super::{DepartmentSummary, RemoteReferenceError};
use crate::domain::DepartmentId;

/// Port for resolving department references held by employees.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DepartmentDirectory: Send + Sync {
    /// Fetch one department; `Ok(None)` when the peer reports it absent.
    async fn fetch_department(
        &self,
        id: DepartmentId,
    ) -> Result<Option<DepartmentSummary>, RemoteReferenceError>;

    /// Fetch many departments in one call; unknown ids are silently omitted.
    async fn fetch_departments(
        &self,
        ids: Vec<DepartmentId>,
    ) -> Result<Vec<DepartmentSummary>, RemoteReferenceError>;

    /// Whether the department exists.
    async fn department_exists(&self, id: DepartmentId) -> Result<bool, RemoteReferenceError>;
}

/// Fixture directory where no department exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDepartmentDirectory;

#[async_trait]
impl DepartmentDirectory for FixtureDepartmentDirectory {
    async fn fetch_department(
        &self,
        _id: DepartmentId,
    ) -> Result<Option<DepartmentSummary>, RemoteReferenceError> {
        Ok(None)
    }

    async fn fetch_departments(
        &self,
        _ids: Vec<DepartmentId>,
    ) -> Result<Vec<DepartmentSummary>, RemoteReferenceError> {
        Ok(Vec::new())
    }

    async fn department_exists(&self, _id: DepartmentId) -> Result<bool, RemoteReferenceError> {
        Ok(false)
    }
}
