//! Reqwest-backed `EmployeeDirectory` calling the employee service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use super::peer_client::{PeerClient, id_list};
use crate::domain::ports::{EmployeeDirectory, EmployeeSummary, RemoteReferenceError};
use crate::domain::{DepartmentId, EmployeeId};

/// Employee directory backed by the employee service's HTTP API.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use staffing::outbound::remote::HttpEmployeeDirectory;
///
/// let base = "http://localhost:8081".parse().expect("valid url");
/// let directory = HttpEmployeeDirectory::new(base, Duration::from_secs(2));
/// assert!(directory.is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct HttpEmployeeDirectory {
    peer: PeerClient,
}

impl HttpEmployeeDirectory {
    /// Build a directory for the employee service at `base`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            peer: PeerClient::new(base, timeout)?,
        })
    }
}

#[async_trait]
impl EmployeeDirectory for HttpEmployeeDirectory {
    async fn fetch_employee(
        &self,
        id: EmployeeId,
    ) -> Result<Option<EmployeeSummary>, RemoteReferenceError> {
        self.peer
            .get_optional(
                &format!("/api/v1/employees/{id}"),
                &[("enrich", "false".to_owned())],
            )
            .await
    }

    async fn fetch_employees(
        &self,
        ids: Vec<EmployeeId>,
    ) -> Result<Vec<EmployeeSummary>, RemoteReferenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.peer
            .get_json("/api/v1/employees/by-ids", &[("ids", id_list(ids.as_slice()))])
            .await
    }

    async fn employee_exists(&self, id: EmployeeId) -> Result<bool, RemoteReferenceError> {
        self.peer
            .get_json(&format!("/api/v1/employees/{id}/exists"), &[])
            .await
    }

    async fn count_by_department(
        &self,
        department_id: DepartmentId,
    ) -> Result<u64, RemoteReferenceError> {
        self.peer
            .get_json(
                &format!("/api/v1/employees/count-by-department/{department_id}"),
                &[],
            )
            .await
    }

    async fn employees_in_department(
        &self,
        department_id: DepartmentId,
    ) -> Result<Vec<EmployeeSummary>, RemoteReferenceError> {
        self.peer
            .get_json(
                &format!("/api/v1/employees/by-department/{department_id}"),
                &[],
            )
            .await
    }
}
