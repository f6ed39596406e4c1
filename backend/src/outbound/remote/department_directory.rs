//! Reqwest-backed `DepartmentDirectory` calling the department service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use super::peer_client::{PeerClient, id_list};
use crate::domain::DepartmentId;
use crate::domain::ports::{DepartmentDirectory, DepartmentSummary, RemoteReferenceError};

/// Department directory backed by the department service's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpDepartmentDirectory {
    peer: PeerClient,
}

impl HttpDepartmentDirectory {
    /// Build a directory for the department service at `base`.
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
impl DepartmentDirectory for HttpDepartmentDirectory {
    async fn fetch_department(
        &self,
        id: DepartmentId,
    ) -> Result<Option<DepartmentSummary>, RemoteReferenceError> {
        self.peer
            .get_optional(&format!("/api/v1/departments/{id}"), &[])
            .await
    }

    async fn fetch_departments(
        &self,
        ids: Vec<DepartmentId>,
    ) -> Result<Vec<DepartmentSummary>, RemoteReferenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.peer
            .get_json("/api/v1/departments/by-ids", &[("ids", id_list(ids.as_slice()))])
            .await
    }

    async fn department_exists(&self, id: DepartmentId) -> Result<bool, RemoteReferenceError> {
        self.peer
            .get_json(&format!("/api/v1/departments/{id}/exists"), &[])
            .await
    }
}
