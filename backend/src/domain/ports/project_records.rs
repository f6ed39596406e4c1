//! Driving ports for the project service.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    BulkAddOutcome, BulkMemberInput, Created, EmployeeId, Error, IdempotencyKey, MemberInput,
    MemberView, ProjectFilter, ProjectId, ProjectInput, ProjectMember, ProjectSortField,
    ProjectStats, ProjectView, StatsGrouping,
};

/// Project use cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRecords: Send + Sync {
    async fn list(
        &self,
        filter: ProjectFilter,
        request: PageRequest<ProjectSortField>,
    ) -> Result<Page<ProjectView>, Error>;

    async fn get(&self, id: ProjectId) -> Result<ProjectView, Error>;

    async fn get_by_code(&self, code: String) -> Result<ProjectView, Error>;

    async fn create(
        &self,
        input: ProjectInput,
        key: Option<IdempotencyKey>,
    ) -> Result<Created<ProjectView>, Error>;

    async fn update(&self, id: ProjectId, input: ProjectInput) -> Result<ProjectView, Error>;

    async fn patch(&self, id: ProjectId, input: ProjectInput) -> Result<ProjectView, Error>;

    /// Delete unless the project still has members.
    async fn delete(&self, id: ProjectId) -> Result<(), Error>;

    async fn stats(&self, grouping: StatsGrouping) -> Result<ProjectStats, Error>;
}

/// Membership use cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectMembers: Send + Sync {
    /// Members of a project; `enrich` attaches employee detail best effort.
    async fn list(&self, project_id: ProjectId, enrich: bool) -> Result<Vec<MemberView>, Error>;

    async fn get(
        &self,
        project_id: ProjectId,
        employee_id: EmployeeId,
        enrich: bool,
    ) -> Result<MemberView, Error>;

    async fn add(
        &self,
        project_id: ProjectId,
        input: MemberInput,
        key: Option<IdempotencyKey>,
    ) -> Result<Created<ProjectMember>, Error>;

    /// Shape-check every item, then add each independently.
    async fn add_bulk(
        &self,
        project_id: ProjectId,
        input: BulkMemberInput,
    ) -> Result<BulkAddOutcome, Error>;

    async fn remove(&self, project_id: ProjectId, employee_id: EmployeeId) -> Result<(), Error>;
}
