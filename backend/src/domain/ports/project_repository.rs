//! Ports for project and membership persistence.
//!
//! Members are owned by their project. A project is only removed while it
//! has no members, and a member is only stored while its project exists;
//! both checks happen atomically with the write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use super::RecordRepositoryError;
use crate::domain::{
    EmployeeId, MemberDraft, Project, ProjectDraft, ProjectFilter, ProjectId, ProjectMember,
    ProjectSortField,
};

/// Result of an atomic project removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectRemoval {
    /// The project was removed.
    Removed,
    /// No project with that identity was stored.
    Missing,
    /// The project still has this many members and was kept.
    Staffed(u64),
}

/// Storage for project records; codes are unique case-insensitively.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn insert(
        &self,
        draft: ProjectDraft,
        now: DateTime<Utc>,
    ) -> Result<Project, RecordRepositoryError>;

    /// Overwrite a stored project; `Ok(None)` when it no longer exists.
    async fn update(&self, project: Project) -> Result<Option<Project>, RecordRepositoryError>;

    async fn find(&self, id: ProjectId) -> Result<Option<Project>, RecordRepositoryError>;

    /// Case-insensitive code lookup.
    async fn find_by_code(&self, code: &str) -> Result<Option<Project>, RecordRepositoryError>;

    async fn list(
        &self,
        filter: ProjectFilter,
        request: PageRequest<ProjectSortField>,
    ) -> Result<Page<Project>, RecordRepositoryError>;

    /// Every project, for statistics.
    async fn all(&self) -> Result<Vec<Project>, RecordRepositoryError>;

    /// Remove a project unless it has members, deciding under the same
    /// lock as the removal.
    async fn delete_unstaffed(
        &self,
        id: ProjectId,
    ) -> Result<ProjectRemoval, RecordRepositoryError>;
}

/// Storage for membership rows; `(project, employee)` pairs are unique.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectMemberRepository: Send + Sync {
    /// Store a member.
    ///
    /// Fails with [`RecordRepositoryError::MissingOwner`] when the project
    /// is gone at the time of the write.
    async fn insert(
        &self,
        project_id: ProjectId,
        draft: MemberDraft,
        now: DateTime<Utc>,
    ) -> Result<ProjectMember, RecordRepositoryError>;

    async fn find(
        &self,
        project_id: ProjectId,
        employee_id: EmployeeId,
    ) -> Result<Option<ProjectMember>, RecordRepositoryError>;

    /// Members of a project in assignment order.
    async fn list_by_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<ProjectMember>, RecordRepositoryError>;

    async fn count_by_project(&self, project_id: ProjectId) -> Result<u64, RecordRepositoryError>;

    async fn delete(
        &self,
        project_id: ProjectId,
        employee_id: EmployeeId,
    ) -> Result<bool, RecordRepositoryError>;
}
