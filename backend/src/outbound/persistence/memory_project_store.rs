//! In-process project and membership storage.
//!
//! One store implements both project ports so that a project removal and a
//! member insert can each check the other table under the same locks. Locks
//! are always taken projects first, members second.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use super::table::{MemoryTable, Row, clash, count_matching};
use crate::domain::ports::{
    ProjectMemberRepository, ProjectRemoval, ProjectRepository, RecordRepositoryError,
};
use crate::domain::{
    EmployeeId, MemberDraft, MemberId, Project, ProjectDraft, ProjectFilter, ProjectId,
    ProjectMember, ProjectSortField,
};

impl Row for Project {
    fn row_id(&self) -> i64 {
        self.id.get()
    }
}

impl Row for ProjectMember {
    fn row_id(&self) -> i64 {
        self.id.get()
    }
}

fn unique_code(stored: &Project, candidate: &Project) -> Result<(), RecordRepositoryError> {
    clash("code", &stored.code, &candidate.code)
}

fn unique_pair(stored: &ProjectMember, candidate: &ProjectMember) -> Result<(), RecordRepositoryError> {
    if stored.project_id == candidate.project_id && stored.employee_id == candidate.employee_id {
        Err(RecordRepositoryError::unique_violation(
            "employeeId",
            stored.employee_id.to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Projects and their membership rows held in process memory.
#[derive(Debug, Default)]
pub struct MemoryProjectStore {
    projects: MemoryTable<Project>,
    members: MemoryTable<ProjectMember>,
}

#[async_trait]
impl ProjectRepository for MemoryProjectStore {
    async fn insert(
        &self,
        draft: ProjectDraft,
        now: DateTime<Utc>,
    ) -> Result<Project, RecordRepositoryError> {
        self.projects
            .insert(
                |id| Project::from_draft(ProjectId::new(id), draft, now),
                unique_code,
            )
            .await
    }

    async fn update(&self, project: Project) -> Result<Option<Project>, RecordRepositoryError> {
        self.projects.replace(project, unique_code).await
    }

    async fn find(&self, id: ProjectId) -> Result<Option<Project>, RecordRepositoryError> {
        Ok(self.projects.get(id.get()).await)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Project>, RecordRepositoryError> {
        Ok(self
            .projects
            .find(|project| clash("code", &project.code, code).is_err())
            .await)
    }

    async fn list(
        &self,
        filter: ProjectFilter,
        request: PageRequest<ProjectSortField>,
    ) -> Result<Page<Project>, RecordRepositoryError> {
        Ok(self
            .projects
            .page(
                |project| filter.matches(project),
                &request,
                |field, left, right| field.compare(left, right),
            )
            .await)
    }

    async fn all(&self) -> Result<Vec<Project>, RecordRepositoryError> {
        Ok(self.projects.select(|_| true).await)
    }

    async fn delete_unstaffed(
        &self,
        id: ProjectId,
    ) -> Result<ProjectRemoval, RecordRepositoryError> {
        let mut projects = self.projects.write().await;
        if !projects.contains(id.get()) {
            return Ok(ProjectRemoval::Missing);
        }
        let members = self.members.read().await;
        let staffed = count_matching(members.values(), |member| member.project_id == id);
        if staffed > 0 {
            return Ok(ProjectRemoval::Staffed(staffed));
        }
        projects.remove(id.get());
        Ok(ProjectRemoval::Removed)
    }
}

#[async_trait]
impl ProjectMemberRepository for MemoryProjectStore {
    async fn insert(
        &self,
        project_id: ProjectId,
        draft: MemberDraft,
        now: DateTime<Utc>,
    ) -> Result<ProjectMember, RecordRepositoryError> {
        let projects = self.projects.read().await;
        if !projects.contains_key(&project_id.get()) {
            return Err(RecordRepositoryError::missing_owner("Project", project_id.get()));
        }
        self.members.write().await.insert(
            |id| ProjectMember::from_draft(MemberId::new(id), project_id, draft, now),
            unique_pair,
        )
    }

    async fn find(
        &self,
        project_id: ProjectId,
        employee_id: EmployeeId,
    ) -> Result<Option<ProjectMember>, RecordRepositoryError> {
        Ok(self
            .members
            .find(|member| member.project_id == project_id && member.employee_id == employee_id)
            .await)
    }

    async fn list_by_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<ProjectMember>, RecordRepositoryError> {
        Ok(self
            .members
            .select(|member| member.project_id == project_id)
            .await)
    }

    async fn count_by_project(&self, project_id: ProjectId) -> Result<u64, RecordRepositoryError> {
        Ok(self
            .members
            .count(|member| member.project_id == project_id)
            .await)
    }

    async fn delete(
        &self,
        project_id: ProjectId,
        employee_id: EmployeeId,
    ) -> Result<bool, RecordRepositoryError> {
        let removed = self
            .members
            .remove_where(|member| member.project_id == project_id && member.employee_id == employee_id)
            .await;
        Ok(removed > 0)
    }
}
