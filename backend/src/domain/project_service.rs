//! Project record service.
//!
//! Projects own their members in the same store, so the deletion guard
//! counts dependents locally and cannot be blocked by a peer outage.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;

use crate::domain::deletion_guard::{DeletionGuard, DependentCount, GuardedOwner};
use crate::domain::ports::{
    IdempotencyStore, ProjectMemberRepository, ProjectRecords, ProjectRemoval, ProjectRepository,
    RecordRepositoryError, map_repository_error,
};
use crate::domain::uniqueness::{Holder, ensure_unique};
use crate::domain::{
    Created, Error, IdempotencyKey, IdempotencyRequest, IdempotencyScope, MutationType, Project,
    ProjectDraft, ProjectFilter, ProjectId, ProjectInput, ProjectSortField, ProjectStats,
    ProjectView, StatsGrouping, run_idempotent,
};

const ENTITY: &str = "Project";

/// Project service implementing [`ProjectRecords`].
#[derive(Clone)]
pub struct ProjectService<P, M> {
    projects: Arc<P>,
    members: Arc<M>,
    idempotency: Arc<dyn IdempotencyStore>,
    clock: Arc<dyn Clock>,
}

impl<P, M> ProjectService<P, M> {
    /// Create a service over the project and member stores.
    pub fn new(
        projects: Arc<P>,
        members: Arc<M>,
        idempotency: Arc<dyn IdempotencyStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            projects,
            members,
            idempotency,
            clock,
        }
    }
}

fn map_error(err: RecordRepositoryError) -> Error {
    map_repository_error(ENTITY, err)
}

pub(crate) fn not_found(id: ProjectId) -> Error {
    Error::not_found(format!("Project with id {id} not found"))
}

impl<P, M> ProjectService<P, M>
where
    P: ProjectRepository,
    M: ProjectMemberRepository,
{
    async fn require(&self, id: ProjectId) -> Result<Project, Error> {
        self.projects
            .find(id)
            .await
            .map_err(map_error)?
            .ok_or_else(|| not_found(id))
    }

    async fn view(&self, project: Project) -> Result<ProjectView, Error> {
        let members = self
            .members
            .list_by_project(project.id)
            .await
            .map_err(map_error)?;
        Ok(ProjectView { project, members })
    }

    async fn ensure_code_free(&self, code: &str, owner: Option<ProjectId>) -> Result<(), Error> {
        let existing = self.projects.find_by_code(code).await.map_err(map_error)?;
        ensure_unique(
            ENTITY,
            "code",
            existing.as_ref().map(|project| Holder {
                id: project.id.get(),
                value: &project.code,
            }),
            owner.map(ProjectId::get),
        )
    }

    async fn insert_checked(&self, draft: ProjectDraft) -> Result<ProjectView, Error> {
        self.ensure_code_free(&draft.code, None).await?;
        let project = self
            .projects
            .insert(draft, self.clock.utc())
            .await
            .map_err(map_error)?;
        Ok(ProjectView {
            project,
            members: Vec::new(),
        })
    }

    async fn store(&self, project: Project) -> Result<ProjectView, Error> {
        let id = project.id;
        let stored = self
            .projects
            .update(project)
            .await
            .map_err(map_error)?
            .ok_or_else(|| not_found(id))?;
        self.view(stored).await
    }
}

#[async_trait]
impl<P, M> ProjectRecords for ProjectService<P, M>
where
    P: ProjectRepository,
    M: ProjectMemberRepository,
{
    async fn list(
        &self,
        filter: ProjectFilter,
        request: PageRequest<ProjectSortField>,
    ) -> Result<Page<ProjectView>, Error> {
        let mut page = self
            .projects
            .list(filter, request)
            .await
            .map_err(map_error)?;
        let projects = std::mem::take(&mut page.content);
        let views = try_join_all(projects.into_iter().map(|project| self.view(project))).await?;
        Ok(page.with_content(views))
    }

    async fn get(&self, id: ProjectId) -> Result<ProjectView, Error> {
        let project = self.require(id).await?;
        self.view(project).await
    }

    async fn get_by_code(&self, code: String) -> Result<ProjectView, Error> {
        let project = self
            .projects
            .find_by_code(&code)
            .await
            .map_err(map_error)?
            .ok_or_else(|| Error::not_found(format!("Project with code {code} not found")))?;
        self.view(project).await
    }

    async fn create(
        &self,
        input: ProjectInput,
        key: Option<IdempotencyKey>,
    ) -> Result<Created<ProjectView>, Error> {
        let scope = IdempotencyScope::global(MutationType::CreateProject);
        let request = IdempotencyRequest::keyed(scope, key, &input)?;
        let draft = input.into_draft()?;
        let created = run_idempotent(
            self.idempotency.as_ref(),
            request.as_ref(),
            self.insert_checked(draft),
        )
        .await?;
        info!(
            project_id = created.record.project.id.get(),
            replayed = created.replayed,
            "project created"
        );
        Ok(created)
    }

    async fn update(&self, id: ProjectId, input: ProjectInput) -> Result<ProjectView, Error> {
        let draft = input.into_draft()?;
        let mut project = self.require(id).await?;
        self.ensure_code_free(&draft.code, Some(id)).await?;
        project.replace_with(draft, self.clock.utc());
        self.store(project).await
    }

    async fn patch(&self, id: ProjectId, input: ProjectInput) -> Result<ProjectView, Error> {
        let changes = input.into_changes()?;
        let mut project = self.require(id).await?;
        if let Some(code) = changes.code.as_deref() {
            self.ensure_code_free(code, Some(id)).await?;
        }
        project.apply(changes, self.clock.utc())?;
        self.store(project).await
    }

    async fn delete(&self, id: ProjectId) -> Result<(), Error> {
        let owner = GuardedOwner {
            entity: ENTITY,
            id: id.get(),
            dependents: "members",
        };
        let exists = async {
            Ok::<_, Error>(self.projects.find(id).await.map_err(map_error)?.is_some())
        };
        let count = async {
            let members = self.members.count_by_project(id).await.map_err(map_error)?;
            Ok::<_, Error>(DependentCount::Known(members))
        };
        DeletionGuard::local()
            .assert_deletable(owner, exists, count)
            .await?;

        // Members added after the guard looked are caught by the store.
        match self.projects.delete_unstaffed(id).await.map_err(map_error)? {
            ProjectRemoval::Removed => {}
            ProjectRemoval::Missing => return Err(not_found(id)),
            ProjectRemoval::Staffed(count) => {
                return Err(Error::dependents_exist(ENTITY, id.get(), "members", count));
            }
        }
        info!(project_id = id.get(), "project deleted");
        Ok(())
    }

    async fn stats(&self, grouping: StatsGrouping) -> Result<ProjectStats, Error> {
        let projects = self.projects.all().await.map_err(map_error)?;
        Ok(ProjectStats::tally(&projects, grouping))
    }
}

#[cfg(test)]
#[path = "project_service_tests.rs"]
mod tests;
