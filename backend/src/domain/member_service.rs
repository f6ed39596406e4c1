//! Project membership service.
//!
//! Adding a member checks, in order: the request shape, that the project
//! exists, that the employee is not already a member, and that the employee
//! exists in the employee service. Only then is the row written.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::enrichment::{enrich_batch, enrich_one};
use crate::domain::ports::{
    EmployeeDirectory, IdempotencyStore, ProjectMemberRepository, ProjectMembers,
    ProjectRepository, RecordRepositoryError, RemoteTarget, map_repository_error,
};
use crate::domain::project_service::not_found;
use crate::domain::reference::{OnRemoteFailure, require_reference};
use crate::domain::{
    BulkAddOutcome, BulkMemberInput, Created, EmployeeId, Error, IdempotencyKey, IdempotencyRequest,
    IdempotencyScope, MemberDraft, MemberInput, MemberOperationResult, MemberView, MutationType,
    ProjectId, ProjectMember, run_idempotent,
};

/// Membership service implementing [`ProjectMembers`].
#[derive(Clone)]
pub struct MemberService<P, M, E> {
    projects: Arc<P>,
    members: Arc<M>,
    employees: Arc<E>,
    idempotency: Arc<dyn IdempotencyStore>,
    clock: Arc<dyn Clock>,
    reference_policy: OnRemoteFailure,
}

impl<P, M, E> MemberService<P, M, E> {
    /// Create a service; unverifiable employees are treated as absent.
    pub fn new(
        projects: Arc<P>,
        members: Arc<M>,
        employees: Arc<E>,
        idempotency: Arc<dyn IdempotencyStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            projects,
            members,
            employees,
            idempotency,
            clock,
            reference_policy: OnRemoteFailure::TreatAsAbsent,
        }
    }

    /// Policy for employee existence checks when the peer cannot answer.
    #[must_use]
    pub fn with_reference_policy(mut self, policy: OnRemoteFailure) -> Self {
        self.reference_policy = policy;
        self
    }
}

fn map_error(err: RecordRepositoryError) -> Error {
    map_repository_error("Project member", err)
}

fn not_a_member(project_id: ProjectId, employee_id: EmployeeId) -> Error {
    Error::not_found(format!(
        "Employee {employee_id} is not a member of project {project_id}"
    ))
}

impl<P, M, E> MemberService<P, M, E>
where
    P: ProjectRepository,
    M: ProjectMemberRepository,
    E: EmployeeDirectory,
{
    async fn require_project(&self, id: ProjectId) -> Result<(), Error> {
        match self.projects.find(id).await.map_err(map_error)? {
            Some(_) => Ok(()),
            None => Err(not_found(id)),
        }
    }

    async fn ensure_not_member(
        &self,
        project_id: ProjectId,
        employee_id: EmployeeId,
    ) -> Result<(), Error> {
        let existing = self
            .members
            .find(project_id, employee_id)
            .await
            .map_err(map_error)?;
        match existing {
            Some(_) => Err(Error::duplicate_field(
                "Project member",
                "employeeId",
                &employee_id.to_string(),
            )),
            None => Ok(()),
        }
    }

    /// Duplicate pair, remote existence, then write; the project is known.
    async fn insert_checked(
        &self,
        project_id: ProjectId,
        draft: MemberDraft,
    ) -> Result<ProjectMember, Error> {
        self.ensure_not_member(project_id, draft.employee_id).await?;
        require_reference(
            self.employees.employee_exists(draft.employee_id).await,
            self.reference_policy,
            RemoteTarget::Employee,
            draft.employee_id.get(),
        )?;
        self.members
            .insert(project_id, draft, self.clock.utc())
            .await
            .map_err(map_error)
    }

    async fn add_to_existing(
        &self,
        project_id: ProjectId,
        draft: MemberDraft,
    ) -> Result<ProjectMember, Error> {
        self.require_project(project_id).await?;
        self.insert_checked(project_id, draft).await
    }
}

#[async_trait]
impl<P, M, E> ProjectMembers for MemberService<P, M, E>
where
    P: ProjectRepository,
    M: ProjectMemberRepository,
    E: EmployeeDirectory,
{
    async fn list(&self, project_id: ProjectId, enrich: bool) -> Result<Vec<MemberView>, Error> {
        self.require_project(project_id).await?;
        let members = self
            .members
            .list_by_project(project_id)
            .await
            .map_err(map_error)?;
        if !enrich {
            return Ok(members.into_iter().map(MemberView::bare).collect());
        }
        Ok(enrich_batch(members, RemoteTarget::Employee, |ids| {
            self.employees.fetch_employees(ids)
        })
        .await)
    }

    async fn get(
        &self,
        project_id: ProjectId,
        employee_id: EmployeeId,
        enrich: bool,
    ) -> Result<MemberView, Error> {
        let member = self
            .members
            .find(project_id, employee_id)
            .await
            .map_err(map_error)?
            .ok_or_else(|| not_a_member(project_id, employee_id))?;
        if !enrich {
            return Ok(MemberView::bare(member));
        }
        Ok(enrich_one(member, RemoteTarget::Employee, |id| {
            self.employees.fetch_employee(id)
        })
        .await)
    }

    async fn add(
        &self,
        project_id: ProjectId,
        input: MemberInput,
        key: Option<IdempotencyKey>,
    ) -> Result<Created<ProjectMember>, Error> {
        let scope = IdempotencyScope::owned(MutationType::AddProjectMember, project_id.get());
        let request = IdempotencyRequest::keyed(scope, key, &input)?;
        let draft = input.into_draft()?;
        let created = run_idempotent(
            self.idempotency.as_ref(),
            request.as_ref(),
            self.add_to_existing(project_id, draft),
        )
        .await?;
        info!(
            project_id = project_id.get(),
            employee_id = created.record.employee_id.get(),
            replayed = created.replayed,
            "project member added"
        );
        Ok(created)
    }

    async fn add_bulk(
        &self,
        project_id: ProjectId,
        input: BulkMemberInput,
    ) -> Result<BulkAddOutcome, Error> {
        let drafts = input.into_drafts()?;
        self.require_project(project_id).await?;

        // Sequential so duplicates inside one batch are caught by the pair check.
        let mut results = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let employee_id = draft.employee_id;
            let result = match self.insert_checked(project_id, draft).await {
                Ok(member) => MemberOperationResult::added(member),
                Err(err) => {
                    debug!(
                        project_id = project_id.get(),
                        employee_id = employee_id.get(),
                        code = ?err.code(),
                        "bulk member item rejected"
                    );
                    MemberOperationResult::failed(employee_id, &err)
                }
            };
            results.push(result);
        }

        let outcome: BulkAddOutcome = results.into_iter().collect();
        info!(
            project_id = project_id.get(),
            success_count = outcome.success_count,
            error_count = outcome.error_count,
            "bulk member add finished"
        );
        Ok(outcome)
    }

    async fn remove(&self, project_id: ProjectId, employee_id: EmployeeId) -> Result<(), Error> {
        self.require_project(project_id).await?;
        if !self
            .members
            .delete(project_id, employee_id)
            .await
            .map_err(map_error)?
        {
            return Err(not_a_member(project_id, employee_id));
        }
        info!(
            project_id = project_id.get(),
            employee_id = employee_id.get(),
            "project member removed"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "member_service_tests.rs"]
mod tests;
