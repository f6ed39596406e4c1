//! Department record service.
//!
//! Departments are referenced by employees living in another service. Writes
//! only police local uniqueness; deletion asks the employee service whether
//! anything still points at the department.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest, filter_value};
use tracing::info;

use crate::domain::deletion_guard::{DeletionGuard, DependentCount, GuardedOwner};
use crate::domain::ports::{
    DepartmentRecords, DepartmentRepository, DepartmentSummary, EmployeeDirectory,
    EmployeeSummary, IdempotencyStore, RecordRepositoryError, RemoteTarget,
    map_repository_error,
};
use crate::domain::reference::{OnRemoteFailure, degrade_list};
use crate::domain::uniqueness::{Holder, ensure_unique};
use crate::domain::{
    Created, Department, DepartmentDraft, DepartmentFilter, DepartmentId, DepartmentInput,
    DepartmentSortField, Error, IdempotencyKey, IdempotencyRequest, IdempotencyScope, MutationType,
    run_idempotent,
};

const ENTITY: &str = "Department";

/// Department service implementing [`DepartmentRecords`].
#[derive(Clone)]
pub struct DepartmentService<R, E> {
    departments: Arc<R>,
    employees: Arc<E>,
    idempotency: Arc<dyn IdempotencyStore>,
    clock: Arc<dyn Clock>,
    guard: DeletionGuard,
}

impl<R, E> DepartmentService<R, E> {
    /// Create a service that refuses deletion while employee counts are
    /// unavailable.
    pub fn new(
        departments: Arc<R>,
        employees: Arc<E>,
        idempotency: Arc<dyn IdempotencyStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            departments,
            employees,
            idempotency,
            clock,
            guard: DeletionGuard::new(OnRemoteFailure::Block),
        }
    }

    /// Policy applied when the employee count cannot be fetched on delete.
    #[must_use]
    pub fn with_deletion_policy(mut self, policy: OnRemoteFailure) -> Self {
        self.guard = DeletionGuard::new(policy);
        self
    }
}

fn map_error(err: RecordRepositoryError) -> Error {
    map_repository_error(ENTITY, err)
}

fn not_found(id: DepartmentId) -> Error {
    Error::not_found(format!("Department with id {id} not found"))
}

fn holder(department: Option<&Department>, value: impl Fn(&Department) -> &str) -> Option<Holder<'_>> {
    department.map(|existing| Holder {
        id: existing.id.get(),
        value: value(existing),
    })
}

impl<R, E> DepartmentService<R, E>
where
    R: DepartmentRepository,
    E: EmployeeDirectory,
{
    async fn require(&self, id: DepartmentId) -> Result<Department, Error> {
        self.departments
            .find(id)
            .await
            .map_err(map_error)?
            .ok_or_else(|| not_found(id))
    }

    async fn ensure_name_free(&self, name: &str, owner: Option<DepartmentId>) -> Result<(), Error> {
        let existing = self
            .departments
            .find_by_name(name)
            .await
            .map_err(map_error)?;
        ensure_unique(
            ENTITY,
            "name",
            holder(existing.as_ref(), |department| &department.name),
            owner.map(DepartmentId::get),
        )
    }

    async fn ensure_code_free(&self, code: &str, owner: Option<DepartmentId>) -> Result<(), Error> {
        let existing = self
            .departments
            .find_by_code(code)
            .await
            .map_err(map_error)?;
        ensure_unique(
            ENTITY,
            "code",
            holder(existing.as_ref(), |department| &department.code),
            owner.map(DepartmentId::get),
        )
    }

    async fn insert_checked(&self, draft: DepartmentDraft) -> Result<Department, Error> {
        self.ensure_name_free(&draft.name, None).await?;
        self.ensure_code_free(&draft.code, None).await?;
        self.departments
            .insert(draft, self.clock.utc())
            .await
            .map_err(map_error)
    }

    async fn store(&self, department: Department) -> Result<Department, Error> {
        let id = department.id;
        self.departments
            .update(department)
            .await
            .map_err(map_error)?
            .ok_or_else(|| not_found(id))
    }
}

#[async_trait]
impl<R, E> DepartmentRecords for DepartmentService<R, E>
where
    R: DepartmentRepository,
    E: EmployeeDirectory,
{
    async fn list(
        &self,
        filter: DepartmentFilter,
        request: PageRequest<DepartmentSortField>,
    ) -> Result<Page<Department>, Error> {
        self.departments
            .list(filter, request)
            .await
            .map_err(map_error)
    }

    async fn search(
        &self,
        query: String,
        request: PageRequest<DepartmentSortField>,
    ) -> Result<Page<Department>, Error> {
        let needle =
            filter_value(Some(query)).ok_or_else(|| Error::invalid_field("q", "must not be blank"))?;
        self.list(DepartmentFilter::search(needle), request).await
    }

    async fn get(&self, id: DepartmentId) -> Result<Department, Error> {
        self.require(id).await
    }

    async fn get_by_code(&self, code: String) -> Result<Department, Error> {
        self.departments
            .find_by_code(&code)
            .await
            .map_err(map_error)?
            .ok_or_else(|| Error::not_found(format!("Department with code {code} not found")))
    }

    async fn employees(&self, id: DepartmentId) -> Result<Vec<EmployeeSummary>, Error> {
        self.require(id).await?;
        Ok(degrade_list(
            self.employees.employees_in_department(id).await,
            RemoteTarget::Employee,
            "employees_in_department",
        ))
    }

    async fn create(
        &self,
        input: DepartmentInput,
        key: Option<IdempotencyKey>,
    ) -> Result<Created<Department>, Error> {
        let scope = IdempotencyScope::global(MutationType::CreateDepartment);
        let request = IdempotencyRequest::keyed(scope, key, &input)?;
        let draft = input.into_draft()?;
        let created = run_idempotent(
            self.idempotency.as_ref(),
            request.as_ref(),
            self.insert_checked(draft),
        )
        .await?;
        info!(
            department_id = created.record.id.get(),
            replayed = created.replayed,
            "department created"
        );
        Ok(created)
    }

    async fn update(&self, id: DepartmentId, input: DepartmentInput) -> Result<Department, Error> {
        let draft = input.into_draft()?;
        let mut department = self.require(id).await?;
        self.ensure_name_free(&draft.name, Some(id)).await?;
        self.ensure_code_free(&draft.code, Some(id)).await?;
        department.replace_with(draft, self.clock.utc());
        self.store(department).await
    }

    async fn patch(&self, id: DepartmentId, input: DepartmentInput) -> Result<Department, Error> {
        let changes = input.into_changes()?;
        let mut department = self.require(id).await?;
        if let Some(name) = changes.name.as_deref() {
            self.ensure_name_free(name, Some(id)).await?;
        }
        if let Some(code) = changes.code.as_deref() {
            self.ensure_code_free(code, Some(id)).await?;
        }
        department.apply(changes, self.clock.utc());
        self.store(department).await
    }

    async fn delete(&self, id: DepartmentId) -> Result<(), Error> {
        let owner = GuardedOwner {
            entity: ENTITY,
            id: id.get(),
            dependents: "employees",
        };
        let exists = async {
            Ok::<_, Error>(self
                .departments
                .find(id)
                .await
                .map_err(map_error)?
                .is_some())
        };
        let count = async {
            Ok::<_, Error>(DependentCount::from(
                self.employees.count_by_department(id).await,
            ))
        };
        self.guard.assert_deletable(owner, exists, count).await?;

        if !self.departments.delete(id).await.map_err(map_error)? {
            return Err(not_found(id));
        }
        info!(department_id = id.get(), "department deleted");
        Ok(())
    }

    async fn by_ids(&self, ids: Vec<DepartmentId>) -> Result<Vec<DepartmentSummary>, Error> {
        let departments = self
            .departments
            .find_by_ids(ids)
            .await
            .map_err(map_error)?;
        Ok(departments.iter().map(Department::summary).collect())
    }

    async fn exists(&self, id: DepartmentId) -> Result<bool, Error> {
        Ok(self.departments.find(id).await.map_err(map_error)?.is_some())
    }
}

#[cfg(test)]
#[path = "department_service_tests.rs"]
mod tests;
