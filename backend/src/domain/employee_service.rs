//! Employee record service.
//!
//! Writes follow one order: shape, email uniqueness, remote department
//! existence, then the write itself. Reads attach department detail best
//! effort and never fail because the department service is unavailable.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest, filter_value};
use tracing::info;

use crate::domain::enrichment::{enrich_batch, enrich_one};
use crate::domain::ports::{
    DepartmentDirectory, EmployeeRecords, EmployeeRepository, EmployeeSummary, IdempotencyStore,
    RecordRepositoryError, RemoteTarget, map_repository_error,
};
use crate::domain::reference::{OnRemoteFailure, require_reference};
use crate::domain::uniqueness::{Holder, ensure_unique};
use crate::domain::{
    Created, DepartmentId, Employee, EmployeeDraft, EmployeeFilter, EmployeeId, EmployeeInput,
    EmployeeSortField, EmployeeStats, EmployeeView, Error, IdempotencyKey, IdempotencyRequest,
    IdempotencyScope, MutationType, run_idempotent,
};

const ENTITY: &str = "Employee";

/// Employee service implementing [`EmployeeRecords`].
#[derive(Clone)]
pub struct EmployeeService<R, D> {
    employees: Arc<R>,
    departments: Arc<D>,
    idempotency: Arc<dyn IdempotencyStore>,
    clock: Arc<dyn Clock>,
    reference_policy: OnRemoteFailure,
}

impl<R, D> EmployeeService<R, D> {
    /// Create a service; department references fail closed by default.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use staffing::domain::EmployeeService;
    /// # use staffing::domain::ports::{FixtureDepartmentDirectory, FixtureIdempotencyStore};
    /// # use staffing::outbound::persistence::MemoryEmployeeRepository;
    /// let service = EmployeeService::new(
    ///     Arc::new(MemoryEmployeeRepository::default()),
    ///     Arc::new(FixtureDepartmentDirectory),
    ///     Arc::new(FixtureIdempotencyStore),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(
        employees: Arc<R>,
        departments: Arc<D>,
        idempotency: Arc<dyn IdempotencyStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            employees,
            departments,
            idempotency,
            clock,
            reference_policy: OnRemoteFailure::TreatAsAbsent,
        }
    }

    /// Policy for department existence checks when the peer cannot answer.
    #[must_use]
    pub fn with_reference_policy(mut self, policy: OnRemoteFailure) -> Self {
        self.reference_policy = policy;
        self
    }
}

fn map_error(err: RecordRepositoryError) -> Error {
    map_repository_error(ENTITY, err)
}

fn not_found(id: EmployeeId) -> Error {
    Error::not_found(format!("Employee with id {id} not found"))
}

impl<R, D> EmployeeService<R, D>
where
    R: EmployeeRepository,
    D: DepartmentDirectory,
{
    async fn require(&self, id: EmployeeId) -> Result<Employee, Error> {
        self.employees
            .find(id)
            .await
            .map_err(map_error)?
            .ok_or_else(|| not_found(id))
    }

    async fn ensure_email_free(&self, email: &str, owner: Option<EmployeeId>) -> Result<(), Error> {
        let holder = self.employees.find_by_email(email).await.map_err(map_error)?;
        ensure_unique(
            ENTITY,
            "email",
            holder.as_ref().map(|existing| Holder {
                id: existing.id.get(),
                value: &existing.email,
            }),
            owner.map(EmployeeId::get),
        )
    }

    async fn ensure_department(&self, id: DepartmentId) -> Result<(), Error> {
        require_reference(
            self.departments.department_exists(id).await,
            self.reference_policy,
            RemoteTarget::Department,
            id.get(),
        )
    }

    /// Check a reference only when it is being set or moved.
    async fn ensure_department_change(
        &self,
        current: Option<DepartmentId>,
        next: Option<DepartmentId>,
    ) -> Result<(), Error> {
        match next {
            Some(id) if current != Some(id) => self.ensure_department(id).await,
            _ => Ok(()),
        }
    }

    async fn insert_checked(&self, draft: EmployeeDraft) -> Result<Employee, Error> {
        self.ensure_email_free(&draft.email, None).await?;
        if let Some(department_id) = draft.department_id {
            self.ensure_department(department_id).await?;
        }
        self.employees
            .insert(draft, self.clock.utc())
            .await
            .map_err(map_error)
    }

    async fn store(&self, employee: Employee) -> Result<Employee, Error> {
        let id = employee.id;
        self.employees
            .update(employee)
            .await
            .map_err(map_error)?
            .ok_or_else(|| not_found(id))
    }

    async fn enrich_page(&self, mut page: Page<Employee>) -> Page<EmployeeView> {
        let rows = std::mem::take(&mut page.content);
        let views = enrich_batch(rows, RemoteTarget::Department, |ids| {
            self.departments.fetch_departments(ids)
        })
        .await;
        page.with_content(views)
    }
}

#[async_trait]
impl<R, D> EmployeeRecords for EmployeeService<R, D>
where
    R: EmployeeRepository,
    D: DepartmentDirectory,
{
    async fn list(
        &self,
        filter: EmployeeFilter,
        request: PageRequest<EmployeeSortField>,
    ) -> Result<Page<EmployeeView>, Error> {
        let page = self
            .employees
            .list(filter, request)
            .await
            .map_err(map_error)?;
        Ok(self.enrich_page(page).await)
    }

    async fn search(
        &self,
        query: String,
        request: PageRequest<EmployeeSortField>,
    ) -> Result<Page<Employee>, Error> {
        let needle =
            filter_value(Some(query)).ok_or_else(|| Error::invalid_field("q", "must not be blank"))?;
        self.employees
            .list(EmployeeFilter::search(needle), request)
            .await
            .map_err(map_error)
    }

    async fn get(&self, id: EmployeeId, enrich: bool) -> Result<EmployeeView, Error> {
        let employee = self.require(id).await?;
        if !enrich {
            return Ok(EmployeeView::bare(employee));
        }
        Ok(enrich_one(employee, RemoteTarget::Department, |department_id| {
            self.departments.fetch_department(department_id)
        })
        .await)
    }

    async fn create(
        &self,
        input: EmployeeInput,
        key: Option<IdempotencyKey>,
    ) -> Result<Created<Employee>, Error> {
        let scope = IdempotencyScope::global(MutationType::CreateEmployee);
        let request = IdempotencyRequest::keyed(scope, key, &input)?;
        let draft = input.into_draft()?;
        let created = run_idempotent(
            self.idempotency.as_ref(),
            request.as_ref(),
            self.insert_checked(draft),
        )
        .await?;
        info!(
            employee_id = created.record.id.get(),
            replayed = created.replayed,
            "employee created"
        );
        Ok(created)
    }

    async fn update(&self, id: EmployeeId, input: EmployeeInput) -> Result<Employee, Error> {
        let draft = input.into_draft()?;
        let mut employee = self.require(id).await?;
        self.ensure_email_free(&draft.email, Some(id)).await?;
        self.ensure_department_change(employee.department_id, draft.department_id)
            .await?;
        employee.replace_with(draft, self.clock.utc());
        self.store(employee).await
    }

    async fn patch(&self, id: EmployeeId, input: EmployeeInput) -> Result<Employee, Error> {
        let changes = input.into_changes()?;
        let mut employee = self.require(id).await?;
        if let Some(email) = changes.email.as_deref() {
            self.ensure_email_free(email, Some(id)).await?;
        }
        self.ensure_department_change(employee.department_id, changes.department_id)
            .await?;
        employee.apply(changes, self.clock.utc());
        self.store(employee).await
    }

    async fn delete(&self, id: EmployeeId) -> Result<(), Error> {
        if !self.employees.delete(id).await.map_err(map_error)? {
            return Err(not_found(id));
        }
        info!(employee_id = id.get(), "employee deleted");
        Ok(())
    }

    async fn stats(&self) -> Result<EmployeeStats, Error> {
        let counts = self.employees.head_counts().await.map_err(map_error)?;
        let total_employees = counts.iter().map(|count| count.count).sum();
        let counts_by_department = enrich_batch(counts, RemoteTarget::Department, |ids| {
            self.departments.fetch_departments(ids)
        })
        .await;
        Ok(EmployeeStats {
            total_employees,
            counts_by_department,
        })
    }

    async fn by_department(&self, id: DepartmentId) -> Result<Vec<EmployeeSummary>, Error> {
        let employees = self
            .employees
            .find_by_department(id)
            .await
            .map_err(map_error)?;
        Ok(employees.iter().map(Employee::summary).collect())
    }

    async fn count_by_department(&self, id: DepartmentId) -> Result<u64, Error> {
        self.employees
            .count_by_department(id)
            .await
            .map_err(map_error)
    }

    async fn by_ids(&self, ids: Vec<EmployeeId>) -> Result<Vec<EmployeeSummary>, Error> {
        let employees = self.employees.find_by_ids(ids).await.map_err(map_error)?;
        Ok(employees.iter().map(Employee::summary).collect())
    }

    async fn exists(&self, id: EmployeeId) -> Result<bool, Error> {
        Ok(self.employees.find(id).await.map_err(map_error)?.is_some())
    }
}

#[cfg(test)]
#[path = "employee_service_tests.rs"]
mod tests;
