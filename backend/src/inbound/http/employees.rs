//! Employee service HTTP handlers.
//!
//! ```text
//! GET    /api/v1/employees?page=0&size=20&sort=lastName,asc&departmentId=3
//! GET    /api/v1/employees/search?q=ada
//! GET    /api/v1/employees/stats
//! GET    /api/v1/employees/by-department/{departmentId}
//! GET    /api/v1/employees/count-by-department/{departmentId}
//! GET    /api/v1/employees/by-ids?ids=1,2,3
//! GET    /api/v1/employees/{id}/exists
//! GET    /api/v1/employees/{id}?enrich=true
//! POST   /api/v1/employees
//! PUT    /api/v1/employees/{id}
//! PATCH  /api/v1/employees/{id}
//! DELETE /api/v1/employees/{id}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use pagination::{Page, filter_value};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::ports::EmployeeSummary;
use crate::domain::{
    DepartmentId, Employee, EmployeeFilter, EmployeeId, EmployeeInput, EmployeeSortField,
    EmployeeStats, EmployeeView,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::idempotency::{created_response, idempotency_key};
use crate::inbound::http::schemas::{EmployeePage, ProblemSchema};
use crate::inbound::http::state::EmployeeState;
use crate::inbound::http::validation::{EnrichQuery, IdsQuery, PageQuery, SearchQuery};

/// Filters accepted by the employee list.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeListQuery {
    /// Email contains, case-insensitive.
    pub email: Option<String>,
    /// Last name contains, case-insensitive.
    pub last_name: Option<String>,
    /// Exact department reference.
    pub department_id: Option<i64>,
}

impl From<EmployeeListQuery> for EmployeeFilter {
    fn from(query: EmployeeListQuery) -> Self {
        Self {
            email: filter_value(query.email),
            last_name: filter_value(query.last_name),
            department_id: query.department_id.map(DepartmentId::new),
            query: None,
        }
    }
}

/// Register the employee endpoints; fixed paths precede `/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_employees)
        .service(search_employees)
        .service(employee_stats)
        .service(employees_by_department)
        .service(count_employees_by_department)
        .service(employees_by_ids)
        .service(employee_exists)
        .service(get_employee)
        .service(create_employee)
        .service(update_employee)
        .service(patch_employee)
        .service(delete_employee);
}

/// List employees with department detail attached best effort.
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(PageQuery, EmployeeListQuery),
    responses(
        (status = 200, description = "One page of employees", body = EmployeePage),
        (status = 400, description = "Invalid paging or filter", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["employees"],
    operation_id = "listEmployees"
)]
#[get("/employees")]
pub async fn list_employees(
    state: web::Data<EmployeeState>,
    page: web::Query<PageQuery>,
    filter: web::Query<EmployeeListQuery>,
) -> ApiResult<web::Json<Page<EmployeeView>>> {
    let request = page.page_request::<EmployeeSortField>(state.limits)?;
    let found = state
        .records
        .list(filter.into_inner().into(), request)
        .await?;
    Ok(web::Json(found))
}

/// Search first name, last name and email.
#[utoipa::path(
    get,
    path = "/api/v1/employees/search",
    params(SearchQuery, PageQuery),
    responses(
        (status = 200, description = "Matching employees", body = EmployeePage),
        (status = 400, description = "Blank query", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["employees"],
    operation_id = "searchEmployees"
)]
#[get("/employees/search")]
pub async fn search_employees(
    state: web::Data<EmployeeState>,
    search: web::Query<SearchQuery>,
    page: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<Employee>>> {
    let text = search.text()?;
    let request = page.page_request::<EmployeeSortField>(state.limits)?;
    Ok(web::Json(state.records.search(text, request).await?))
}

/// Head counts overall and per department.
#[utoipa::path(
    get,
    path = "/api/v1/employees/stats",
    responses((status = 200, description = "Head counts", body = EmployeeStats)),
    tags = ["employees"],
    operation_id = "employeeStats"
)]
#[get("/employees/stats")]
pub async fn employee_stats(state: web::Data<EmployeeState>) -> ApiResult<web::Json<EmployeeStats>> {
    Ok(web::Json(state.records.stats().await?))
}

/// Employees referencing a department; called by the department service.
#[utoipa::path(
    get,
    path = "/api/v1/employees/by-department/{departmentId}",
    params(("departmentId" = i64, Path, description = "Department identity")),
    responses((status = 200, description = "Employee summaries", body = [EmployeeSummary])),
    tags = ["employees"],
    operation_id = "employeesByDepartment"
)]
#[get("/employees/by-department/{department_id}")]
pub async fn employees_by_department(
    state: web::Data<EmployeeState>,
    path: web::Path<DepartmentId>,
) -> ApiResult<web::Json<Vec<EmployeeSummary>>> {
    Ok(web::Json(
        state.records.by_department(path.into_inner()).await?,
    ))
}

/// Number of employees referencing a department.
#[utoipa::path(
    get,
    path = "/api/v1/employees/count-by-department/{departmentId}",
    params(("departmentId" = i64, Path, description = "Department identity")),
    responses((status = 200, description = "Dependent count", body = u64)),
    tags = ["employees"],
    operation_id = "countEmployeesByDepartment"
)]
#[get("/employees/count-by-department/{department_id}")]
pub async fn count_employees_by_department(
    state: web::Data<EmployeeState>,
    path: web::Path<DepartmentId>,
) -> ApiResult<web::Json<u64>> {
    Ok(web::Json(
        state.records.count_by_department(path.into_inner()).await?,
    ))
}

/// Batch lookup; unknown identities are skipped.
#[utoipa::path(
    get,
    path = "/api/v1/employees/by-ids",
    params(IdsQuery),
    responses(
        (status = 200, description = "Employee summaries", body = [EmployeeSummary]),
        (status = 400, description = "Malformed id list", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["employees"],
    operation_id = "employeesByIds"
)]
#[get("/employees/by-ids")]
pub async fn employees_by_ids(
    state: web::Data<EmployeeState>,
    ids: web::Query<IdsQuery>,
) -> ApiResult<web::Json<Vec<EmployeeSummary>>> {
    let ids = ids.parse::<EmployeeId>()?;
    Ok(web::Json(state.records.by_ids(ids).await?))
}

/// Whether an employee exists.
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}/exists",
    params(("id" = i64, Path, description = "Employee identity")),
    responses((status = 200, description = "Existence flag", body = bool)),
    tags = ["employees"],
    operation_id = "employeeExists"
)]
#[get("/employees/{id}/exists")]
pub async fn employee_exists(
    state: web::Data<EmployeeState>,
    path: web::Path<EmployeeId>,
) -> ApiResult<web::Json<bool>> {
    Ok(web::Json(state.records.exists(path.into_inner()).await?))
}

/// Fetch one employee; department detail is attached unless `enrich=false`.
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    params(("id" = i64, Path, description = "Employee identity"), EnrichQuery),
    responses(
        (status = 200, description = "Employee", body = EmployeeView),
        (status = 404, description = "Unknown employee", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["employees"],
    operation_id = "getEmployee"
)]
#[get("/employees/{id}")]
pub async fn get_employee(
    state: web::Data<EmployeeState>,
    path: web::Path<EmployeeId>,
    query: web::Query<EnrichQuery>,
) -> ApiResult<web::Json<EmployeeView>> {
    let enrich = query.enrich.unwrap_or(true);
    Ok(web::Json(state.records.get(path.into_inner(), enrich).await?))
}

/// Create an employee; retries with the same `Idempotency-Key` replay it.
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = EmployeeInput,
    params(("Idempotency-Key" = Option<String>, Header, description = "Opaque retry token")),
    responses(
        (status = 201, description = "Employee created", body = Employee,
            headers(("Idempotent-Replayed" = String, description = "`true` when replayed"))),
        (status = 400, description = "Invalid body", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 409, description = "Email already used", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 422, description = "Department does not exist", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 503, description = "Department service unavailable", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["employees"],
    operation_id = "createEmployee"
)]
#[post("/employees")]
pub async fn create_employee(
    state: web::Data<EmployeeState>,
    request: HttpRequest,
    payload: web::Json<EmployeeInput>,
) -> ApiResult<HttpResponse> {
    let key = idempotency_key(request.headers())?;
    let created = state.records.create(payload.into_inner(), key).await?;
    let location = format!("/api/v1/employees/{}", created.record.id);
    Ok(created_response(created, location))
}

/// Replace an employee.
#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}",
    params(("id" = i64, Path, description = "Employee identity")),
    request_body = EmployeeInput,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Invalid body", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 404, description = "Unknown employee", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 409, description = "Email already used", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 422, description = "Department does not exist", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["employees"],
    operation_id = "updateEmployee"
)]
#[put("/employees/{id}")]
pub async fn update_employee(
    state: web::Data<EmployeeState>,
    path: web::Path<EmployeeId>,
    payload: web::Json<EmployeeInput>,
) -> ApiResult<web::Json<Employee>> {
    let updated = state
        .records
        .update(path.into_inner(), payload.into_inner())
        .await?;
    Ok(web::Json(updated))
}

/// Change only the fields present in the body.
#[utoipa::path(
    patch,
    path = "/api/v1/employees/{id}",
    params(("id" = i64, Path, description = "Employee identity")),
    request_body = EmployeeInput,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 404, description = "Unknown employee", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 409, description = "Email already used", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["employees"],
    operation_id = "patchEmployee"
)]
#[patch("/employees/{id}")]
pub async fn patch_employee(
    state: web::Data<EmployeeState>,
    path: web::Path<EmployeeId>,
    payload: web::Json<EmployeeInput>,
) -> ApiResult<web::Json<Employee>> {
    let patched = state
        .records
        .patch(path.into_inner(), payload.into_inner())
        .await?;
    Ok(web::Json(patched))
}

/// Delete an employee.
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    params(("id" = i64, Path, description = "Employee identity")),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Unknown employee", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["employees"],
    operation_id = "deleteEmployee"
)]
#[delete("/employees/{id}")]
pub async fn delete_employee(
    state: web::Data<EmployeeState>,
    path: web::Path<EmployeeId>,
) -> ApiResult<HttpResponse> {
    state.records.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "employees_tests.rs"]
mod tests;
