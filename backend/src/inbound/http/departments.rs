//! Department service HTTP handlers.
//!
//! ```text
//! GET    /api/v1/departments?name=eng&code=ENG
//! GET    /api/v1/departments/search?q=platform
//! GET    /api/v1/departments/by-code/{code}
//! GET    /api/v1/departments/by-ids?ids=1,2,3
//! GET    /api/v1/departments/{id}/exists
//! GET    /api/v1/departments/{id}/employees
//! GET    /api/v1/departments/{id}
//! POST   /api/v1/departments
//! PUT    /api/v1/departments/{id}
//! PATCH  /api/v1/departments/{id}
//! DELETE /api/v1/departments/{id}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use pagination::{Page, filter_value};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::ports::{DepartmentSummary, EmployeeSummary};
use crate::domain::{
    Department, DepartmentFilter, DepartmentId, DepartmentInput, DepartmentSortField,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::idempotency::{created_response, idempotency_key};
use crate::inbound::http::schemas::{DepartmentPage, ProblemSchema};
use crate::inbound::http::state::DepartmentState;
use crate::inbound::http::validation::{IdsQuery, PageQuery, SearchQuery};

/// Filters accepted by the department list.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DepartmentListQuery {
    /// Name contains, case-insensitive.
    pub name: Option<String>,
    /// Code contains, case-insensitive.
    pub code: Option<String>,
}

impl From<DepartmentListQuery> for DepartmentFilter {
    fn from(query: DepartmentListQuery) -> Self {
        Self {
            name: filter_value(query.name),
            code: filter_value(query.code),
            query: None,
        }
    }
}

/// Register the department endpoints; fixed paths precede `/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_departments)
        .service(search_departments)
        .service(department_by_code)
        .service(departments_by_ids)
        .service(department_exists)
        .service(department_employees)
        .service(get_department)
        .service(create_department)
        .service(update_department)
        .service(patch_department)
        .service(delete_department);
}

/// List departments.
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    params(PageQuery, DepartmentListQuery),
    responses(
        (status = 200, description = "One page of departments", body = DepartmentPage),
        (status = 400, description = "Invalid paging", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["departments"],
    operation_id = "listDepartments"
)]
#[get("/departments")]
pub async fn list_departments(
    state: web::Data<DepartmentState>,
    page: web::Query<PageQuery>,
    filter: web::Query<DepartmentListQuery>,
) -> ApiResult<web::Json<Page<Department>>> {
    let request = page.page_request::<DepartmentSortField>(state.limits)?;
    let found = state
        .records
        .list(filter.into_inner().into(), request)
        .await?;
    Ok(web::Json(found))
}

/// Search name, code and description.
#[utoipa::path(
    get,
    path = "/api/v1/departments/search",
    params(SearchQuery, PageQuery),
    responses(
        (status = 200, description = "Matching departments", body = DepartmentPage),
        (status = 400, description = "Blank query", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["departments"],
    operation_id = "searchDepartments"
)]
#[get("/departments/search")]
pub async fn search_departments(
    state: web::Data<DepartmentState>,
    search: web::Query<SearchQuery>,
    page: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<Department>>> {
    let text = search.text()?;
    let request = page.page_request::<DepartmentSortField>(state.limits)?;
    Ok(web::Json(state.records.search(text, request).await?))
}

/// Fetch a department by code, ignoring case.
#[utoipa::path(
    get,
    path = "/api/v1/departments/by-code/{code}",
    params(("code" = String, Path, description = "Department code")),
    responses(
        (status = 200, description = "Department", body = Department),
        (status = 404, description = "Unknown code", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["departments"],
    operation_id = "getDepartmentByCode"
)]
#[get("/departments/by-code/{code}")]
pub async fn department_by_code(
    state: web::Data<DepartmentState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Department>> {
    Ok(web::Json(
        state.records.get_by_code(path.into_inner()).await?,
    ))
}

/// Batch lookup for the employee service; unknown identities are skipped.
#[utoipa::path(
    get,
    path = "/api/v1/departments/by-ids",
    params(IdsQuery),
    responses(
        (status = 200, description = "Department summaries", body = [DepartmentSummary]),
        (status = 400, description = "Malformed id list", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["departments"],
    operation_id = "departmentsByIds"
)]
#[get("/departments/by-ids")]
pub async fn departments_by_ids(
    state: web::Data<DepartmentState>,
    ids: web::Query<IdsQuery>,
) -> ApiResult<web::Json<Vec<DepartmentSummary>>> {
    let ids = ids.parse::<DepartmentId>()?;
    Ok(web::Json(state.records.by_ids(ids).await?))
}

/// Whether a department exists.
#[utoipa::path(
    get,
    path = "/api/v1/departments/{id}/exists",
    params(("id" = i64, Path, description = "Department identity")),
    responses((status = 200, description = "Existence flag", body = bool)),
    tags = ["departments"],
    operation_id = "departmentExists"
)]
#[get("/departments/{id}/exists")]
pub async fn department_exists(
    state: web::Data<DepartmentState>,
    path: web::Path<DepartmentId>,
) -> ApiResult<web::Json<bool>> {
    Ok(web::Json(state.records.exists(path.into_inner()).await?))
}

/// Employees of a department, empty when the employee service is down.
#[utoipa::path(
    get,
    path = "/api/v1/departments/{id}/employees",
    params(("id" = i64, Path, description = "Department identity")),
    responses(
        (status = 200, description = "Employee summaries", body = [EmployeeSummary]),
        (status = 404, description = "Unknown department", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["departments"],
    operation_id = "departmentEmployees"
)]
#[get("/departments/{id}/employees")]
pub async fn department_employees(
    state: web::Data<DepartmentState>,
    path: web::Path<DepartmentId>,
) -> ApiResult<web::Json<Vec<EmployeeSummary>>> {
    Ok(web::Json(state.records.employees(path.into_inner()).await?))
}

/// Fetch one department.
#[utoipa::path(
    get,
    path = "/api/v1/departments/{id}",
    params(("id" = i64, Path, description = "Department identity")),
    responses(
        (status = 200, description = "Department", body = Department),
        (status = 404, description = "Unknown department", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["departments"],
    operation_id = "getDepartment"
)]
#[get("/departments/{id}")]
pub async fn get_department(
    state: web::Data<DepartmentState>,
    path: web::Path<DepartmentId>,
) -> ApiResult<web::Json<Department>> {
    Ok(web::Json(state.records.get(path.into_inner()).await?))
}

/// Create a department; retries with the same `Idempotency-Key` replay it.
#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = DepartmentInput,
    params(("Idempotency-Key" = Option<String>, Header, description = "Opaque retry token")),
    responses(
        (status = 201, description = "Department created", body = Department,
            headers(("Idempotent-Replayed" = String, description = "`true` when replayed"))),
        (status = 400, description = "Invalid body", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 409, description = "Name or code already used", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["departments"],
    operation_id = "createDepartment"
)]
#[post("/departments")]
pub async fn create_department(
    state: web::Data<DepartmentState>,
    request: HttpRequest,
    payload: web::Json<DepartmentInput>,
) -> ApiResult<HttpResponse> {
    let key = idempotency_key(request.headers())?;
    let created = state.records.create(payload.into_inner(), key).await?;
    let location = format!("/api/v1/departments/{}", created.record.id);
    Ok(created_response(created, location))
}

/// Replace a department.
#[utoipa::path(
    put,
    path = "/api/v1/departments/{id}",
    params(("id" = i64, Path, description = "Department identity")),
    request_body = DepartmentInput,
    responses(
        (status = 200, description = "Department updated", body = Department),
        (status = 400, description = "Invalid body", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 404, description = "Unknown department", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 409, description = "Name or code already used", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["departments"],
    operation_id = "updateDepartment"
)]
#[put("/departments/{id}")]
pub async fn update_department(
    state: web::Data<DepartmentState>,
    path: web::Path<DepartmentId>,
    payload: web::Json<DepartmentInput>,
) -> ApiResult<web::Json<Department>> {
    let updated = state
        .records
        .update(path.into_inner(), payload.into_inner())
        .await?;
    Ok(web::Json(updated))
}

/// Change only the fields present in the body.
#[utoipa::path(
    patch,
    path = "/api/v1/departments/{id}",
    params(("id" = i64, Path, description = "Department identity")),
    request_body = DepartmentInput,
    responses(
        (status = 200, description = "Department updated", body = Department),
        (status = 404, description = "Unknown department", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 409, description = "Name or code already used", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["departments"],
    operation_id = "patchDepartment"
)]
#[patch("/departments/{id}")]
pub async fn patch_department(
    state: web::Data<DepartmentState>,
    path: web::Path<DepartmentId>,
    payload: web::Json<DepartmentInput>,
) -> ApiResult<web::Json<Department>> {
    let patched = state
        .records
        .patch(path.into_inner(), payload.into_inner())
        .await?;
    Ok(web::Json(patched))
}

/// Delete a department unless employees still reference it.
#[utoipa::path(
    delete,
    path = "/api/v1/departments/{id}",
    params(("id" = i64, Path, description = "Department identity")),
    responses(
        (status = 204, description = "Department deleted"),
        (status = 404, description = "Unknown department", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 409, description = "Employees still reference the department",
            body = ProblemSchema, content_type = "application/problem+json"),
        (status = 503, description = "Employee service unavailable", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["departments"],
    operation_id = "deleteDepartment"
)]
#[delete("/departments/{id}")]
pub async fn delete_department(
    state: web::Data<DepartmentState>,
    path: web::Path<DepartmentId>,
) -> ApiResult<HttpResponse> {
    state.records.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "departments_tests.rs"]
mod tests;
