//! Project service HTTP handlers.
//!
//! ```text
//! GET    /api/v1/projects?status=ACTIVE&from=2024-01-01&to=2024-12-31
//! GET    /api/v1/projects/stats?groupBy=month
//! GET    /api/v1/projects/by-code/{code}
//! GET    /api/v1/projects/{id}
//! POST   /api/v1/projects
//! PUT    /api/v1/projects/{id}
//! PATCH  /api/v1/projects/{id}
//! DELETE /api/v1/projects/{id}
//! ```
//!
//! Membership endpoints live in [`super::members`].

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use pagination::{Page, filter_value};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{
    Error, ProjectFilter, ProjectId, ProjectInput, ProjectSortField, ProjectStats, ProjectStatus,
    ProjectView, StatsGrouping,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::idempotency::{created_response, idempotency_key};
use crate::inbound::http::schemas::{ProblemSchema, ProjectPage};
use crate::inbound::http::state::ProjectState;
use crate::inbound::http::validation::{PageQuery, parse_date};

/// Filters accepted by the project list.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectListQuery {
    /// Exact lifecycle status, e.g. `ACTIVE`.
    pub status: Option<String>,
    /// Start date on or after, `YYYY-MM-DD`.
    pub from: Option<String>,
    /// End date on or before, `YYYY-MM-DD`; open-ended projects never match.
    pub to: Option<String>,
    /// Code contains, case-insensitive.
    pub code: Option<String>,
    /// Name contains, case-insensitive.
    pub name: Option<String>,
}

impl TryFrom<ProjectListQuery> for ProjectFilter {
    type Error = Error;

    fn try_from(query: ProjectListQuery) -> Result<Self, Self::Error> {
        let status = filter_value(query.status)
            .map(|raw| raw.parse::<ProjectStatus>())
            .transpose()?;
        Ok(Self {
            status,
            from: parse_date("from", query.from.as_deref())?,
            to: parse_date("to", query.to.as_deref())?,
            code: filter_value(query.code),
            name: filter_value(query.name),
        })
    }
}

/// `groupBy` parameter of the statistics endpoint.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    /// `status` (default) or `month`.
    pub group_by: Option<String>,
}

/// Register the project endpoints; fixed paths precede `/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_projects)
        .service(project_stats)
        .service(project_by_code)
        .service(get_project)
        .service(create_project)
        .service(update_project)
        .service(patch_project)
        .service(delete_project);
}

/// List projects.
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    params(PageQuery, ProjectListQuery),
    responses(
        (status = 200, description = "One page of projects", body = ProjectPage),
        (status = 400, description = "Invalid paging or filter", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["projects"],
    operation_id = "listProjects"
)]
#[get("/projects")]
pub async fn list_projects(
    state: web::Data<ProjectState>,
    page: web::Query<PageQuery>,
    filter: web::Query<ProjectListQuery>,
) -> ApiResult<web::Json<Page<ProjectView>>> {
    let request = page.page_request::<ProjectSortField>(state.limits)?;
    let filter = ProjectFilter::try_from(filter.into_inner())?;
    Ok(web::Json(state.projects.list(filter, request).await?))
}

/// Project counts by status and, on request, by start month.
#[utoipa::path(
    get,
    path = "/api/v1/projects/stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Project counts", body = ProjectStats),
        (status = 400, description = "Unknown grouping", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["projects"],
    operation_id = "projectStats"
)]
#[get("/projects/stats")]
pub async fn project_stats(
    state: web::Data<ProjectState>,
    query: web::Query<StatsQuery>,
) -> ApiResult<web::Json<ProjectStats>> {
    let grouping = StatsGrouping::parse(query.group_by.as_deref())?;
    Ok(web::Json(state.projects.stats(grouping).await?))
}

/// Fetch a project by code, ignoring case.
#[utoipa::path(
    get,
    path = "/api/v1/projects/by-code/{code}",
    params(("code" = String, Path, description = "Project code")),
    responses(
        (status = 200, description = "Project with members", body = ProjectView),
        (status = 404, description = "Unknown code", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["projects"],
    operation_id = "getProjectByCode"
)]
#[get("/projects/by-code/{code}")]
pub async fn project_by_code(
    state: web::Data<ProjectState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProjectView>> {
    Ok(web::Json(
        state.projects.get_by_code(path.into_inner()).await?,
    ))
}

/// Fetch one project with its members.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    params(("id" = i64, Path, description = "Project identity")),
    responses(
        (status = 200, description = "Project with members", body = ProjectView),
        (status = 404, description = "Unknown project", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["projects"],
    operation_id = "getProject"
)]
#[get("/projects/{id}")]
pub async fn get_project(
    state: web::Data<ProjectState>,
    path: web::Path<ProjectId>,
) -> ApiResult<web::Json<ProjectView>> {
    Ok(web::Json(state.projects.get(path.into_inner()).await?))
}

/// Create a project; retries with the same `Idempotency-Key` replay it.
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = ProjectInput,
    params(("Idempotency-Key" = Option<String>, Header, description = "Opaque retry token")),
    responses(
        (status = 201, description = "Project created", body = ProjectView,
            headers(("Idempotent-Replayed" = String, description = "`true` when replayed"))),
        (status = 400, description = "Invalid body", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 409, description = "Code already used", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["projects"],
    operation_id = "createProject"
)]
#[post("/projects")]
pub async fn create_project(
    state: web::Data<ProjectState>,
    request: HttpRequest,
    payload: web::Json<ProjectInput>,
) -> ApiResult<HttpResponse> {
    let key = idempotency_key(request.headers())?;
    let created = state.projects.create(payload.into_inner(), key).await?;
    let location = format!("/api/v1/projects/{}", created.record.project.id);
    Ok(created_response(created, location))
}

/// Replace a project.
#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}",
    params(("id" = i64, Path, description = "Project identity")),
    request_body = ProjectInput,
    responses(
        (status = 200, description = "Project updated", body = ProjectView),
        (status = 400, description = "Invalid body", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 404, description = "Unknown project", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 409, description = "Code already used", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["projects"],
    operation_id = "updateProject"
)]
#[put("/projects/{id}")]
pub async fn update_project(
    state: web::Data<ProjectState>,
    path: web::Path<ProjectId>,
    payload: web::Json<ProjectInput>,
) -> ApiResult<web::Json<ProjectView>> {
    let updated = state
        .projects
        .update(path.into_inner(), payload.into_inner())
        .await?;
    Ok(web::Json(updated))
}

/// Change only the fields present in the body.
#[utoipa::path(
    patch,
    path = "/api/v1/projects/{id}",
    params(("id" = i64, Path, description = "Project identity")),
    request_body = ProjectInput,
    responses(
        (status = 200, description = "Project updated", body = ProjectView),
        (status = 400, description = "Invalid body or date range", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 404, description = "Unknown project", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["projects"],
    operation_id = "patchProject"
)]
#[patch("/projects/{id}")]
pub async fn patch_project(
    state: web::Data<ProjectState>,
    path: web::Path<ProjectId>,
    payload: web::Json<ProjectInput>,
) -> ApiResult<web::Json<ProjectView>> {
    let patched = state
        .projects
        .patch(path.into_inner(), payload.into_inner())
        .await?;
    Ok(web::Json(patched))
}

/// Delete a project that has no members.
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    params(("id" = i64, Path, description = "Project identity")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 404, description = "Unknown project", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 409, description = "Project still has members", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["projects"],
    operation_id = "deleteProject"
)]
#[delete("/projects/{id}")]
pub async fn delete_project(
    state: web::Data<ProjectState>,
    path: web::Path<ProjectId>,
) -> ApiResult<HttpResponse> {
    state.projects.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "projects_tests.rs"]
mod tests;
