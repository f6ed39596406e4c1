//! Project membership HTTP handlers.
//!
//! ```text
//! GET    /api/v1/projects/{id}/members?enrich=true
//! GET    /api/v1/projects/{id}/members/{employeeId}
//! POST   /api/v1/projects/{id}/members
//! POST   /api/v1/projects/{id}/members/bulk
//! DELETE /api/v1/projects/{id}/members/{employeeId}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};

use crate::domain::{
    BulkAddOutcome, BulkMemberInput, EmployeeId, MemberInput, MemberView, ProjectId,
    ProjectMember,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::idempotency::{created_response, idempotency_key};
use crate::inbound::http::schemas::ProblemSchema;
use crate::inbound::http::state::ProjectState;
use crate::inbound::http::validation::EnrichQuery;

/// Register the membership endpoints.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_members)
        .service(add_members_bulk)
        .service(add_member)
        .service(get_member)
        .service(remove_member);
}

/// Members of a project; employee detail only with `enrich=true`.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/members",
    params(("id" = i64, Path, description = "Project identity"), EnrichQuery),
    responses(
        (status = 200, description = "Members", body = [MemberView]),
        (status = 404, description = "Unknown project", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["members"],
    operation_id = "listMembers"
)]
#[get("/projects/{id}/members")]
pub async fn list_members(
    state: web::Data<ProjectState>,
    path: web::Path<ProjectId>,
    query: web::Query<EnrichQuery>,
) -> ApiResult<web::Json<Vec<MemberView>>> {
    let enrich = query.enrich.unwrap_or(false);
    Ok(web::Json(
        state.members.list(path.into_inner(), enrich).await?,
    ))
}

/// One member of a project.
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/members/{employeeId}",
    params(
        ("id" = i64, Path, description = "Project identity"),
        ("employeeId" = i64, Path, description = "Employee identity"),
        EnrichQuery
    ),
    responses(
        (status = 200, description = "Member", body = MemberView),
        (status = 404, description = "Not a member", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["members"],
    operation_id = "getMember"
)]
#[get("/projects/{id}/members/{employee_id}")]
pub async fn get_member(
    state: web::Data<ProjectState>,
    path: web::Path<(ProjectId, EmployeeId)>,
    query: web::Query<EnrichQuery>,
) -> ApiResult<web::Json<MemberView>> {
    let (project_id, employee_id) = path.into_inner();
    let enrich = query.enrich.unwrap_or(false);
    Ok(web::Json(
        state.members.get(project_id, employee_id, enrich).await?,
    ))
}

/// Add one member; retries with the same `Idempotency-Key` replay it.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/members",
    params(
        ("id" = i64, Path, description = "Project identity"),
        ("Idempotency-Key" = Option<String>, Header, description = "Opaque retry token")
    ),
    request_body = MemberInput,
    responses(
        (status = 201, description = "Member added", body = ProjectMember,
            headers(("Idempotent-Replayed" = String, description = "`true` when replayed"))),
        (status = 400, description = "Invalid body", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 404, description = "Unknown project", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 409, description = "Already a member", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 422, description = "Employee does not exist", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["members"],
    operation_id = "addMember"
)]
#[post("/projects/{id}/members")]
pub async fn add_member(
    state: web::Data<ProjectState>,
    request: HttpRequest,
    path: web::Path<ProjectId>,
    payload: web::Json<MemberInput>,
) -> ApiResult<HttpResponse> {
    let project_id = path.into_inner();
    let key = idempotency_key(request.headers())?;
    let created = state
        .members
        .add(project_id, payload.into_inner(), key)
        .await?;
    let location = format!(
        "/api/v1/projects/{project_id}/members/{}",
        created.record.employee_id
    );
    Ok(created_response(created, location))
}

/// Add several members, reporting an outcome per item.
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/members/bulk",
    params(("id" = i64, Path, description = "Project identity")),
    request_body = BulkMemberInput,
    responses(
        (status = 200, description = "Per-item outcomes", body = BulkAddOutcome),
        (status = 400, description = "An item is malformed", body = ProblemSchema,
            content_type = "application/problem+json"),
        (status = 404, description = "Unknown project", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["members"],
    operation_id = "addMembersBulk"
)]
#[post("/projects/{id}/members/bulk")]
pub async fn add_members_bulk(
    state: web::Data<ProjectState>,
    path: web::Path<ProjectId>,
    payload: web::Json<BulkMemberInput>,
) -> ApiResult<web::Json<BulkAddOutcome>> {
    let outcome = state
        .members
        .add_bulk(path.into_inner(), payload.into_inner())
        .await?;
    Ok(web::Json(outcome))
}

/// Remove a member.
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}/members/{employeeId}",
    params(
        ("id" = i64, Path, description = "Project identity"),
        ("employeeId" = i64, Path, description = "Employee identity")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 404, description = "Not a member", body = ProblemSchema,
            content_type = "application/problem+json")
    ),
    tags = ["members"],
    operation_id = "removeMember"
)]
#[delete("/projects/{id}/members/{employee_id}")]
pub async fn remove_member(
    state: web::Data<ProjectState>,
    path: web::Path<(ProjectId, EmployeeId)>,
) -> ApiResult<HttpResponse> {
    let (project_id, employee_id) = path.into_inner();
    state.members.remove(project_id, employee_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "members_tests.rs"]
mod tests;
