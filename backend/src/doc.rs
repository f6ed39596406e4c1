//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] describes the endpoints of all three record services in one
//! document; each process mounts only the subset belonging to the service it
//! runs. Failures share the [`ProblemSchema`] body.
//!
//! The generated specification is served by Swagger UI in debug builds.

use utoipa::OpenApi;

use crate::domain::ports::{DepartmentSummary, EmployeeSummary};
use crate::domain::{
    BulkAddOutcome, BulkMemberInput, DepartmentCount, DepartmentInput, EmployeeInput,
    EmployeeStats, MemberInput, MemberOperationResult, MemberView, ProjectInput, ProjectMember,
    ProjectStats, ProjectStatus,
};
use crate::inbound::http::health::HealthReport;
use crate::inbound::http::schemas::{
    DepartmentPage, EmployeePage, FieldViolationSchema, ProblemSchema, ProjectPage,
};

/// OpenAPI document for the staffing record services.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Staffing record services API",
        description = "Employee, department and project records with cross-service references."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::employees::list_employees,
        crate::inbound::http::employees::search_employees,
        crate::inbound::http::employees::employee_stats,
        crate::inbound::http::employees::employees_by_department,
        crate::inbound::http::employees::count_employees_by_department,
        crate::inbound::http::employees::employees_by_ids,
        crate::inbound::http::employees::employee_exists,
        crate::inbound::http::employees::get_employee,
        crate::inbound::http::employees::create_employee,
        crate::inbound::http::employees::update_employee,
        crate::inbound::http::employees::patch_employee,
        crate::inbound::http::employees::delete_employee,
        crate::inbound::http::departments::list_departments,
        crate::inbound::http::departments::search_departments,
        crate::inbound::http::departments::department_by_code,
        crate::inbound::http::departments::departments_by_ids,
        crate::inbound::http::departments::department_exists,
        crate::inbound::http::departments::department_employees,
        crate::inbound::http::departments::get_department,
        crate::inbound::http::departments::create_department,
        crate::inbound::http::departments::update_department,
        crate::inbound::http::departments::patch_department,
        crate::inbound::http::departments::delete_department,
        crate::inbound::http::projects::list_projects,
        crate::inbound::http::projects::project_stats,
        crate::inbound::http::projects::project_by_code,
        crate::inbound::http::projects::get_project,
        crate::inbound::http::projects::create_project,
        crate::inbound::http::projects::update_project,
        crate::inbound::http::projects::patch_project,
        crate::inbound::http::projects::delete_project,
        crate::inbound::http::members::list_members,
        crate::inbound::http::members::get_member,
        crate::inbound::http::members::add_member,
        crate::inbound::http::members::add_members_bulk,
        crate::inbound::http::members::remove_member,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ProblemSchema,
        FieldViolationSchema,
        EmployeePage,
        DepartmentPage,
        ProjectPage,
        EmployeeInput,
        EmployeeStats,
        DepartmentCount,
        EmployeeSummary,
        DepartmentInput,
        DepartmentSummary,
        ProjectInput,
        ProjectStatus,
        ProjectStats,
        ProjectMember,
        MemberInput,
        BulkMemberInput,
        MemberView,
        MemberOperationResult,
        BulkAddOutcome,
        HealthReport,
    )),
    tags(
        (name = "employees", description = "Employee records"),
        (name = "departments", description = "Department records"),
        (name = "projects", description = "Project records"),
        (name = "members", description = "Project membership"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document's paths and schemas.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/api/v1/employees/{id}")]
    #[case("/api/v1/employees/count-by-department/{departmentId}")]
    #[case("/api/v1/departments/{id}/employees")]
    #[case("/api/v1/projects/{id}/members/bulk")]
    #[case("/health/ready")]
    fn document_lists_endpoint(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[test]
    fn problem_schema_has_rfc_members() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let problem = schemas.get("ProblemDetails").expect("problem schema");

        assert_object_schema_has_field(problem, "type");
        assert_object_schema_has_field(problem, "traceId");
        assert_object_schema_has_field(problem, "dependentCount");
    }
}
