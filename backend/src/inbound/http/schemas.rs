//! OpenAPI schema definitions for types that do not derive `ToSchema`.
//!
//! The page envelope lives in the framework-agnostic `pagination` crate and
//! field violations are plain domain data, so their schemas are registered
//! here in the inbound adapter layer where framework concerns belong.

use utoipa::ToSchema;

use crate::domain::{Department, EmployeeView, ProjectView};

/// OpenAPI schema for [`crate::domain::FieldViolation`].
#[derive(ToSchema)]
#[schema(as = crate::domain::FieldViolation)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FieldViolationSchema {
    /// External (camelCase) field name.
    #[schema(example = "email")]
    field: String,
    /// What is wrong with the value.
    #[schema(example = "must be a well-formed email address")]
    message: String,
}

/// OpenAPI schema for [`super::error::ProblemDetails`].
///
/// Every failed request is answered with `application/problem+json`.
#[derive(ToSchema)]
#[schema(as = ProblemDetails)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ProblemSchema {
    #[schema(rename = "type")]
    #[schema(example = "https://api.company.com/problems/not-found")]
    problem_type: String,
    #[schema(example = "Resource Not Found")]
    title: String,
    #[schema(example = 404)]
    status: u16,
    #[schema(example = "Employee with id 7 not found")]
    detail: String,
    #[schema(format = DateTime)]
    timestamp: String,
    #[schema(example = "6f1c1d7e-3f6e-4a38-9a60-1c2f1ad1e9b0")]
    trace_id: String,
    #[schema(example = "/api/v1/employees/7")]
    instance: String,
    /// Present only for validation failures.
    errors: Option<Vec<FieldViolationSchema>>,
    /// Dependents still referencing the record; only for `resource-in-use`.
    dependent_count: Option<u64>,
}

macro_rules! page_schema {
    ($schema:ident, $item:ty) => {
        #[doc = concat!("OpenAPI schema for a page of `", stringify!($item), "`.")]
        #[derive(ToSchema)]
        #[schema(rename_all = "camelCase")]
        #[expect(
            dead_code,
            reason = "Used only for OpenAPI schema generation via utoipa"
        )]
        pub struct $schema {
            content: Vec<$item>,
            page: u32,
            size: u32,
            total_elements: u64,
            total_pages: u64,
            #[schema(example = "id,asc")]
            sort: String,
            first: bool,
            last: bool,
        }
    };
}

page_schema!(EmployeePage, EmployeeView);
page_schema!(DepartmentPage, Department);
page_schema!(ProjectPage, ProjectView);

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_json<T: PartialSchema>() -> serde_json::Value {
        serde_json::to_value(T::schema()).expect("schema serialises")
    }

    #[test]
    fn problem_schema_uses_wire_names() {
        let schema = schema_json::<ProblemSchema>();
        let properties = schema
            .get("properties")
            .and_then(serde_json::Value::as_object)
            .expect("object schema");
        for name in ["type", "title", "status", "detail", "traceId", "instance"] {
            assert!(properties.contains_key(name), "missing {name}");
        }
    }

    #[test]
    fn page_schema_lists_navigation_members() {
        let schema = schema_json::<EmployeePage>();
        let properties = schema
            .get("properties")
            .and_then(serde_json::Value::as_object)
            .expect("object schema");
        assert!(properties.contains_key("totalElements"));
        assert!(properties.contains_key("content"));
    }
}
