//! Tests for the employee HTTP handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test;
use pagination::{Page, PageLimits};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::MockEmployeeRecords;
use crate::domain::{Created, EmployeeDraft, Error, TRACE_ID_HEADER};
use crate::inbound::http::idempotency::IDEMPOTENT_REPLAYED_HEADER;
use crate::inbound::http::test_utils::{fixed_now, problem_slug, read_problem, test_app};

#[fixture]
fn ada() -> Employee {
    Employee::from_draft(
        EmployeeId::new(1),
        EmployeeDraft {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            department_id: Some(DepartmentId::new(3)),
        },
        fixed_now(),
    )
}

fn state(records: MockEmployeeRecords) -> EmployeeState {
    EmployeeState::new(Arc::new(records), PageLimits::default())
}

#[rstest]
#[actix_web::test]
async fn list_forwards_filters_and_paging(ada: Employee) {
    let mut records = MockEmployeeRecords::new();
    records
        .expect_list()
        .withf(|filter, request| {
            filter.last_name.as_deref() == Some("love")
                && filter.department_id == Some(DepartmentId::new(3))
                && filter.email.is_none()
                && request.page() == 1
                && request.size() == 5
                && request.sort().describe() == "lastName,desc"
        })
        .return_once(move |_, request| {
            Ok(Page::from_parts(vec![EmployeeView::bare(ada)], &request, 6))
        });
    let app = test::init_service(test_app!(state(records), configure)).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/employees?page=1&size=5&sort=lastName,desc&lastName=love&email=%20&departmentId=3")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["totalElements"], json!(6));
    assert_eq!(body["content"][0]["email"], json!("ada@example.com"));
    assert_eq!(body["last"], json!(true));
}

#[rstest]
#[actix_web::test]
async fn unknown_sort_field_is_a_validation_problem() {
    let app = test::init_service(test_app!(state(MockEmployeeRecords::new()), configure)).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/employees?sort=salary,asc")
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let problem = read_problem(res).await;
    assert_eq!(problem_slug(&problem), "validation-error");
    assert_eq!(problem["errors"][0]["field"], json!("sort"));
    assert_eq!(problem["instance"], json!("/api/v1/employees"));
}

#[rstest]
#[case("/api/v1/employees/1", true)]
#[case("/api/v1/employees/1?enrich=false", false)]
#[actix_web::test]
async fn get_enriches_unless_disabled(ada: Employee, #[case] uri: &str, #[case] enrich: bool) {
    let mut records = MockEmployeeRecords::new();
    records
        .expect_get()
        .withf(move |id, flag| *id == EmployeeId::new(1) && *flag == enrich)
        .return_once(move |_, _| Ok(EmployeeView::bare(ada)));
    let app = test::init_service(test_app!(state(records), configure)).await;

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri(uri).to_request()).await;

    assert_eq!(body["id"], json!(1));
    assert_eq!(body["departmentId"], json!(3));
}

#[rstest]
#[actix_web::test]
async fn missing_employee_renders_not_found_problem() {
    let mut records = MockEmployeeRecords::new();
    records
        .expect_get()
        .return_once(|id, _| Err(Error::not_found(format!("Employee with id {id} not found"))));
    let app = test::init_service(test_app!(state(records), configure)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/employees/42")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let trace_header = res
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let problem = read_problem(res).await;
    assert_eq!(problem_slug(&problem), "not-found");
    assert_eq!(problem["detail"], json!("Employee with id 42 not found"));
    assert_eq!(problem["traceId"], json!(trace_header));
    assert_eq!(problem["instance"], json!("/api/v1/employees/42"));
}

#[rstest]
#[case("/api/v1/employees/abc")]
#[case("/api/v1/employees/abc/exists")]
#[actix_web::test]
async fn malformed_identity_is_a_bad_request(#[case] uri: &str) {
    let app = test::init_service(test_app!(state(MockEmployeeRecords::new()), configure)).await;

    let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(problem_slug(&read_problem(res).await), "validation-error");
}

#[rstest]
#[actix_web::test]
async fn create_replays_with_idempotency_key(ada: Employee) {
    let mut records = MockEmployeeRecords::new();
    records
        .expect_create()
        .withf(|input, key| {
            input.email.as_deref() == Some("ada@example.com")
                && key.as_ref().map(ToString::to_string).as_deref() == Some("emp-create-1")
        })
        .return_once(move |_, _| {
            Ok(Created {
                record: ada,
                replayed: true,
            })
        });
    let app = test::init_service(test_app!(state(records), configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/employees")
        .insert_header(("Idempotency-Key", "emp-create-1"))
        .set_json(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "departmentId": 3
        }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(
        res.headers()
            .get(IDEMPOTENT_REPLAYED_HEADER)
            .and_then(|value| value.to_str().ok()),
        Some("true")
    );
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["id"], json!(1));
}

#[rstest]
#[actix_web::test]
async fn blank_idempotency_key_is_rejected_before_the_service() {
    let app = test::init_service(test_app!(state(MockEmployeeRecords::new()), configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/employees")
        .insert_header(("Idempotency-Key", "  "))
        .set_json(json!({"firstName": "Ada"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let problem = read_problem(res).await;
    assert_eq!(problem["errors"][0]["field"], json!("Idempotency-Key"));
}

#[rstest]
#[actix_web::test]
async fn malformed_json_body_is_a_validation_problem() {
    let app = test::init_service(test_app!(state(MockEmployeeRecords::new()), configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/employees")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"firstName\": ")
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(problem_slug(&read_problem(res).await), "validation-error");
}

#[rstest]
#[case(Error::duplicate_field("Employee", "email", "ada@example.com"), StatusCode::CONFLICT)]
#[case(Error::referenced_entity_missing("Department", 9), StatusCode::UNPROCESSABLE_ENTITY)]
#[case(Error::service_unavailable("Department service unavailable"), StatusCode::SERVICE_UNAVAILABLE)]
#[actix_web::test]
async fn update_failures_map_to_statuses(#[case] error: Error, #[case] status: StatusCode) {
    let mut records = MockEmployeeRecords::new();
    records.expect_update().return_once(move |_, _| Err(error));
    let app = test::init_service(test_app!(state(records), configure)).await;

    let req = test::TestRequest::put()
        .uri("/api/v1/employees/1")
        .set_json(json!({"firstName": "Ada"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), status);
}

#[rstest]
#[actix_web::test]
async fn patch_forwards_partial_body(ada: Employee) {
    let mut records = MockEmployeeRecords::new();
    records
        .expect_patch()
        .withf(|id, input| {
            *id == EmployeeId::new(1)
                && input.last_name.as_deref() == Some("Byron")
                && input.first_name.is_none()
        })
        .return_once(move |_, _| Ok(ada));
    let app = test::init_service(test_app!(state(records), configure)).await;

    let req = test::TestRequest::patch()
        .uri("/api/v1/employees/1")
        .set_json(json!({"lastName": "Byron"}))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn delete_answers_no_content() {
    let mut records = MockEmployeeRecords::new();
    records
        .expect_delete()
        .withf(|id| *id == EmployeeId::new(7))
        .return_once(|_| Ok(()));
    let app = test::init_service(test_app!(state(records), configure)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/employees/7")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[rstest]
#[actix_web::test]
async fn search_requires_text() {
    let app = test::init_service(test_app!(state(MockEmployeeRecords::new()), configure)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/employees/search?q=%20")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_problem(res).await["errors"][0]["field"], json!("q"));
}

#[rstest]
#[actix_web::test]
async fn search_forwards_trimmed_text(ada: Employee) {
    let mut records = MockEmployeeRecords::new();
    records
        .expect_search()
        .withf(|text, _| text == "ada")
        .return_once(move |_, request| Ok(Page::paginate(vec![ada], &request)));
    let app = test::init_service(test_app!(state(records), configure)).await;

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/employees/search?q=%20ada%20")
            .to_request(),
    )
    .await;

    assert_eq!(body["totalElements"], json!(1));
}

#[rstest]
#[actix_web::test]
async fn peer_lookups_answer_bare_json(ada: Employee) {
    let summary = ada.summary();
    let mut records = MockEmployeeRecords::new();
    records
        .expect_by_ids()
        .withf(|ids| ids == &vec![EmployeeId::new(1), EmployeeId::new(2)])
        .return_once(move |_| Ok(vec![summary]));
    records
        .expect_exists()
        .withf(|id| *id == EmployeeId::new(1))
        .return_once(|_| Ok(true));
    records
        .expect_count_by_department()
        .withf(|id| *id == DepartmentId::new(3))
        .return_once(|_| Ok(4));
    records
        .expect_by_department()
        .return_once(|_| Ok(Vec::new()));
    let app = test::init_service(test_app!(state(records), configure)).await;

    let by_ids: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/employees/by-ids?ids=1,2")
            .to_request(),
    )
    .await;
    let exists: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/employees/1/exists")
            .to_request(),
    )
    .await;
    let count: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/employees/count-by-department/3")
            .to_request(),
    )
    .await;
    let members: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/employees/by-department/3")
            .to_request(),
    )
    .await;

    assert_eq!(by_ids[0]["email"], json!("ada@example.com"));
    assert_eq!(exists, json!(true));
    assert_eq!(count, json!(4));
    assert_eq!(members, json!([]));
}

#[actix_web::test]
async fn list_query_normalises_blank_filters() {
    let filter = EmployeeFilter::from(EmployeeListQuery {
        email: Some("  ".to_owned()),
        last_name: Some(" Love ".to_owned()),
        department_id: None,
    });
    assert_eq!(filter.email, None);
    assert_eq!(filter.last_name.as_deref(), Some("Love"));
}
