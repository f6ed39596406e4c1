//! End-to-end behaviour of references between the employee and department
//! services.

mod support;

use reqwest::Client;
use rstest::{fixture, rstest};
use serde_json::json;
use support::{at, create, delete, get, post, slug, start_cluster};

#[fixture]
fn client() -> Client {
    Client::new()
}

#[rstest]
#[actix_web::test]
async fn employee_is_enriched_with_its_department(client: Client) {
    let cluster = start_cluster();
    let department = create(
        &client,
        at(&cluster.departments, "/api/v1/departments"),
        &json!({"name": "Engineering", "code": "ENG"}),
    )
    .await;
    let employee = create(
        &client,
        at(&cluster.employees, "/api/v1/employees"),
        &json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "departmentId": department["id"]
        }),
    )
    .await;

    let (status, fetched) = get(
        &client,
        at(&cluster.employees, &format!("/api/v1/employees/{}", employee["id"])),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(fetched["department"]["name"], json!("Engineering"));
}

#[rstest]
#[actix_web::test]
async fn unknown_department_is_rejected(client: Client) {
    let cluster = start_cluster();

    let response = post(
        &client,
        at(&cluster.employees, "/api/v1/employees"),
        &json!({
            "firstName": "Grace",
            "lastName": "Hopper",
            "email": "grace@example.com",
            "departmentId": 999
        }),
        None,
    )
    .await;

    assert_eq!(response.status().as_u16(), 422);
    let problem: serde_json::Value = response.json().await.expect("problem body");
    assert_eq!(slug(&problem), "referenced-entity-missing");
}

#[rstest]
#[actix_web::test]
async fn department_with_employees_cannot_be_deleted(client: Client) {
    let cluster = start_cluster();
    let department = create(
        &client,
        at(&cluster.departments, "/api/v1/departments"),
        &json!({"name": "Research", "code": "RES"}),
    )
    .await;
    let employee = create(
        &client,
        at(&cluster.employees, "/api/v1/employees"),
        &json!({
            "firstName": "Alan",
            "lastName": "Turing",
            "email": "alan@example.com",
            "departmentId": department["id"]
        }),
    )
    .await;
    let department_url = at(
        &cluster.departments,
        &format!("/api/v1/departments/{}", department["id"]),
    );

    let (blocked, problem) = delete(&client, department_url.clone()).await;
    let (roster_status, roster) = get(
        &client,
        at(
            &cluster.departments,
            &format!("/api/v1/departments/{}/employees", department["id"]),
        ),
    )
    .await;
    delete(
        &client,
        at(&cluster.employees, &format!("/api/v1/employees/{}", employee["id"])),
    )
    .await;
    let (allowed, _) = delete(&client, department_url).await;

    assert_eq!(blocked, 409);
    assert_eq!(slug(&problem), "resource-in-use");
    assert_eq!(problem["dependentCount"], json!(1));
    assert_eq!(roster_status, 200);
    assert_eq!(roster[0]["email"], json!("alan@example.com"));
    assert_eq!(allowed, 204);
}

#[rstest]
#[actix_web::test]
async fn repeated_create_with_same_key_is_replayed(client: Client) {
    let cluster = start_cluster();
    let url = at(&cluster.departments, "/api/v1/departments");
    let body = json!({"name": "Finance", "code": "FIN"});

    let first = post(&client, url.clone(), &body, Some("create-fin")).await;
    let first_status = first.status().as_u16();
    let first_body: serde_json::Value = first.json().await.expect("json body");
    let second = post(&client, url, &body, Some("create-fin")).await;
    let replayed = second
        .headers()
        .get("Idempotent-Replayed")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let second_status = second.status().as_u16();
    let second_body: serde_json::Value = second.json().await.expect("json body");

    assert_eq!(first_status, 201);
    assert_eq!(second_status, 201);
    assert_eq!(replayed.as_deref(), Some("true"));
    assert_eq!(first_body["id"], second_body["id"]);
}

#[rstest]
#[actix_web::test]
async fn duplicate_email_conflicts_regardless_of_case(client: Client) {
    let cluster = start_cluster();
    let url = at(&cluster.employees, "/api/v1/employees");
    create(
        &client,
        url.clone(),
        &json!({"firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com"}),
    )
    .await;

    let response = post(
        &client,
        url,
        &json!({"firstName": "Ada", "lastName": "King", "email": "ADA@example.com"}),
        None,
    )
    .await;

    assert_eq!(response.status().as_u16(), 409);
    let problem: serde_json::Value = response.json().await.expect("problem body");
    assert_eq!(slug(&problem), "duplicate-field");
    assert_eq!(problem["field"], json!("email"));
}

#[rstest]
#[actix_web::test]
async fn trace_id_is_echoed_on_problems(client: Client) {
    let cluster = start_cluster();

    let response = client
        .get(at(&cluster.employees, "/api/v1/employees/404"))
        .header("trace-id", "00000000-0000-0000-0000-000000000042")
        .send()
        .await
        .expect("request completes");

    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok()),
        Some("application/problem+json")
    );
    let problem: serde_json::Value = response.json().await.expect("problem body");
    assert_eq!(problem["traceId"], json!("00000000-0000-0000-0000-000000000042"));
    assert_eq!(problem["instance"], json!("/api/v1/employees/404"));
}
