//! Tests for the employee service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{
    DepartmentSummary, FixtureIdempotencyStore, MockDepartmentDirectory, MockEmployeeRepository,
    RemoteReferenceError,
};
use crate::domain::{DepartmentCount, ErrorCode};
use crate::test_support::FixedClock;
use mockall::predicate::eq;
use pagination::PageLimits;
use rstest::{fixture, rstest};

type Service = EmployeeService<MockEmployeeRepository, MockDepartmentDirectory>;

fn make_service(repo: MockEmployeeRepository, directory: MockDepartmentDirectory) -> Service {
    EmployeeService::new(
        Arc::new(repo),
        Arc::new(directory),
        Arc::new(FixtureIdempotencyStore),
        Arc::new(FixedClock::default()),
    )
}

fn employee(id: i64, email: &str, department: Option<i64>) -> Employee {
    Employee::from_draft(
        EmployeeId::new(id),
        EmployeeDraft {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: email.to_owned(),
            department_id: department.map(DepartmentId::new),
        },
        FixedClock::default().utc(),
    )
}

fn department(id: i64, name: &str) -> DepartmentSummary {
    DepartmentSummary {
        id: DepartmentId::new(id),
        name: name.to_owned(),
        code: name.to_uppercase(),
        location: None,
    }
}

#[fixture]
fn input() -> EmployeeInput {
    EmployeeInput {
        first_name: Some("Ada".to_owned()),
        last_name: Some("Lovelace".to_owned()),
        email: Some("ada@example.com".to_owned()),
        department_id: Some(999),
    }
}

fn first_page() -> PageRequest<EmployeeSortField> {
    PageRequest::first(PageLimits::default())
}

#[rstest]
#[tokio::test]
async fn create_rejects_missing_department_without_writing(input: EmployeeInput) {
    let mut repo = MockEmployeeRepository::new();
    repo.expect_find_by_email().return_once(|_| Ok(None));
    repo.expect_insert().never();
    let mut directory = MockDepartmentDirectory::new();
    directory
        .expect_department_exists()
        .with(eq(DepartmentId::new(999)))
        .times(1)
        .return_once(|_| Ok(false));

    let err = make_service(repo, directory)
        .create(input, None)
        .await
        .expect_err("missing department");

    assert_eq!(err.code(), ErrorCode::ReferencedEntityMissing);
}

#[rstest]
#[case::treat_as_absent(OnRemoteFailure::TreatAsAbsent, ErrorCode::ReferencedEntityMissing)]
#[case::block(OnRemoteFailure::Block, ErrorCode::ServiceUnavailable)]
#[tokio::test]
async fn create_fails_closed_when_department_service_is_down(
    input: EmployeeInput,
    #[case] policy: OnRemoteFailure,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockEmployeeRepository::new();
    repo.expect_find_by_email().return_once(|_| Ok(None));
    repo.expect_insert().never();
    let mut directory = MockDepartmentDirectory::new();
    directory
        .expect_department_exists()
        .return_once(|_| Err(RemoteReferenceError::timeout("2000ms elapsed")));

    let err = make_service(repo, directory)
        .with_reference_policy(policy)
        .create(input, None)
        .await
        .expect_err("unverified department");

    assert_eq!(err.code(), expected);
}

#[rstest]
#[tokio::test]
async fn create_proceeds_when_policy_allows(input: EmployeeInput) {
    let mut repo = MockEmployeeRepository::new();
    repo.expect_find_by_email().return_once(|_| Ok(None));
    repo.expect_insert()
        .times(1)
        .return_once(|draft, now| Ok(Employee::from_draft(EmployeeId::new(1), draft, now)));
    let mut directory = MockDepartmentDirectory::new();
    directory
        .expect_department_exists()
        .return_once(|_| Err(RemoteReferenceError::transport("connection refused")));

    let created = make_service(repo, directory)
        .with_reference_policy(OnRemoteFailure::Proceed)
        .create(input, None)
        .await
        .expect("created unverified");

    assert_eq!(created.record.department_id, Some(DepartmentId::new(999)));
}

#[rstest]
#[tokio::test]
async fn create_rejects_duplicate_email_before_remote_call(input: EmployeeInput) {
    let mut repo = MockEmployeeRepository::new();
    repo.expect_find_by_email()
        .return_once(|_| Ok(Some(employee(4, "Ada@Example.com", None))));
    repo.expect_insert().never();
    let mut directory = MockDepartmentDirectory::new();
    directory.expect_department_exists().never();

    let err = make_service(repo, directory)
        .create(input, None)
        .await
        .expect_err("duplicate email");

    assert_eq!(err.code(), ErrorCode::DuplicateField);
    assert!(err.message().contains("Ada@Example.com"));
}

#[tokio::test]
async fn malformed_create_touches_nothing() {
    let mut repo = MockEmployeeRepository::new();
    repo.expect_find_by_email().never();
    repo.expect_insert().never();
    let mut directory = MockDepartmentDirectory::new();
    directory.expect_department_exists().never();

    let err = make_service(repo, directory)
        .create(EmployeeInput::default(), None)
        .await
        .expect_err("empty body");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.errors().len(), 3);
}

#[tokio::test]
async fn update_accepts_own_email_in_other_case() {
    let mut repo = MockEmployeeRepository::new();
    repo.expect_find()
        .return_once(|_| Ok(Some(employee(1, "ada@example.com", Some(10)))));
    repo.expect_find_by_email()
        .return_once(|_| Ok(Some(employee(1, "ada@example.com", Some(10)))));
    repo.expect_update().return_once(|updated| Ok(Some(updated)));
    let mut directory = MockDepartmentDirectory::new();
    directory.expect_department_exists().never();

    let updated = make_service(repo, directory)
        .update(
            EmployeeId::new(1),
            EmployeeInput {
                first_name: Some("Augusta".to_owned()),
                last_name: Some("Lovelace".to_owned()),
                email: Some("ADA@example.com".to_owned()),
                department_id: Some(10),
            },
        )
        .await
        .expect("self update");

    assert_eq!(updated.email, "ADA@example.com");
    assert_eq!(updated.first_name, "Augusta");
}

#[tokio::test]
async fn patch_validates_moved_department() {
    let mut repo = MockEmployeeRepository::new();
    repo.expect_find()
        .return_once(|_| Ok(Some(employee(1, "ada@example.com", Some(10)))));
    repo.expect_update().never();
    let mut directory = MockDepartmentDirectory::new();
    directory
        .expect_department_exists()
        .with(eq(DepartmentId::new(11)))
        .return_once(|_| Ok(false));

    let err = make_service(repo, directory)
        .patch(
            EmployeeId::new(1),
            EmployeeInput {
                department_id: Some(11),
                ..EmployeeInput::default()
            },
        )
        .await
        .expect_err("unknown department");

    assert_eq!(err.code(), ErrorCode::ReferencedEntityMissing);
}

#[tokio::test]
async fn list_returns_base_records_when_department_service_is_down() {
    let mut repo = MockEmployeeRepository::new();
    repo.expect_list().return_once(|_, request| {
        Ok(Page::paginate(
            vec![employee(1, "a@example.com", Some(10)), employee(2, "b@example.com", None)],
            &request,
        ))
    });
    let mut directory = MockDepartmentDirectory::new();
    directory
        .expect_fetch_departments()
        .times(1)
        .return_once(|_| Err(RemoteReferenceError::transport("connection refused")));

    let page = make_service(repo, directory)
        .list(EmployeeFilter::default(), first_page())
        .await
        .expect("degraded list");

    assert_eq!(page.content.len(), 2);
    assert!(page.content.iter().all(|view| view.department.is_none()));
}

#[tokio::test]
async fn get_without_enrichment_skips_remote_call() {
    let mut repo = MockEmployeeRepository::new();
    repo.expect_find()
        .return_once(|_| Ok(Some(employee(1, "ada@example.com", Some(10)))));
    let mut directory = MockDepartmentDirectory::new();
    directory.expect_fetch_department().never();

    let view = make_service(repo, directory)
        .get(EmployeeId::new(1), false)
        .await
        .expect("found");

    assert_eq!(view.department, None);
}

#[tokio::test]
async fn get_missing_employee_is_not_found() {
    let mut repo = MockEmployeeRepository::new();
    repo.expect_find().return_once(|_| Ok(None));

    let err = make_service(repo, MockDepartmentDirectory::new())
        .get(EmployeeId::new(5), true)
        .await
        .expect_err("missing");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn stats_names_departments_with_one_call() {
    let mut repo = MockEmployeeRepository::new();
    repo.expect_head_counts().return_once(|| {
        Ok(vec![
            DepartmentCount {
                department_id: Some(DepartmentId::new(10)),
                count: 3,
                department_name: None,
            },
            DepartmentCount {
                department_id: None,
                count: 1,
                department_name: None,
            },
        ])
    });
    let mut directory = MockDepartmentDirectory::new();
    directory
        .expect_fetch_departments()
        .with(eq(vec![DepartmentId::new(10)]))
        .times(1)
        .return_once(|_| Ok(vec![department(10, "Engineering")]));

    let stats = make_service(repo, directory).stats().await.expect("stats");

    assert_eq!(stats.total_employees, 4);
    assert_eq!(
        stats.counts_by_department[0].department_name.as_deref(),
        Some("Engineering")
    );
    assert_eq!(stats.counts_by_department[1].department_name, None);
}

#[tokio::test]
async fn search_rejects_blank_query() {
    let err = make_service(MockEmployeeRepository::new(), MockDepartmentDirectory::new())
        .search("   ".to_owned(), first_page())
        .await
        .expect_err("blank query");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}
