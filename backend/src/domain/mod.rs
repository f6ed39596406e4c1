//! Domain records, services and the ports they depend on.
//!
//! Purpose: define the employee, department and project records, the rules
//! that keep soft references between services consistent, and the services
//! that apply those rules. Nothing here knows about HTTP or storage.
//!
//! Public surface:
//! - Records and their request bodies: [`Employee`], [`Department`],
//!   [`Project`], [`ProjectMember`].
//! - Services implementing the driving ports: [`EmployeeService`],
//!   [`DepartmentService`], [`ProjectService`], [`MemberService`].
//! - Cross-service policy: [`OnRemoteFailure`], [`Detail`],
//!   [`DeletionGuard`].
//! - Errors: [`Error`] and [`ErrorCode`].

pub mod deletion_guard;
pub mod department;
pub mod department_service;
pub mod employee;
pub mod employee_service;
pub mod enrichment;
pub mod error;
pub mod idempotency;
pub mod ids;
pub mod member;
pub mod member_service;
pub mod ports;
pub mod project;
pub mod project_service;
pub mod reference;
pub mod trace_id;
pub mod uniqueness;
mod validation;

pub use self::deletion_guard::{DeletionGuard, DependentCount, GuardedOwner};
pub use self::department::{
    Department, DepartmentChanges, DepartmentDraft, DepartmentFilter, DepartmentInput,
    DepartmentSortField,
};
pub use self::department_service::DepartmentService;
pub use self::employee::{
    DepartmentCount, Employee, EmployeeChanges, EmployeeDraft, EmployeeFilter, EmployeeInput,
    EmployeeSortField, EmployeeStats, EmployeeView,
};
pub use self::employee_service::EmployeeService;
pub use self::enrichment::{Enrichable, Keyed, enrich_batch, enrich_one};
pub use self::error::{Error, ErrorCode, FieldViolation};
pub use self::idempotency::{
    Created, IdempotencyConfig, IdempotencyKey, IdempotencyKeyValidationError,
    IdempotencyRequest, IdempotencyScope, IdempotentOutcome, MAX_IDEMPOTENCY_KEY_LEN,
    MutationType, PayloadHash, run_idempotent,
};
pub use self::ids::{DepartmentId, EmployeeId, MemberId, ProjectId};
pub use self::member::{
    BulkAddOutcome, BulkMemberInput, MemberDraft, MemberInput, MemberOperationResult,
    MemberView, ProjectMember,
};
pub use self::member_service::MemberService;
pub use self::project::{
    Project, ProjectChanges, ProjectDraft, ProjectFilter, ProjectInput, ProjectSortField,
    ProjectStats, ProjectStatus, ProjectView, StatsGrouping,
};
pub use self::project_service::ProjectService;
pub use self::reference::{Detail, OnRemoteFailure, ParseOnRemoteFailureError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::uniqueness::fold_case;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use staffing::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::not_found("Employee with id 7 not found"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
