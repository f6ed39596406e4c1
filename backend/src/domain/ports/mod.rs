//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Records`, `ProjectMembers`) are what the HTTP adapter
//! calls. Driven ports cover persistence (`*Repository`), peer services
//! (`*Directory`) and the idempotency cache.

mod macros;
pub(crate) use macros::define_port_error;

mod department_directory;
mod department_records;
mod department_repository;
mod employee_directory;
mod employee_records;
mod employee_repository;
mod idempotency_metrics;
mod idempotency_store;
mod project_records;
mod project_repository;
mod record_repository;
mod remote_reference;

#[cfg(test)]
pub use department_directory::MockDepartmentDirectory;
pub use department_directory::{DepartmentDirectory, FixtureDepartmentDirectory};
#[cfg(test)]
pub use department_records::MockDepartmentRecords;
pub use department_records::DepartmentRecords;
#[cfg(test)]
pub use department_repository::MockDepartmentRepository;
pub use department_repository::DepartmentRepository;
#[cfg(test)]
pub use employee_directory::MockEmployeeDirectory;
pub use employee_directory::{EmployeeDirectory, FixtureEmployeeDirectory};
#[cfg(test)]
pub use employee_records::MockEmployeeRecords;
pub use employee_records::EmployeeRecords;
#[cfg(test)]
pub use employee_repository::MockEmployeeRepository;
pub use employee_repository::EmployeeRepository;
#[cfg(test)]
pub use idempotency_metrics::MockIdempotencyMetrics;
pub use idempotency_metrics::{
    IdempotencyMetrics, IdempotencyMetricsError, NoOpIdempotencyMetrics,
};
pub use idempotency_store::{FixtureIdempotencyStore, IdempotencyStore, SnapshotFuture};
#[cfg(test)]
pub use project_records::{MockProjectMembers, MockProjectRecords};
pub use project_records::{ProjectMembers, ProjectRecords};
#[cfg(test)]
pub use project_repository::{MockProjectMemberRepository, MockProjectRepository};
pub use project_repository::{ProjectMemberRepository, ProjectRemoval, ProjectRepository};
pub(crate) use record_repository::map_repository_error;
pub use record_repository::RecordRepositoryError;
pub use remote_reference::{
    DepartmentSummary, EmployeeSummary, RemoteReferenceError, RemoteTarget,
};
