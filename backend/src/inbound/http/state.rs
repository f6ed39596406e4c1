//! Shared HTTP adapter state.
//!
//! HTTP handlers accept these states via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O. Each
//! record service registers exactly one of them.

use std::sync::Arc;

use pagination::PageLimits;

use crate::domain::ports::{DepartmentRecords, EmployeeRecords, ProjectMembers, ProjectRecords};

/// Dependencies of the employee endpoints.
#[derive(Clone)]
pub struct EmployeeState {
    pub records: Arc<dyn EmployeeRecords>,
    pub limits: PageLimits,
}

impl EmployeeState {
    /// Bundle the employee use cases with the page limits.
    pub fn new(records: Arc<dyn EmployeeRecords>, limits: PageLimits) -> Self {
        Self { records, limits }
    }
}

/// Dependencies of the department endpoints.
#[derive(Clone)]
pub struct DepartmentState {
    pub records: Arc<dyn DepartmentRecords>,
    pub limits: PageLimits,
}

impl DepartmentState {
    /// Bundle the department use cases with the page limits.
    pub fn new(records: Arc<dyn DepartmentRecords>, limits: PageLimits) -> Self {
        Self { records, limits }
    }
}

/// Parameter object bundling the project service's ports.
#[derive(Clone)]
pub struct ProjectStatePorts {
    pub projects: Arc<dyn ProjectRecords>,
    pub members: Arc<dyn ProjectMembers>,
}

/// Dependencies of the project and membership endpoints.
#[derive(Clone)]
pub struct ProjectState {
    pub projects: Arc<dyn ProjectRecords>,
    pub members: Arc<dyn ProjectMembers>,
    pub limits: PageLimits,
}

impl ProjectState {
    /// Construct state from the ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use pagination::PageLimits;
    /// use staffing::domain::ports::{ProjectMembers, ProjectRecords};
    /// use staffing::inbound::http::state::{ProjectState, ProjectStatePorts};
    ///
    /// fn wire(projects: Arc<dyn ProjectRecords>, members: Arc<dyn ProjectMembers>) -> ProjectState {
    ///     ProjectState::new(ProjectStatePorts { projects, members }, PageLimits::default())
    /// }
    /// ```
    pub fn new(ports: ProjectStatePorts, limits: PageLimits) -> Self {
        let ProjectStatePorts { projects, members } = ports;
        Self {
            projects,
            members,
            limits,
        }
    }
}
