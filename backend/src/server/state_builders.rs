//! Builders wiring repositories, peer directories and services into the
//! HTTP state of the selected record service.

use std::sync::Arc;

use actix_web::web;
use mockable::Clock;

use crate::domain::ports::IdempotencyStore;
use crate::domain::{DepartmentService, EmployeeService, MemberService, ProjectService};
use crate::inbound::http::state::{
    DepartmentState, EmployeeState, ProjectState, ProjectStatePorts,
};
use crate::inbound::http::{departments, employees, members, projects};
use crate::outbound::persistence::{
    MemoryDepartmentRepository, MemoryEmployeeRepository, MemoryProjectStore,
};
use crate::outbound::remote::{HttpDepartmentDirectory, HttpEmployeeDirectory};
use crate::settings::ServiceKind;

use super::ServerConfig;

/// HTTP state of exactly one record service.
#[derive(Clone)]
pub(crate) enum ApiState {
    Employees(web::Data<EmployeeState>),
    Departments(web::Data<DepartmentState>),
    Projects(web::Data<ProjectState>),
}

impl ApiState {
    /// Register the state and the endpoints of the service it belongs to.
    pub(crate) fn register(self, cfg: &mut web::ServiceConfig) {
        match self {
            Self::Employees(state) => {
                cfg.app_data(state);
                employees::configure(cfg);
            }
            Self::Departments(state) => {
                cfg.app_data(state);
                departments::configure(cfg);
            }
            Self::Projects(state) => {
                cfg.app_data(state);
                projects::configure(cfg);
                members::configure(cfg);
            }
        }
    }
}

fn peer_error(peer: &str, err: reqwest::Error) -> std::io::Error {
    std::io::Error::other(format!("failed to build {peer} client: {err}"))
}

/// Build the services for `config.service` over in-process storage.
///
/// # Errors
/// Returns [`std::io::Error`] when the peer HTTP client cannot be built.
pub(crate) fn build_api_state(
    config: &ServerConfig,
    idempotency: Arc<dyn IdempotencyStore>,
    clock: Arc<dyn Clock>,
) -> std::io::Result<ApiState> {
    let state = match config.service {
        ServiceKind::Employees => {
            let departments = HttpDepartmentDirectory::new(
                config.department_service_url.clone(),
                config.remote_timeout,
            )
            .map_err(|err| peer_error("department service", err))?;
            let service = EmployeeService::new(
                Arc::new(MemoryEmployeeRepository::default()),
                Arc::new(departments),
                idempotency,
                clock,
            )
            .with_reference_policy(config.reference_check_policy);
            ApiState::Employees(web::Data::new(EmployeeState::new(
                Arc::new(service),
                config.page_limits,
            )))
        }
        ServiceKind::Departments => {
            let employees = HttpEmployeeDirectory::new(
                config.employee_service_url.clone(),
                config.remote_timeout,
            )
            .map_err(|err| peer_error("employee service", err))?;
            let service = DepartmentService::new(
                Arc::new(MemoryDepartmentRepository::default()),
                Arc::new(employees),
                idempotency,
                clock,
            )
            .with_deletion_policy(config.department_delete_policy);
            ApiState::Departments(web::Data::new(DepartmentState::new(
                Arc::new(service),
                config.page_limits,
            )))
        }
        ServiceKind::Projects => {
            let employees = HttpEmployeeDirectory::new(
                config.employee_service_url.clone(),
                config.remote_timeout,
            )
            .map_err(|err| peer_error("employee service", err))?;
            let store = Arc::new(MemoryProjectStore::default());
            let projects = ProjectService::new(
                Arc::clone(&store),
                Arc::clone(&store),
                Arc::clone(&idempotency),
                Arc::clone(&clock),
            );
            let members = MemberService::new(
                Arc::clone(&store),
                store,
                Arc::new(employees),
                idempotency,
                clock,
            )
            .with_reference_policy(config.reference_check_policy);
            ApiState::Projects(web::Data::new(ProjectState::new(
                ProjectStatePorts {
                    projects: Arc::new(projects),
                    members: Arc::new(members),
                },
                config.page_limits,
            )))
        }
    };
    Ok(state)
}
