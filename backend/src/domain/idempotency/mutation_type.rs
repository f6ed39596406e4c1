//! Mutation type discriminators for idempotent creations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The creation protected by an idempotency key.
///
/// Keys are scoped per mutation so the same token sent to two different
/// endpoints never replays the wrong record.
///
/// # Example
///
/// ```
/// # use staffing::domain::idempotency::MutationType;
/// assert_eq!(MutationType::CreateEmployee.as_str(), "create_employee");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationType {
    /// `POST /api/v1/employees`.
    CreateEmployee,
    /// `POST /api/v1/departments`.
    CreateDepartment,
    /// `POST /api/v1/projects`.
    CreateProject,
    /// `POST /api/v1/projects/{id}/members`.
    AddProjectMember,
}

impl MutationType {
    /// All mutation type variants.
    pub const ALL: [Self; 4] = [
        Self::CreateEmployee,
        Self::CreateDepartment,
        Self::CreateProject,
        Self::AddProjectMember,
    ];

    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateEmployee => "create_employee",
            Self::CreateDepartment => "create_department",
            Self::CreateProject => "create_project",
            Self::AddProjectMember => "add_project_member",
        }
    }
}

impl fmt::Display for MutationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
