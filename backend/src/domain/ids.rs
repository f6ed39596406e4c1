//! Numeric identities for the records each service owns or references.

use serde::{Deserialize, Serialize};

macro_rules! define_record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            utoipa::ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw identity value.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Raw identity value.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_record_id!(
    /// Identity of an employee owned by the employee service.
    EmployeeId
);
define_record_id!(
    /// Identity of a department owned by the department service.
    DepartmentId
);
define_record_id!(
    /// Identity of a project owned by the project service.
    ProjectId
);
define_record_id!(
    /// Identity of a membership row inside a project.
    MemberId
);
