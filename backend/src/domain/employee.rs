//! Employee records owned by the employee service.
//!
//! An employee carries an optional soft reference to a department owned by
//! the department service. The reference is validated when it is written and
//! resolved best effort when the record is read.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use pagination::SortKey;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enrichment::Enrichable;
use super::ports::{DepartmentSummary, EmployeeSummary};
use super::reference::Detail;
use super::uniqueness::contains_folded;
use super::validation::{FieldChecks, Text};
use super::{DepartmentId, EmployeeId, Error};

const NAME: Text = Text::max(120);

fn email_rule() -> Text {
    Text::max(200).email()
}

/// A stored employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department_id: Option<DepartmentId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// Materialise a validated draft under a freshly assigned identity.
    #[must_use]
    pub fn from_draft(id: EmployeeId, draft: EmployeeDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            department_id: draft.department_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Full replacement; only the identity and creation time survive.
    pub fn replace_with(&mut self, draft: EmployeeDraft, now: DateTime<Utc>) {
        self.first_name = draft.first_name;
        self.last_name = draft.last_name;
        self.email = draft.email;
        self.department_id = draft.department_id;
        self.updated_at = now;
    }

    /// Partial update; fields absent from `changes` are left as they are.
    pub fn apply(&mut self, changes: EmployeeChanges, now: DateTime<Utc>) {
        if let Some(first_name) = changes.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            self.last_name = last_name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(department_id) = changes.department_id {
            self.department_id = Some(department_id);
        }
        self.updated_at = now;
    }

    /// Public detail shape served to peer services.
    #[must_use]
    pub fn summary(&self) -> EmployeeSummary {
        EmployeeSummary {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            department_id: self.department_id,
        }
    }
}

/// Loosely typed employee body as received from callers.
///
/// Used for create, full update and patch; the operation decides which
/// fields are mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department_id: Option<i64>,
}

/// Shape-checked body for create and full update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department_id: Option<DepartmentId>,
}

/// Shape-checked patch; `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub department_id: Option<DepartmentId>,
}

impl EmployeeInput {
    /// Check the shape of a create or full-update body.
    ///
    /// # Errors
    /// Returns an `InvalidRequest` error listing every offending field.
    pub fn into_draft(self) -> Result<EmployeeDraft, Error> {
        let mut checks = FieldChecks::default();
        let first_name = checks.required_text("firstName", self.first_name, NAME);
        let last_name = checks.required_text("lastName", self.last_name, NAME);
        let email = checks.required_text("email", self.email, email_rule());
        let department_id = checks.positive_id("departmentId", self.department_id);

        match (first_name, last_name, email) {
            (Some(first_name), Some(last_name), Some(email)) if checks.is_clean() => {
                Ok(EmployeeDraft {
                    first_name,
                    last_name,
                    email,
                    department_id: department_id.map(DepartmentId::new),
                })
            }
            _ => Err(checks.into_error()),
        }
    }

    /// Check the shape of a patch body; blank text counts as absent.
    ///
    /// # Errors
    /// Returns an `InvalidRequest` error listing every offending field.
    pub fn into_changes(self) -> Result<EmployeeChanges, Error> {
        let mut checks = FieldChecks::default();
        let changes = EmployeeChanges {
            first_name: checks.optional_text("firstName", self.first_name, NAME),
            last_name: checks.optional_text("lastName", self.last_name, NAME),
            email: checks.optional_text("email", self.email, email_rule()),
            department_id: checks
                .positive_id("departmentId", self.department_id)
                .map(DepartmentId::new),
        };
        checks.finish().map(|()| changes)
    }
}

/// Sortable employee fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeSortField {
    Id,
    FirstName,
    LastName,
    Email,
    DepartmentId,
    CreatedAt,
}

impl SortKey for EmployeeSortField {
    const IDENTITY: Self = Self::Id;

    fn parse(field: &str) -> Option<Self> {
        match field {
            "id" => Some(Self::Id),
            "firstName" => Some(Self::FirstName),
            "lastName" => Some(Self::LastName),
            "email" => Some(Self::Email),
            "departmentId" => Some(Self::DepartmentId),
            "createdAt" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::DepartmentId => "departmentId",
            Self::CreatedAt => "createdAt",
        }
    }
}

impl EmployeeSortField {
    /// Ascending comparison of two employees on this field.
    #[must_use]
    pub fn compare(self, left: &Employee, right: &Employee) -> Ordering {
        match self {
            Self::Id => left.id.cmp(&right.id),
            Self::FirstName => left.first_name.cmp(&right.first_name),
            Self::LastName => left.last_name.cmp(&right.last_name),
            Self::Email => left.email.cmp(&right.email),
            Self::DepartmentId => left.department_id.cmp(&right.department_id),
            Self::CreatedAt => left.created_at.cmp(&right.created_at),
        }
    }
}

/// Optional list filters; every present filter must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    /// Email contains, case-insensitive.
    pub email: Option<String>,
    /// Last name contains, case-insensitive.
    pub last_name: Option<String>,
    /// Exact department reference.
    pub department_id: Option<DepartmentId>,
    /// Free text over first name, last name and email.
    pub query: Option<String>,
}

impl EmployeeFilter {
    /// Filter used by the search endpoint.
    #[must_use]
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    /// Whether `employee` passes every present filter.
    #[must_use]
    pub fn matches(&self, employee: &Employee) -> bool {
        let email = self
            .email
            .as_deref()
            .is_none_or(|needle| contains_folded(&employee.email, needle));
        let last_name = self
            .last_name
            .as_deref()
            .is_none_or(|needle| contains_folded(&employee.last_name, needle));
        let department = self
            .department_id
            .is_none_or(|id| employee.department_id == Some(id));
        let query = self.query.as_deref().is_none_or(|needle| {
            contains_folded(&employee.first_name, needle)
                || contains_folded(&employee.last_name, needle)
                || contains_folded(&employee.email, needle)
        });
        email && last_name && department && query
    }
}

/// Employee with its department detail, when it could be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeView {
    #[serde(flatten)]
    pub employee: Employee,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<DepartmentSummary>,
}

impl EmployeeView {
    /// View without any department detail.
    #[must_use]
    pub fn bare(employee: Employee) -> Self {
        Self {
            employee,
            department: None,
        }
    }
}

impl Enrichable for Employee {
    type Key = DepartmentId;
    type Detail = DepartmentSummary;
    type Enriched = EmployeeView;

    fn reference(&self) -> Option<DepartmentId> {
        self.department_id
    }

    fn attach(self, detail: Detail<DepartmentSummary>) -> EmployeeView {
        EmployeeView {
            employee: self,
            department: detail.into_option(),
        }
    }
}

/// Head count for one department reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentCount {
    /// `None` groups employees without a department.
    pub department_id: Option<DepartmentId>,
    pub count: u64,
    /// Resolved from the department service; absent when unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
}

impl Enrichable for DepartmentCount {
    type Key = DepartmentId;
    type Detail = DepartmentSummary;
    type Enriched = Self;

    fn reference(&self) -> Option<DepartmentId> {
        self.department_id
    }

    fn attach(mut self, detail: Detail<DepartmentSummary>) -> Self {
        self.department_name = detail.into_option().map(|department| department.name);
        self
    }
}

/// Aggregate head counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStats {
    pub total_employees: u64,
    pub counts_by_department: Vec<DepartmentCount>,
}
