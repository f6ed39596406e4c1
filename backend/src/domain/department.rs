//! Department records owned by the department service.

use std::cmp::Ordering;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use pagination::SortKey;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ports::DepartmentSummary;
use super::uniqueness::contains_folded;
use super::validation::{FieldChecks, Text};
use super::{DepartmentId, Error};

static CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9-]+$").expect("valid regex"));

const NAME: Text = Text::max(120);
const DESCRIPTION: Text = Text::max(2000);
const LOCATION: Text = Text::max(100);

fn code_rule() -> Text {
    Text::between(2, 20).pattern(
        &CODE,
        "must contain only uppercase letters, digits and hyphens",
    )
}

fn manager_email_rule() -> Text {
    Text::max(200).email()
}

/// A stored department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub manager_email: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Department {
    /// Materialise a validated draft under a freshly assigned identity.
    #[must_use]
    pub fn from_draft(id: DepartmentId, draft: DepartmentDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            code: draft.code,
            description: draft.description,
            manager_email: draft.manager_email,
            location: draft.location,
            created_at: now,
            updated_at: now,
        }
    }

    /// Full replacement; optional fields missing from the draft are cleared.
    pub fn replace_with(&mut self, draft: DepartmentDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.code = draft.code;
        self.description = draft.description;
        self.manager_email = draft.manager_email;
        self.location = draft.location;
        self.updated_at = now;
    }

    /// Partial update.
    pub fn apply(&mut self, changes: DepartmentChanges, now: DateTime<Utc>) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(code) = changes.code {
            self.code = code;
        }
        if changes.description.is_some() {
            self.description = changes.description;
        }
        if changes.manager_email.is_some() {
            self.manager_email = changes.manager_email;
        }
        if changes.location.is_some() {
            self.location = changes.location;
        }
        self.updated_at = now;
    }

    /// Public detail shape served to peer services.
    #[must_use]
    pub fn summary(&self) -> DepartmentSummary {
        DepartmentSummary {
            id: self.id,
            name: self.name.clone(),
            code: self.code.clone(),
            location: self.location.clone(),
        }
    }
}

/// Loosely typed department body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub manager_email: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Shape-checked body for create and full update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentDraft {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub manager_email: Option<String>,
    pub location: Option<String>,
}

/// Shape-checked patch; `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentChanges {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub manager_email: Option<String>,
    pub location: Option<String>,
}

impl DepartmentInput {
    /// Check the shape of a create or full-update body.
    ///
    /// # Errors
    /// Returns an `InvalidRequest` error listing every offending field.
    pub fn into_draft(self) -> Result<DepartmentDraft, Error> {
        let mut checks = FieldChecks::default();
        let name = checks.required_text("name", self.name, NAME);
        let code = checks.required_text("code", self.code, code_rule());
        let description = checks.optional_text("description", self.description, DESCRIPTION);
        let manager_email =
            checks.optional_text("managerEmail", self.manager_email, manager_email_rule());
        let location = checks.optional_text("location", self.location, LOCATION);

        match (name, code) {
            (Some(name), Some(code)) if checks.is_clean() => Ok(DepartmentDraft {
                name,
                code,
                description,
                manager_email,
                location,
            }),
            _ => Err(checks.into_error()),
        }
    }

    /// Check the shape of a patch body; blank text counts as absent.
    ///
    /// # Errors
    /// Returns an `InvalidRequest` error listing every offending field.
    pub fn into_changes(self) -> Result<DepartmentChanges, Error> {
        let mut checks = FieldChecks::default();
        let changes = DepartmentChanges {
            name: checks.optional_text("name", self.name, NAME),
            code: checks.optional_text("code", self.code, code_rule()),
            description: checks.optional_text("description", self.description, DESCRIPTION),
            manager_email: checks.optional_text(
                "managerEmail",
                self.manager_email,
                manager_email_rule(),
            ),
            location: checks.optional_text("location", self.location, LOCATION),
        };
        checks.finish().map(|()| changes)
    }
}

/// Sortable department fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartmentSortField {
    Id,
    Name,
    Code,
    Location,
    CreatedAt,
}

impl SortKey for DepartmentSortField {
    const IDENTITY: Self = Self::Id;

    fn parse(field: &str) -> Option<Self> {
        match field {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "code" => Some(Self::Code),
            "location" => Some(Self::Location),
            "createdAt" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Code => "code",
            Self::Location => "location",
            Self::CreatedAt => "createdAt",
        }
    }
}

impl DepartmentSortField {
    /// Ascending comparison of two departments on this field.
    #[must_use]
    pub fn compare(self, left: &Department, right: &Department) -> Ordering {
        match self {
            Self::Id => left.id.cmp(&right.id),
            Self::Name => left.name.cmp(&right.name),
            Self::Code => left.code.cmp(&right.code),
            Self::Location => left.location.cmp(&right.location),
            Self::CreatedAt => left.created_at.cmp(&right.created_at),
        }
    }
}

/// Optional list filters; every present filter must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentFilter {
    pub name: Option<String>,
    pub code: Option<String>,
    /// Free text over name, code and description.
    pub query: Option<String>,
}

impl DepartmentFilter {
    /// Filter used by the search endpoint.
    #[must_use]
    pub fn search(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    /// Whether `department` passes every present filter.
    #[must_use]
    pub fn matches(&self, department: &Department) -> bool {
        let name = self
            .name
            .as_deref()
            .is_none_or(|needle| contains_folded(&department.name, needle));
        let code = self
            .code
            .as_deref()
            .is_none_or(|needle| contains_folded(&department.code, needle));
        let query = self.query.as_deref().is_none_or(|needle| {
            contains_folded(&department.name, needle)
                || contains_folded(&department.code, needle)
                || department
                    .description
                    .as_deref()
                    .is_some_and(|text| contains_folded(text, needle))
        });
        name && code && query
    }
}
