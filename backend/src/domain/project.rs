//! Project records owned by the project service.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use pagination::SortKey;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::member::ProjectMember;
use super::uniqueness::contains_folded;
use super::validation::{FieldChecks, Text};
use super::{Error, ProjectId};

static CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9-]{3,20}$").expect("valid regex"));

const NAME: Text = Text::between(3, 120);
const DESCRIPTION: Text = Text::max(2000);

fn code_rule() -> Text {
    Text::max(20).pattern(
        &CODE,
        "must be 3-20 characters of uppercase letters, digits and hyphens",
    )
}

/// Lifecycle status of a project.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    #[default]
    Planned,
    Active,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Planned,
        Self::Active,
        Self::OnHold,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Wire label, e.g. `ON_HOLD`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "PLANNED",
            Self::Active => "ACTIVE",
            Self::OnHold => "ON_HOLD",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                Error::invalid_field(
                    "status",
                    "must be one of PLANNED, ACTIVE, ON_HOLD, COMPLETED, CANCELLED",
                )
            })
    }
}

/// A stored project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Materialise a validated draft under a freshly assigned identity.
    #[must_use]
    pub fn from_draft(id: ProjectId, draft: ProjectDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            code: draft.code,
            name: draft.name,
            description: draft.description,
            status: draft.status,
            start_date: draft.start_date,
            end_date: draft.end_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Full replacement.
    pub fn replace_with(&mut self, draft: ProjectDraft, now: DateTime<Utc>) {
        self.code = draft.code;
        self.name = draft.name;
        self.description = draft.description;
        self.status = draft.status;
        self.start_date = draft.start_date;
        self.end_date = draft.end_date;
        self.updated_at = now;
    }

    /// Partial update, re-checking the date range against the merged record.
    ///
    /// # Errors
    /// Returns an `InvalidRequest` error when the merged end date precedes
    /// the start date; `self` is left untouched in that case.
    pub fn apply(&mut self, changes: ProjectChanges, now: DateTime<Utc>) -> Result<(), Error> {
        let start_date = changes.start_date.unwrap_or(self.start_date);
        let end_date = changes.end_date.or(self.end_date);
        check_date_range(start_date, end_date)?;

        if let Some(code) = changes.code {
            self.code = code;
        }
        if let Some(name) = changes.name {
            self.name = name;
        }
        if changes.description.is_some() {
            self.description = changes.description;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        self.start_date = start_date;
        self.end_date = end_date;
        self.updated_at = now;
        Ok(())
    }
}

fn check_date_range(start: NaiveDate, end: Option<NaiveDate>) -> Result<(), Error> {
    match end {
        Some(end) if end < start => Err(Error::invalid_field(
            "endDate",
            "must be on or after startDate",
        )),
        _ => Ok(()),
    }
}

/// Loosely typed project body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// One of PLANNED, ACTIVE, ON_HOLD, COMPLETED, CANCELLED.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Shape-checked body for create and full update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Shape-checked patch; `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectChanges {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

fn parse_status(checks: &mut FieldChecks, raw: Option<String>) -> Option<ProjectStatus> {
    let raw = raw.filter(|value| !value.trim().is_empty())?;
    match raw.parse::<ProjectStatus>() {
        Ok(status) => Some(status),
        Err(err) => {
            checks.absorb(&err);
            None
        }
    }
}

impl ProjectInput {
    /// Check the shape of a create or full-update body.
    ///
    /// A missing status means [`ProjectStatus::Planned`].
    ///
    /// # Errors
    /// Returns an `InvalidRequest` error listing every offending field.
    pub fn into_draft(self) -> Result<ProjectDraft, Error> {
        let mut checks = FieldChecks::default();
        let code = checks.required_text("code", self.code, code_rule());
        let name = checks.required_text("name", self.name, NAME);
        let description = checks.optional_text("description", self.description, DESCRIPTION);
        let status = parse_status(&mut checks, self.status).unwrap_or_default();
        let start_date = checks.required("startDate", self.start_date);
        if let Err(err) = check_date_range_opt(start_date, self.end_date) {
            checks.absorb(&err);
        }

        match (code, name, start_date) {
            (Some(code), Some(name), Some(start_date)) if checks.is_clean() => Ok(ProjectDraft {
                code,
                name,
                description,
                status,
                start_date,
                end_date: self.end_date,
            }),
            _ => Err(checks.into_error()),
        }
    }

    /// Check the shape of a patch body; blank text counts as absent.
    ///
    /// The date range is checked later against the merged record.
    ///
    /// # Errors
    /// Returns an `InvalidRequest` error listing every offending field.
    pub fn into_changes(self) -> Result<ProjectChanges, Error> {
        let mut checks = FieldChecks::default();
        let changes = ProjectChanges {
            code: checks.optional_text("code", self.code, code_rule()),
            name: checks.optional_text("name", self.name, NAME),
            description: checks.optional_text("description", self.description, DESCRIPTION),
            status: parse_status(&mut checks, self.status),
            start_date: self.start_date,
            end_date: self.end_date,
        };
        checks.finish().map(|()| changes)
    }
}

fn check_date_range_opt(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), Error> {
    start.map_or(Ok(()), |start| check_date_range(start, end))
}

/// Sortable project fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectSortField {
    Id,
    Code,
    Name,
    Status,
    StartDate,
    EndDate,
    CreatedAt,
}

impl SortKey for ProjectSortField {
    const IDENTITY: Self = Self::Id;

    fn parse(field: &str) -> Option<Self> {
        match field {
            "id" => Some(Self::Id),
            "code" => Some(Self::Code),
            "name" => Some(Self::Name),
            "status" => Some(Self::Status),
            "startDate" => Some(Self::StartDate),
            "endDate" => Some(Self::EndDate),
            "createdAt" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Code => "code",
            Self::Name => "name",
            Self::Status => "status",
            Self::StartDate => "startDate",
            Self::EndDate => "endDate",
            Self::CreatedAt => "createdAt",
        }
    }
}

impl ProjectSortField {
    /// Ascending comparison of two projects on this field.
    #[must_use]
    pub fn compare(self, left: &Project, right: &Project) -> Ordering {
        match self {
            Self::Id => left.id.cmp(&right.id),
            Self::Code => left.code.cmp(&right.code),
            Self::Name => left.name.cmp(&right.name),
            Self::Status => left.status.cmp(&right.status),
            Self::StartDate => left.start_date.cmp(&right.start_date),
            Self::EndDate => left.end_date.cmp(&right.end_date),
            Self::CreatedAt => left.created_at.cmp(&right.created_at),
        }
    }
}

/// Optional list filters; every present filter must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    /// Start date on or after.
    pub from: Option<NaiveDate>,
    /// End date on or before; open-ended projects never match.
    pub to: Option<NaiveDate>,
    pub code: Option<String>,
    pub name: Option<String>,
}

impl ProjectFilter {
    /// Whether `project` passes every present filter.
    #[must_use]
    pub fn matches(&self, project: &Project) -> bool {
        let status = self.status.is_none_or(|status| project.status == status);
        let from = self.from.is_none_or(|from| project.start_date >= from);
        let to = self
            .to
            .is_none_or(|to| project.end_date.is_some_and(|end| end <= to));
        let code = self
            .code
            .as_deref()
            .is_none_or(|needle| contains_folded(&project.code, needle));
        let name = self
            .name
            .as_deref()
            .is_none_or(|needle| contains_folded(&project.name, needle));
        status && from && to && code && name
    }
}

/// Project together with its (unenriched) members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub members: Vec<ProjectMember>,
}

/// Grouping requested from the statistics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsGrouping {
    #[default]
    Status,
    Month,
}

impl StatsGrouping {
    /// Parse `groupBy`; absent or blank means grouping by status only.
    ///
    /// # Errors
    /// Returns an `InvalidRequest` error for any other value.
    pub fn parse(raw: Option<&str>) -> Result<Self, Error> {
        match raw.map(str::trim).filter(|value| !value.is_empty()) {
            None => Ok(Self::Status),
            Some(value) if value.eq_ignore_ascii_case("status") => Ok(Self::Status),
            Some(value) if value.eq_ignore_ascii_case("month") => Ok(Self::Month),
            Some(_) => Err(Error::invalid_field("groupBy", "must be status or month")),
        }
    }
}

/// Project counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total_projects: u64,
    pub count_by_status: BTreeMap<String, u64>,
    /// Keyed by `YYYY-MM` of the start date; only for `groupBy=month`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_by_month: Option<BTreeMap<String, u64>>,
}

impl ProjectStats {
    /// Tally `projects` under `grouping`.
    #[must_use]
    pub fn tally(projects: &[Project], grouping: StatsGrouping) -> Self {
        let mut count_by_status = BTreeMap::new();
        for project in projects {
            *count_by_status
                .entry(project.status.as_str().to_owned())
                .or_insert(0) += 1;
        }
        let count_by_month = (grouping == StatsGrouping::Month).then(|| {
            let mut months = BTreeMap::new();
            for project in projects {
                *months
                    .entry(project.start_date.format("%Y-%m").to_string())
                    .or_insert(0) += 1;
            }
            months
        });
        Self {
            total_projects: u64::try_from(projects.len()).unwrap_or(u64::MAX),
            count_by_status,
            count_by_month,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, FieldViolation};
    use rstest::rstest;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).expect("valid date")
    }

    fn input() -> ProjectInput {
        ProjectInput {
            code: Some("EMP-MGMT".to_owned()),
            name: Some("Employee Management".to_owned()),
            start_date: Some(date(1, 1)),
            ..ProjectInput::default()
        }
    }

    fn project(id: i64, status: ProjectStatus, start: NaiveDate) -> Project {
        Project {
            status,
            start_date: start,
            ..Project::from_draft(ProjectId::new(id), input().into_draft().expect("valid"), Utc::now())
        }
    }

    #[test]
    fn status_defaults_to_planned() {
        let draft = input().into_draft().expect("valid draft");
        assert_eq!(draft.status, ProjectStatus::Planned);
    }

    #[rstest]
    #[case("on_hold", ProjectStatus::OnHold)]
    #[case("ACTIVE", ProjectStatus::Active)]
    fn parses_status_labels(#[case] raw: &str, #[case] expected: ProjectStatus) {
        assert_eq!(raw.parse::<ProjectStatus>().ok(), Some(expected));
    }

    #[test]
    fn draft_rejects_shape_violations_together() {
        let err = ProjectInput {
            code: Some("x".to_owned()),
            name: Some("ab".to_owned()),
            status: Some("DONE".to_owned()),
            start_date: None,
            ..ProjectInput::default()
        }
        .into_draft()
        .expect_err("invalid project");
        let fields: Vec<_> = err.errors().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["code", "name", "status", "startDate"]);
    }

    #[test]
    fn draft_rejects_end_before_start() {
        let err = ProjectInput {
            end_date: Some(date(1, 1).pred_opt().expect("valid date")),
            ..input()
        }
        .into_draft()
        .expect_err("reversed range");
        assert_eq!(
            err.errors(),
            &[FieldViolation::new("endDate", "must be on or after startDate")]
        );
    }

    #[test]
    fn patch_checks_range_against_merged_record() {
        let mut stored = project(1, ProjectStatus::Active, date(3, 1));
        let before = stored.clone();
        let changes = ProjectInput {
            end_date: Some(date(2, 1)),
            ..ProjectInput::default()
        }
        .into_changes()
        .expect("valid patch shape");

        let err = stored.apply(changes, Utc::now()).expect_err("reversed range");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(stored, before);
    }

    #[test]
    fn to_filter_skips_open_ended_projects() {
        let filter = ProjectFilter {
            to: Some(date(12, 31)),
            ..ProjectFilter::default()
        };
        assert!(!filter.matches(&project(1, ProjectStatus::Active, date(1, 1))));
    }

    #[test]
    fn stats_group_by_month_when_asked() {
        let projects = [
            project(1, ProjectStatus::Active, date(1, 5)),
            project(2, ProjectStatus::Active, date(1, 20)),
            project(3, ProjectStatus::Planned, date(2, 1)),
        ];
        let by_status = ProjectStats::tally(&projects, StatsGrouping::Status);
        assert_eq!(by_status.count_by_status.get("ACTIVE"), Some(&2));
        assert_eq!(by_status.count_by_month, None);

        let by_month = ProjectStats::tally(&projects, StatsGrouping::Month);
        assert_eq!(
            by_month.count_by_month,
            Some(BTreeMap::from([("2024-01".to_owned(), 2), ("2024-02".to_owned(), 1)]))
        );
    }

    #[rstest]
    #[case(None, Some(StatsGrouping::Status))]
    #[case(Some("MONTH"), Some(StatsGrouping::Month))]
    #[case(Some("year"), None)]
    fn parses_grouping(#[case] raw: Option<&str>, #[case] expected: Option<StatsGrouping>) {
        assert_eq!(StatsGrouping::parse(raw).ok(), expected);
    }
}
