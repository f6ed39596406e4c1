//! Project membership rows.
//!
//! A member belongs to exactly one project (same service, removed with it)
//! and refers to an employee owned by the employee service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enrichment::Enrichable;
use super::ports::EmployeeSummary;
use super::reference::Detail;
use super::validation::{FieldChecks, Text};
use super::{EmployeeId, Error, FieldViolation, MemberId, ProjectId};

const ROLE: Text = Text::between(2, 60);

/// A stored membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    /// Identity assigned by the store.
    pub id: MemberId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Employee held by the employee service.
    pub employee_id: EmployeeId,
    /// Role on the project, 2 to 60 characters.
    pub role: String,
    /// Share of the employee's time; always within 0..=100.
    pub allocation_percent: u8,
    /// When the member was added.
    pub assigned_at: DateTime<Utc>,
}

impl ProjectMember {
    /// Materialise a validated draft.
    #[must_use]
    pub fn from_draft(
        id: MemberId,
        project_id: ProjectId,
        draft: MemberDraft,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            project_id,
            employee_id: draft.employee_id,
            role: draft.role,
            allocation_percent: draft.allocation_percent,
            assigned_at: now,
        }
    }
}

/// Loosely typed body for adding one member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberInput {
    /// Employee to add; required and positive.
    #[serde(default)]
    pub employee_id: Option<i64>,
    /// Role on the project; required.
    #[serde(default)]
    pub role: Option<String>,
    /// Percentage of time allocated; required, 0 to 100.
    #[serde(default)]
    pub allocation_percent: Option<i64>,
}

/// Body for adding several members at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkMemberInput {
    /// Members to add, checked one by one.
    #[serde(default)]
    pub members: Vec<MemberInput>,
}

/// Shape-checked membership request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDraft {
    /// Employee to add.
    pub employee_id: EmployeeId,
    /// Trimmed role.
    pub role: String,
    /// Allocation within 0..=100.
    pub allocation_percent: u8,
}

impl MemberInput {
    /// Check the shape of one membership request.
    ///
    /// # Errors
    /// Returns an `InvalidRequest` error listing every offending field.
    pub fn into_draft(self) -> Result<MemberDraft, Error> {
        let mut checks = FieldChecks::default();
        let draft = self.check(&mut checks);
        match draft {
            Some(draft) if checks.is_clean() => Ok(draft),
            _ => Err(checks.into_error()),
        }
    }

    fn check(self, checks: &mut FieldChecks) -> Option<MemberDraft> {
        let employee_id = checks.required("employeeId", self.employee_id);
        let employee_id = checks.positive_id("employeeId", employee_id);
        let role = checks.required_text("role", self.role, ROLE);
        let allocation = checks.required("allocationPercent", self.allocation_percent);
        let allocation = checks
            .within("allocationPercent", allocation, 0, 100)
            .and_then(|value| u8::try_from(value).ok());

        match (employee_id, role, allocation) {
            (Some(employee_id), Some(role), Some(allocation_percent)) => Some(MemberDraft {
                employee_id: EmployeeId::new(employee_id),
                role,
                allocation_percent,
            }),
            _ => None,
        }
    }
}

impl BulkMemberInput {
    /// Check every item before any of them is processed.
    ///
    /// Violations are reported as `members[<index>].<field>`.
    ///
    /// # Errors
    /// Returns an `InvalidRequest` error when the list is empty or any item
    /// is malformed.
    pub fn into_drafts(self) -> Result<Vec<MemberDraft>, Error> {
        if self.members.is_empty() {
            return Err(Error::invalid_field("members", "must not be empty"));
        }
        let mut violations = Vec::new();
        let mut drafts = Vec::with_capacity(self.members.len());
        for (index, member) in self.members.into_iter().enumerate() {
            match member.into_draft() {
                Ok(draft) => drafts.push(draft),
                Err(err) => violations.extend(err.errors().iter().map(|violation| {
                    FieldViolation::new(
                        format!("members[{index}].{}", violation.field),
                        violation.message.clone(),
                    )
                })),
            }
        }
        if violations.is_empty() {
            Ok(drafts)
        } else {
            Err(Error::validation(violations))
        }
    }
}

/// Member with its employee detail, when it could be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    #[serde(flatten)]
    pub member: ProjectMember,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee: Option<EmployeeSummary>,
}

impl MemberView {
    /// View without employee detail.
    #[must_use]
    pub fn bare(member: ProjectMember) -> Self {
        Self {
            member,
            employee: None,
        }
    }
}

impl Enrichable for ProjectMember {
    type Key = EmployeeId;
    type Detail = EmployeeSummary;
    type Enriched = MemberView;

    fn reference(&self) -> Option<EmployeeId> {
        Some(self.employee_id)
    }

    fn attach(self, detail: Detail<EmployeeSummary>) -> MemberView {
        MemberView {
            member: self,
            employee: detail.into_option(),
        }
    }
}

/// Outcome for one item of a bulk add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberOperationResult {
    pub employee_id: EmployeeId,
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<ProjectMember>,
}

impl MemberOperationResult {
    /// Successful addition.
    #[must_use]
    pub fn added(member: ProjectMember) -> Self {
        Self {
            employee_id: member.employee_id,
            success: true,
            message: "Member added successfully".to_owned(),
            member: Some(member),
        }
    }

    /// Failed addition with the reason.
    #[must_use]
    pub fn failed(employee_id: EmployeeId, error: &Error) -> Self {
        Self {
            employee_id,
            success: false,
            message: error.message().to_owned(),
            member: None,
        }
    }
}

/// Aggregate outcome of a bulk add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkAddOutcome {
    pub total_processed: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub results: Vec<MemberOperationResult>,
}

impl FromIterator<MemberOperationResult> for BulkAddOutcome {
    fn from_iter<I: IntoIterator<Item = MemberOperationResult>>(iter: I) -> Self {
        let results: Vec<_> = iter.into_iter().collect();
        let success = results.iter().filter(|result| result.success).count();
        let total = results.len();
        let to_u64 = |value: usize| u64::try_from(value).unwrap_or(u64::MAX);
        Self {
            total_processed: to_u64(total),
            success_count: to_u64(success),
            error_count: to_u64(total.saturating_sub(success)),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn input(employee_id: i64, role: &str, allocation: i64) -> MemberInput {
        MemberInput {
            employee_id: Some(employee_id),
            role: Some(role.to_owned()),
            allocation_percent: Some(allocation),
        }
    }

    #[rstest]
    #[case::lower_bound(0)]
    #[case::upper_bound(100)]
    fn allocation_bounds_are_inclusive(#[case] allocation: i64) {
        let draft = input(7, "Developer", allocation).into_draft().expect("valid");
        assert_eq!(i64::from(draft.allocation_percent), allocation);
    }

    #[rstest]
    #[case::over(150)]
    #[case::negative(-1)]
    fn allocation_out_of_range_is_malformed(#[case] allocation: i64) {
        let err = input(7, "Developer", allocation)
            .into_draft()
            .expect_err("out of range");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.errors(),
            &[FieldViolation::new("allocationPercent", "must be between 0 and 100")]
        );
    }

    #[test]
    fn missing_fields_are_required() {
        let err = MemberInput::default().into_draft().expect_err("empty body");
        let fields: Vec<_> = err.errors().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["employeeId", "role", "allocationPercent"]);
    }

    #[test]
    fn bulk_reports_item_indexes() {
        let err = BulkMemberInput {
            members: vec![input(1, "Developer", 50), input(2, "x", 50)],
        }
        .into_drafts()
        .expect_err("second item malformed");
        assert_eq!(
            err.errors(),
            &[FieldViolation::new(
                "members[1].role",
                "must be between 2 and 60 characters"
            )]
        );
    }

    #[test]
    fn bulk_rejects_empty_list() {
        assert!(BulkMemberInput::default().into_drafts().is_err());
    }

    #[test]
    fn outcome_counts_results() {
        let member = ProjectMember::from_draft(
            MemberId::new(1),
            ProjectId::new(1),
            input(1, "Developer", 50).into_draft().expect("valid"),
            Utc::now(),
        );
        let outcome: BulkAddOutcome = [
            MemberOperationResult::added(member),
            MemberOperationResult::failed(EmployeeId::new(2), &Error::not_found("gone")),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            (outcome.total_processed, outcome.success_count, outcome.error_count),
            (2, 1, 1)
        );
    }
}
