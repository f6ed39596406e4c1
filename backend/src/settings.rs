//! Process configuration loaded via OrthoConfig.
//!
//! Values are layered from CLI flags, `STAFFING_*` environment variables and
//! configuration files. The peer timeout carries a layer default so an empty
//! load still resolves; other fields are optional and accessors apply their
//! defaults and clamp numeric ranges.

use std::net::SocketAddr;
use std::time::Duration;

use clap::ValueEnum;
use ortho_config::OrthoConfig;
use pagination::PageLimits;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::domain::{IdempotencyConfig, OnRemoteFailure};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_EMPLOYEE_SERVICE_URL: &str = "http://localhost:8081";
const DEFAULT_DEPARTMENT_SERVICE_URL: &str = "http://localhost:8082";
const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 2_000;
const MIN_REMOTE_TIMEOUT_MS: u64 = 100;
const MAX_REMOTE_TIMEOUT_MS: u64 = 60_000;

/// Which record service this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServiceKind {
    /// Employee records; calls the department service.
    Employees,
    /// Department records; calls the employee service.
    Departments,
    /// Project and membership records; calls the employee service.
    Projects,
}

impl ServiceKind {
    /// Lowercase label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employees => "employees",
            Self::Departments => "departments",
            Self::Projects => "projects",
        }
    }
}

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// No service was selected.
    #[error("a service must be selected with --service employees|departments|projects")]
    MissingService,
    /// A value could not be parsed or is not allowed for its key.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl SettingsError {
    fn invalid(key: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::InvalidValue {
            key,
            value: value.to_owned(),
            reason: reason.to_string(),
        }
    }
}

/// Configuration for one staffing service process.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "STAFFING")]
#[serde(default)]
pub struct StaffingSettings {
    /// Service to run: `employees`, `departments` or `projects`.
    pub service: Option<String>,
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Base URL of the employee service.
    pub employee_service_url: Option<String>,
    /// Base URL of the department service.
    pub department_service_url: Option<String>,
    /// Per-call timeout for peer requests, in milliseconds.
    #[ortho_config(default = 2_000)]
    pub remote_timeout_ms: u64,
    /// How long idempotent responses are replayed, in seconds.
    pub idempotency_ttl_secs: Option<u64>,
    /// Upper bound on cached idempotent responses.
    pub idempotency_max_entries: Option<u64>,
    /// Page size used when a request omits `size`.
    pub page_default_size: Option<u32>,
    /// Largest page size honoured.
    pub page_max_size: Option<u32>,
    /// `block` or `proceed` when the employee count for a department delete
    /// cannot be obtained.
    pub department_delete_on_remote_failure: Option<String>,
    /// `treat-as-absent` or `block` when a reference cannot be verified.
    pub reference_check_on_remote_failure: Option<String>,
}

impl Default for StaffingSettings {
    fn default() -> Self {
        Self {
            service: None,
            bind_addr: None,
            employee_service_url: None,
            department_service_url: None,
            remote_timeout_ms: DEFAULT_REMOTE_TIMEOUT_MS,
            idempotency_ttl_secs: None,
            idempotency_max_entries: None,
            page_default_size: None,
            page_max_size: None,
            department_delete_on_remote_failure: None,
            reference_check_on_remote_failure: None,
        }
    }
}

impl StaffingSettings {
    /// The selected service.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when no service is selected or the name is
    /// unknown.
    pub fn service(&self) -> Result<ServiceKind, SettingsError> {
        let raw = self
            .service
            .as_deref()
            .ok_or(SettingsError::MissingService)?;
        ServiceKind::from_str(raw.trim(), true)
            .map_err(|reason| SettingsError::invalid("service", raw, reason))
    }

    /// Listen address, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.trim()
            .parse()
            .map_err(|error| SettingsError::invalid("bind_addr", raw, error))
    }

    /// Employee service base URL.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when the URL does not parse.
    pub fn employee_service_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "employee_service_url",
            self.employee_service_url
                .as_deref()
                .unwrap_or(DEFAULT_EMPLOYEE_SERVICE_URL),
        )
    }

    /// Department service base URL.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when the URL does not parse.
    pub fn department_service_url(&self) -> Result<Url, SettingsError> {
        parse_url(
            "department_service_url",
            self.department_service_url
                .as_deref()
                .unwrap_or(DEFAULT_DEPARTMENT_SERVICE_URL),
        )
    }

    /// Peer call timeout, clamped to 100 ms ..= 60 s.
    #[must_use]
    pub fn remote_timeout(&self) -> Duration {
        let millis = self
            .remote_timeout_ms
            .clamp(MIN_REMOTE_TIMEOUT_MS, MAX_REMOTE_TIMEOUT_MS);
        Duration::from_millis(millis)
    }

    #[must_use]
    pub fn idempotency(&self) -> IdempotencyConfig {
        IdempotencyConfig::new(
            Duration::from_secs(
                self.idempotency_ttl_secs
                    .unwrap_or(IdempotencyConfig::DEFAULT_TTL_SECS),
            ),
            self.idempotency_max_entries
                .unwrap_or(IdempotencyConfig::DEFAULT_MAX_ENTRIES),
        )
    }

    #[must_use]
    pub fn page_limits(&self) -> PageLimits {
        PageLimits::new(
            self.page_default_size.unwrap_or(PageLimits::DEFAULT_SIZE),
            self.page_max_size.unwrap_or(PageLimits::MAX_SIZE),
        )
    }

    /// Department delete policy; `block` unless configured.
    ///
    /// # Errors
    /// Returns [`SettingsError`] for anything but `block` or `proceed`.
    pub fn department_delete_policy(&self) -> Result<OnRemoteFailure, SettingsError> {
        policy(
            "department_delete_on_remote_failure",
            self.department_delete_on_remote_failure.as_deref(),
            OnRemoteFailure::Block,
            &[OnRemoteFailure::Block, OnRemoteFailure::Proceed],
        )
    }

    /// Reference check policy; `treat-as-absent` unless configured.
    ///
    /// # Errors
    /// Returns [`SettingsError`] for anything but `treat-as-absent` or
    /// `block`.
    pub fn reference_check_policy(&self) -> Result<OnRemoteFailure, SettingsError> {
        policy(
            "reference_check_on_remote_failure",
            self.reference_check_on_remote_failure.as_deref(),
            OnRemoteFailure::TreatAsAbsent,
            &[OnRemoteFailure::TreatAsAbsent, OnRemoteFailure::Block],
        )
    }
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, SettingsError> {
    Url::parse(raw.trim()).map_err(|error| SettingsError::invalid(key, raw, error))
}

fn policy(
    key: &'static str,
    raw: Option<&str>,
    default: OnRemoteFailure,
    allowed: &[OnRemoteFailure],
) -> Result<OnRemoteFailure, SettingsError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let parsed: OnRemoteFailure = raw
        .parse()
        .map_err(|error| SettingsError::invalid(key, raw, error))?;
    if allowed.contains(&parsed) {
        Ok(parsed)
    } else {
        let expected = allowed
            .iter()
            .map(|policy| policy.as_str())
            .collect::<Vec<_>>()
            .join(" or ");
        Err(SettingsError::invalid(
            key,
            raw,
            format!("expected {expected}"),
        ))
    }
}
