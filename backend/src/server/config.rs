//! HTTP server configuration object and helpers.

use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;
use pagination::PageLimits;
use url::Url;

use crate::domain::{IdempotencyConfig, OnRemoteFailure};
use crate::settings::{ServiceKind, SettingsError, StaffingSettings};

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) service: ServiceKind,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) listener: Option<TcpListener>,
    pub(crate) employee_service_url: Url,
    pub(crate) department_service_url: Url,
    pub(crate) remote_timeout: Duration,
    pub(crate) idempotency: IdempotencyConfig,
    pub(crate) page_limits: PageLimits,
    pub(crate) department_delete_policy: OnRemoteFailure,
    pub(crate) reference_check_policy: OnRemoteFailure,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Resolve every setting the selected service needs.
    ///
    /// # Errors
    /// Returns [`SettingsError`] when a value is missing or malformed.
    pub fn from_settings(settings: &StaffingSettings) -> Result<Self, SettingsError> {
        Ok(Self {
            service: settings.service()?,
            bind_addr: settings.bind_addr()?,
            listener: None,
            employee_service_url: settings.employee_service_url()?,
            department_service_url: settings.department_service_url()?,
            remote_timeout: settings.remote_timeout(),
            idempotency: settings.idempotency(),
            page_limits: settings.page_limits(),
            department_delete_policy: settings.department_delete_policy()?,
            reference_check_policy: settings.reference_check_policy()?,
            #[cfg(feature = "metrics")]
            prometheus: None,
        })
    }

    /// Serve on an already bound listener instead of `bind_addr`.
    ///
    /// Tests bind `127.0.0.1:0` and pass the listener so the chosen port is
    /// known before the server starts.
    #[must_use]
    pub fn with_listener(mut self, listener: TcpListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Point the employee directory at `url`.
    #[must_use]
    pub fn with_employee_service_url(mut self, url: Url) -> Self {
        self.employee_service_url = url;
        self
    }

    /// Point the department directory at `url`.
    #[must_use]
    pub fn with_department_service_url(mut self, url: Url) -> Self {
        self.department_service_url = url;
        self
    }

    /// The record service this configuration runs.
    #[must_use]
    pub fn service(&self) -> ServiceKind {
        self.service
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }

    #[cfg(feature = "metrics")]
    /// Return the configured Prometheus middleware, if any.
    #[must_use]
    pub fn metrics(&self) -> Option<&PrometheusMetrics> {
        self.prometheus.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn settings(service: &str) -> StaffingSettings {
        StaffingSettings {
            service: Some(service.to_owned()),
            bind_addr: Some("127.0.0.1:9090".to_owned()),
            ..StaffingSettings::default()
        }
    }

    #[rstest]
    fn resolves_service_and_defaults() {
        let config = ServerConfig::from_settings(&settings("Projects")).expect("valid settings");

        assert_eq!(config.service(), ServiceKind::Projects);
        assert_eq!(config.bind_addr().port(), 9090);
        assert_eq!(config.department_delete_policy, OnRemoteFailure::Block);
        assert_eq!(config.reference_check_policy, OnRemoteFailure::TreatAsAbsent);
        assert!(config.listener.is_none());
    }

    #[rstest]
    fn rejects_malformed_peer_url() {
        let mut raw = settings("employees");
        raw.department_service_url = Some("not a url".to_owned());

        let result = ServerConfig::from_settings(&raw);

        assert!(matches!(
            result,
            Err(SettingsError::InvalidValue {
                key: "department_service_url",
                ..
            })
        ));
    }

    #[rstest]
    fn peer_urls_can_be_overridden() {
        let url = Url::parse("http://127.0.0.1:4000").expect("valid url");
        let config = ServerConfig::from_settings(&settings("departments"))
            .expect("valid settings")
            .with_employee_service_url(url.clone());

        assert_eq!(config.employee_service_url, url);
    }
}
