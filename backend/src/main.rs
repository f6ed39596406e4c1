//! Staffing entry-point: loads settings and serves the selected record
//! service.

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};

use staffing::inbound::http::health::HealthState;
use staffing::server::{ServerConfig, create_server};
use staffing::settings::StaffingSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = StaffingSettings::load_from_iter(std::env::args_os()).map_err(|e| {
        error!(error = %e, "failed to load configuration");
        std::io::Error::other(e.to_string())
    })?;
    let config = ServerConfig::from_settings(&settings).map_err(|e| {
        error!(error = %e, "invalid configuration");
        std::io::Error::other(e)
    })?;

    #[cfg(feature = "metrics")]
    let config = {
        let prometheus = staffing::server::prometheus_metrics(config.service())?;
        config.with_metrics(Some(prometheus))
    };

    let health_state = web::Data::new(HealthState::new(config.service().as_str()));
    let server = create_server(health_state.clone(), config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
