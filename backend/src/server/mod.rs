//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::ServerConfig;
#[cfg(feature = "metrics")]
pub use metrics::prometheus_metrics;

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;
use state_builders::{ApiState, build_api_state};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::Trace;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::IdempotencyStore;
use crate::inbound::http::error::{json_config, path_config, query_config};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::outbound::cache::MokaIdempotencyStore;

/// Build the idempotency cache, reporting to Prometheus when a registry is
/// configured.
///
/// # Errors
/// Returns [`std::io::Error`] if metric registration fails.
#[cfg(feature = "metrics")]
fn build_idempotency_store(config: &ServerConfig) -> std::io::Result<Arc<dyn IdempotencyStore>> {
    use crate::outbound::metrics::PrometheusIdempotencyMetrics;

    match &config.prometheus {
        Some(prom) => {
            let metrics = PrometheusIdempotencyMetrics::new(&prom.registry).map_err(|e| {
                std::io::Error::other(format!("idempotency metrics registration failed: {e}"))
            })?;
            Ok(Arc::new(MokaIdempotencyStore::with_metrics(
                config.idempotency,
                Arc::new(metrics),
            )))
        }
        None => Ok(Arc::new(MokaIdempotencyStore::new(config.idempotency))),
    }
}

/// Build the idempotency cache without metrics.
#[cfg(not(feature = "metrics"))]
fn build_idempotency_store(config: &ServerConfig) -> std::io::Result<Arc<dyn IdempotencyStore>> {
    Ok(Arc::new(MokaIdempotencyStore::new(config.idempotency)))
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    api_state: ApiState,
    clock: Arc<dyn Clock>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        api_state,
        clock,
    } = deps;

    let api = web::scope("/api/v1").configure(|cfg| api_state.register(cfg));

    let app = App::new()
        .app_data(health_state)
        .app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .wrap(Trace::new(clock))
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server for the configured record service.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: resolved [`ServerConfig`] naming the service, peers and limits.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when a peer client cannot be built or the
/// socket cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let idempotency = build_idempotency_store(&config)?;
    let api_state = build_api_state(&config, idempotency, Arc::clone(&clock))?;
    let service = config.service;
    let ServerConfig {
        bind_addr,
        listener,
        #[cfg(feature = "metrics")]
        prometheus,
        ..
    } = config;

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(prometheus);

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            api_state: api_state.clone(),
            clock: Arc::clone(&clock),
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    });

    let server = match listener {
        Some(listener) => server.listen(listener)?,
        None => server.bind(bind_addr)?,
    };
    let addrs = server.addrs();
    let server = server.run();

    info!(service = service.as_str(), ?addrs, "listening");
    health_state.mark_ready();
    Ok(server)
}
