//! Shared helpers for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`. The
//! helpers here start real record services on ephemeral loopback ports and
//! wire them to each other, so cross-service references travel over HTTP
//! exactly as they do in a deployment.

use std::net::TcpListener;

use actix_web::{App, HttpResponse, HttpServer, web};
use reqwest::{Client, Response};
use serde_json::Value;
use staffing::inbound::http::health::HealthState;
use staffing::server::{ServerConfig, create_server};
use staffing::settings::StaffingSettings;
use url::Url;

/// A bound listener and the base URL that reaches it.
pub struct Endpoint {
    listener: TcpListener,
    url: Url,
}

impl Endpoint {
    /// Reserve an ephemeral loopback port.
    pub fn reserve() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local address");
        let url = Url::parse(&format!("http://{addr}")).expect("valid base url");
        Self { listener, url }
    }

    /// Base URL of this endpoint.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Base URL of a port nothing listens on.
pub fn unreachable_url() -> Url {
    Endpoint::reserve().url
}

/// Start a fake peer answering every request with `status` and an empty
/// JSON object, returning its base URL.
pub fn failing_peer(status: u16) -> Url {
    let endpoint = Endpoint::reserve();
    let server = HttpServer::new(move || {
        App::new().default_service(web::to(move || async move {
            let code = actix_web::http::StatusCode::from_u16(status).expect("valid status");
            HttpResponse::build(code).json(serde_json::json!({}))
        }))
    })
    .workers(1)
    .listen(endpoint.listener)
    .expect("fake peer listens")
    .run();
    actix_web::rt::spawn(server);
    endpoint.url
}

/// Where each peer service can be reached.
#[derive(Clone)]
pub struct Peers {
    pub employees: Url,
    pub departments: Url,
}

/// Start `service` on `endpoint`, returning its base URL.
///
/// `tune` adjusts the settings before the server is built, e.g. to change a
/// failure policy.
pub fn start(
    service: &str,
    endpoint: Endpoint,
    peers: &Peers,
    tune: impl FnOnce(&mut StaffingSettings),
) -> Url {
    let mut settings = StaffingSettings {
        service: Some(service.to_owned()),
        remote_timeout_ms: 500,
        ..StaffingSettings::default()
    };
    tune(&mut settings);
    let config = ServerConfig::from_settings(&settings)
        .expect("valid settings")
        .with_listener(endpoint.listener)
        .with_employee_service_url(peers.employees.clone())
        .with_department_service_url(peers.departments.clone());
    let health = web::Data::new(HealthState::new(config.service().as_str()));
    let server = create_server(health, config).expect("server starts");
    actix_web::rt::spawn(server);
    endpoint.url
}

/// Base URLs of a running set of services.
pub struct Cluster {
    pub employees: Url,
    pub departments: Url,
    pub projects: Url,
}

/// Start all three services wired to each other.
pub fn start_cluster() -> Cluster {
    let employees = Endpoint::reserve();
    let departments = Endpoint::reserve();
    let projects = Endpoint::reserve();
    let peers = Peers {
        employees: employees.url().clone(),
        departments: departments.url().clone(),
    };
    Cluster {
        employees: start("employees", employees, &peers, |_| {}),
        departments: start("departments", departments, &peers, |_| {}),
        projects: start("projects", projects, &peers, |_| {}),
    }
}

/// Resolve `path` against `base`.
pub fn at(base: &Url, path: &str) -> Url {
    base.join(path).expect("valid path")
}

/// POST a JSON body, optionally carrying an idempotency key.
pub async fn post(client: &Client, url: Url, body: &Value, key: Option<&str>) -> Response {
    let mut request = client.post(url).json(body);
    if let Some(key) = key {
        request = request.header("Idempotency-Key", key);
    }
    request.send().await.expect("request completes")
}

/// POST a JSON body that must create a record; returns the record.
pub async fn create(client: &Client, url: Url, body: &Value) -> Value {
    let response = post(client, url, body, None).await;
    assert_eq!(response.status().as_u16(), 201, "record should be created");
    response.json().await.expect("json body")
}

/// GET a URL and decode its JSON body alongside the status.
pub async fn get(client: &Client, url: Url) -> (u16, Value) {
    let response = client.get(url).send().await.expect("request completes");
    let status = response.status().as_u16();
    let body = response.json().await.expect("json body");
    (status, body)
}

/// DELETE a URL, returning the status and any JSON body.
pub async fn delete(client: &Client, url: Url) -> (u16, Value) {
    let response = client.delete(url).send().await.expect("request completes");
    let status = response.status().as_u16();
    let bytes = response.bytes().await.expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

/// The `type` slug of a problem document.
pub fn slug(problem: &Value) -> &str {
    problem["type"]
        .as_str()
        .and_then(|uri| uri.rsplit('/').next())
        .unwrap_or_default()
}
