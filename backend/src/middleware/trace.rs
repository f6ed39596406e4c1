//! Tracing middleware attaching a request-scoped trace identifier.
//!
//! Each incoming request adopts the caller's `trace-id` header when it is a
//! well-formed UUID, otherwise a fresh one is generated. The identifier is
//! stored in task-local storage for correlation across logs, error responses
//! and outbound peer calls. The request path and the time the request was
//! received are scoped alongside it so problem documents can name the
//! `instance` and `timestamp`.
//!
//! Tokio task-local variables are not inherited across spawned tasks. Use
//! [`TraceId::scope`] when spawning new tasks.

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use chrono::{DateTime, Utc};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use mockable::{Clock, DefaultClock};
use tokio::task_local;
use tracing::{debug, error};

use crate::domain::{TRACE_ID_HEADER, TraceId};

task_local! {
    static REQUEST: RequestContext;
}

/// What the error renderer needs to know about the request in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Request path, reported as the problem `instance`.
    pub path: String,
    /// When the request reached the service.
    pub received_at: DateTime<Utc>,
}

impl RequestContext {
    /// Context of the request being handled, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        REQUEST.try_with(Clone::clone).ok()
    }

    /// Run `fut` with `context` in scope.
    pub async fn scope<Fut>(context: RequestContext, fut: Fut) -> Fut::Output
    where
        Fut: std::future::Future,
    {
        REQUEST.scope(context, fut).await
    }
}

fn incoming_trace_id(req: &ServiceRequest) -> Option<TraceId> {
    req.headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(TraceId::from_header)
}

/// Tracing middleware attaching a request-scoped UUID and adding a
/// `trace-id` header to every response.
///
/// Handlers can read the trace ID via [`TraceId::current`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use staffing::Trace;
///
/// let app = App::new().wrap(Trace::default());
/// ```
#[derive(Clone)]
pub struct Trace {
    clock: Arc<dyn Clock>,
}

impl Trace {
    /// Stamp requests using `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for Trace {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware {
            service,
            clock: Arc::clone(&self.clock),
        }))
    }
}

/// Service wrapper produced by [`Trace`].
///
/// Applications should not use this type directly.
pub struct TraceMiddleware<S> {
    service: S,
    clock: Arc<dyn Clock>,
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = incoming_trace_id(&req).unwrap_or_else(TraceId::generate);
        let context = RequestContext {
            path: req.path().to_owned(),
            received_at: self.clock.utc(),
        };
        let method = req.method().clone();
        let header_value = trace_id.to_string();
        // The inner call must start inside the scope so extractors and
        // handlers observe the trace identifier.
        let service_call = TraceId::scope(
            trace_id,
            RequestContext::scope(context.clone(), self.service.call(req)),
        );
        Box::pin(TraceId::scope(
            trace_id,
            RequestContext::scope(context, async move {
                let mut res = service_call.await?;
                debug!(
                    %method,
                    path = res.request().path(),
                    status = res.status().as_u16(),
                    "request completed"
                );
                match HeaderValue::from_str(&header_value) {
                    Ok(value) => {
                        res.response_mut()
                            .headers_mut()
                            .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                    }
                    Err(error) => {
                        error!(
                            %error,
                            trace_id = %trace_id,
                            "failed to encode trace identifier header"
                        );
                    }
                }
                Ok(res)
            }),
        ))
    }
}
