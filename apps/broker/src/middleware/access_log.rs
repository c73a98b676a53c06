use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::Error as ActixError;
use futures_util::future::LocalBoxFuture;
use tracing::Level;

use crate::extractors::request_context::RequestContext;

/// Logs a single `request served` line per call to the broker, carrying the
/// caller's address and trace id next to the status and elapsed time.
pub struct AccessLog;

impl<S, B> Transform<S, ServiceRequest> for AccessLog
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = AccessLogMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessLogMiddleware { service }))
    }
}

pub struct AccessLogMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AccessLogMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let ctx = RequestContext::of(req.request());

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            let status = match &result {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            macro_rules! served {
                ($level:expr) => {
                    tracing::event!(
                        $level,
                        method = %method,
                        path = %path,
                        status = status.as_u16(),
                        elapsed_ms,
                        client = %ctx.client_addr,
                        trace_id = %ctx.trace_id,
                        "request served"
                    )
                };
            }

            let level = completion_level(status);
            if level == Level::ERROR {
                served!(Level::ERROR);
            } else if level == Level::WARN {
                served!(Level::WARN);
            } else {
                served!(Level::INFO);
            }

            result
        })
    }
}

/// Broker faults log at `error`, caller mistakes (bad token, denied target,
/// malformed payload) at `warn`.
fn completion_level(status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() {
        Level::WARN
    } else {
        Level::INFO
    }
}
