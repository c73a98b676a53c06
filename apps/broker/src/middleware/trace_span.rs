//! Per-request tracing span middleware.
//!
//! Creates a span named "request" carrying `trace_id`, `client`, `method`
//! and `path`, and instruments the downstream future so every log line
//! emitted while handling the request inherits these fields. Reads the
//! `RequestContext` inserted by `RequestTrace`, so it must sit inside it.

use std::future::{ready, Ready};

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::Error;
use futures_util::future::LocalBoxFuture;
use tracing::{info_span, Instrument};

use crate::extractors::request_context::RequestContext;

#[derive(Clone, Default)]
pub struct TraceSpan;

impl<S, B> Transform<S, ServiceRequest> for TraceSpan
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceSpanMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceSpanMiddleware { service }))
    }
}

pub struct TraceSpanMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TraceSpanMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let ctx = RequestContext::of(req.request());

        let span = info_span!(
            "request",
            trace_id = %ctx.trace_id,
            client = %ctx.client_addr,
            method = %req.method(),
            path = %req.path()
        );

        let fut = {
            let _entered = span.enter();
            self.service.call(req)
        };
        Box::pin(fut.instrument(span))
    }
}
