use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    HttpMessage,
};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use uuid::Uuid;

use crate::extractors::request_context::{peer_ip, RequestContext};
use crate::trace_ctx;

/// Assigns every request a trace id.
///
/// The id and the caller's address go into request extensions as a
/// [`RequestContext`], the id is installed as the task-local trace id for
/// the rest of the chain, and it is echoed back in `x-request-id`.
/// Install it outermost so every other middleware sees the context.
pub struct RequestTrace;

impl<S, B> Transform<S, ServiceRequest> for RequestTrace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequestTraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTraceMiddleware { service }))
    }
}

pub struct RequestTraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestTraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = Uuid::new_v4().to_string();

        req.extensions_mut().insert(RequestContext {
            trace_id: trace_id.clone(),
            client_addr: peer_ip(req.peer_addr()),
        });

        // Inner middleware may build responses synchronously in `call`.
        let fut = trace_ctx::sync_with_trace_id(trace_id.clone(), || self.service.call(req));

        Box::pin(trace_ctx::with_trace_id(trace_id.clone(), async move {
            let mut res = fut.await?;

            res.headers_mut().insert(
                header::HeaderName::from_static("x-request-id"),
                header::HeaderValue::from_str(&trace_id)
                    .unwrap_or_else(|_| header::HeaderValue::from_static("invalid-uuid")),
            );

            Ok(res)
        }))
    }
}
