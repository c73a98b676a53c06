//! Caller allow-list for the proxy endpoint.
//!
//! When the management allow-list is non-empty, callers whose peer IP is
//! not on it get a 403 `FORBIDDEN_CLIENT` before any token handling. An
//! empty list lets everyone through.

use std::future::{ready, Ready};

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, ResponseError};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::error::AppError;
use crate::extractors::request_context::RequestContext;
use crate::state::app_state::AppState;

pub struct ManagementGuard;

impl<S, B> Transform<S, ServiceRequest> for ManagementGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ManagementGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ManagementGuardMiddleware { service }))
    }
}

pub struct ManagementGuardMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for ManagementGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let client = RequestContext::of(req.request()).client_addr;
        let permitted = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.allowed_management_ips.permits(&client))
            .unwrap_or(true);

        if !permitted {
            warn!(client = %client, "caller not in management allow-list");
            let response = AppError::forbidden_client().error_response();
            let res = req.into_response(response).map_into_right_body();
            return Box::pin(async move { Ok(res) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
