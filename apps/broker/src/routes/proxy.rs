use std::any::Any;
use std::panic::AssertUnwindSafe;

use actix_web::{web, HttpResponse};
use futures_util::{FutureExt, StreamExt};
use tracing::error;

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::{Authenticated, RequestContext};
use crate::middleware::ManagementGuard;
use crate::services::dispatcher;
use crate::state::app_state::AppState;

/// Upper bound on a proxy request body.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// `POST /vnfproxy`.
///
/// The broker answers 200 whenever a backend ran, whatever the backend
/// reported; callers read `success`/`status_code` from the body. A panic
/// anywhere in the pipeline becomes a 500 whose detail is only shown in
/// debug mode.
async fn proxy(
    state: web::Data<AppState>,
    auth: Authenticated,
    ctx: RequestContext,
    payload: web::Payload,
) -> Result<HttpResponse, AppError> {
    let body = read_body(payload, MAX_BODY_BYTES).await?;

    let outcome = AssertUnwindSafe(dispatcher::handle_proxy(
        &state,
        &auth.claims,
        &body,
        &ctx.client_addr,
    ))
    .catch_unwind()
    .await;

    match outcome {
        Ok(result) => Ok(HttpResponse::Ok().json(result?)),
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(client = %ctx.client_addr, panic = %message, "proxy request panicked");
            Err(AppError::internal(message).redact_unless(state.debug))
        }
    }
}

/// Buffer the request body, refusing it as soon as it grows past `limit`.
async fn read_body(mut payload: web::Payload, limit: usize) -> Result<web::BytesMut, AppError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| {
            AppError::bad_request(ErrorCode::InvalidJson, format!("Failed to read request body: {e}"))
        })?;
        if body.len() + chunk.len() > limit {
            return Err(AppError::payload_too_large(limit));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/vnfproxy")
            .wrap(ManagementGuard)
            .route(web::post().to(proxy)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_variants() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&"owned".to_string()), "owned");
        assert_eq!(panic_message(&42u8), "unknown panic");
    }
}
