//! Bearer token extraction and validation.
//!
//! A missing or malformed `Authorization` header is a 401; a token that
//! fails validation is a 403. Both are logged with the caller's address,
//! never with the token itself.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

use crate::auth::{validate_token, Claims};
use crate::error::AppError;
use crate::extractors::request_context::RequestContext;
use crate::state::app_state::AppState;

/// A caller whose bearer token verified against the shared secret.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub claims: Claims,
}

impl FromRequest for Authenticated {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<Authenticated, AppError> {
    let ctx = RequestContext::of(req);

    let token = bearer_token(req).ok_or_else(|| {
        warn!(client = %ctx.client_addr, "missing or malformed bearer token");
        AppError::unauthorized_missing_bearer()
    })?;

    let app_state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::internal("AppState not available"))?;

    let claims = validate_token(token, &app_state.security).map_err(|rejected| {
        warn!(client = %ctx.client_addr, "invalid or expired token");
        AppError::from(rejected)
    })?;

    Ok(Authenticated { claims })
}

/// The token from an `Authorization: Bearer <token>` header.
fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split_whitespace();
    let (scheme, token) = (parts.next()?, parts.next()?);
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(&req), Some("abc.def.ghi"));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "bearer abc"))
            .to_http_request();
        assert_eq!(bearer_token(&req), Some("abc"));
    }

    #[test]
    fn test_malformed_authorization_headers() {
        for value in ["Bearer", "Bearer ", "Basic dXNlcjpwdw==", "Bearer a b", "abc"] {
            let req = TestRequest::default()
                .insert_header((header::AUTHORIZATION, value))
                .to_http_request();
            assert_eq!(bearer_token(&req), None, "value: {value:?}");
        }

        let req = TestRequest::default().to_http_request();
        assert_eq!(bearer_token(&req), None);
    }

    #[test]
    fn test_missing_header_is_unauthorized_before_state_lookup() {
        let req = TestRequest::default().to_http_request();
        let err = authenticate(&req).unwrap_err();
        assert_eq!(err.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }
}
