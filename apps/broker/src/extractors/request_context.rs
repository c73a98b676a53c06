use std::convert::Infallible;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};

/// Per-request identity used in logs: the trace id and the caller's
/// address. Inserted into request extensions by `RequestTrace`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub trace_id: String,
    pub client_addr: String,
}

impl RequestContext {
    /// Context stored by `RequestTrace`, or one derived from the peer
    /// address when the middleware is not installed.
    pub fn of(req: &HttpRequest) -> Self {
        if let Some(ctx) = req.extensions().get::<RequestContext>() {
            return ctx.clone();
        }
        Self {
            trace_id: "unknown".to_string(),
            client_addr: peer_ip(req.peer_addr()),
        }
    }
}

/// The peer's IP without the port, or `"unknown"`.
pub fn peer_ip(addr: Option<std::net::SocketAddr>) -> String {
    addr.map(|a| a.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

impl FromRequest for RequestContext {
    type Error = Infallible;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(RequestContext::of(req)))
    }
}
