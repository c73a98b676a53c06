use std::sync::Arc;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
use actix_web::{test, web, App, Error};
use vnf_broker::infra::state::{build_state, StateBuilder};
use vnf_broker::middleware::{AccessLog, RequestTrace, TraceSpan};
use vnf_broker::routes;
use vnf_broker::state::app_state::AppState;

use super::auth::security;
use super::stubs::{StubExecutor, StubRelay};

/// State builder with the test secret and stub backends that never touch
/// the network. Override any piece before calling `build()`.
pub fn test_state() -> StateBuilder {
    build_state()
        .with_security(security())
        .with_http_relay(Arc::new(StubRelay::ok()))
        .with_command_executor(Arc::new(StubExecutor::exit(0)))
}

/// The production app (middleware and routes) around the given state.
pub async fn create_test_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error> {
    // Wrap AppState with web::Data at the boundary
    let data = web::Data::new(state);

    test::init_service(
        App::new()
            .wrap(AccessLog)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data)
            .configure(routes::configure),
    )
    .await
}

/// `POST /vnfproxy` with an optional Authorization header value.
pub fn proxy_request(authorization: Option<&str>, body: &str) -> test::TestRequest {
    let mut req = test::TestRequest::post()
        .uri("/vnfproxy")
        .insert_header((CONTENT_TYPE, "application/json"))
        .set_payload(body.to_string());
    if let Some(value) = authorization {
        req = req.insert_header((AUTHORIZATION, value.to_string()));
    }
    req
}
