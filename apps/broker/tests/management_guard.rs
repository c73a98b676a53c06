mod common;
mod support;

use std::net::SocketAddr;

use actix_web::http::StatusCode;
use actix_web::test;
use broker_test_support::problem_details::assert_problem_details;
use support::auth::bearer_header;
use support::{create_test_app, proxy_request, test_state};
use vnf_broker::config::AddressAllowlist;

const BODY: &str = r#"{"target":"10.0.0.5"}"#;

fn peer(addr: &str) -> SocketAddr {
    addr.parse().unwrap()
}

#[actix_web::test]
async fn test_listed_caller_passes() {
    let state = test_state()
        .with_allowed_management_ips(AddressAllowlist::parse("10.1.1.1"))
        .build()
        .unwrap();
    let app = create_test_app(state).await;

    let header = bearer_header(None);
    let req = proxy_request(Some(&header), BODY)
        .peer_addr(peer("10.1.1.1:50000"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_unlisted_caller_is_rejected_before_authentication() {
    let state = test_state()
        .with_allowed_management_ips(AddressAllowlist::parse("10.1.1.1"))
        .build()
        .unwrap();
    let app = create_test_app(state).await;

    // No token at all: the guard answers before the 401 would.
    let req = proxy_request(None, BODY)
        .peer_addr(peer("10.9.9.9:50000"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    let status = resp.status();
    let headers = resp.headers().clone();
    let body = test::read_body(resp).await;
    assert_problem_details(
        status,
        &headers,
        &body,
        StatusCode::FORBIDDEN,
        "FORBIDDEN_CLIENT",
        None,
    );
    assert_eq!(
        headers.get("x-request-id").unwrap(),
        headers.get("x-trace-id").unwrap()
    );
}

#[actix_web::test]
async fn test_empty_list_admits_everyone() {
    let app = create_test_app(test_state().build().unwrap()).await;

    let header = bearer_header(None);
    let req = proxy_request(Some(&header), BODY)
        .peer_addr(peer("203.0.113.7:1234"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}
