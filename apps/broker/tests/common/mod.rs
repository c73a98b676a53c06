#![allow(dead_code)]

// tests/common/mod.rs
use actix_web::dev::ServiceResponse;
use actix_web::test;
use serde_json::Value;

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    broker_test_support::test_logging::init();
}

/// Read a response body as JSON.
pub async fn read_json(resp: ServiceResponse) -> Value {
    let body = test::read_body(resp).await;
    serde_json::from_slice(&body)
        .unwrap_or_else(|_| panic!("body is not JSON: {}", String::from_utf8_lossy(&body)))
}
