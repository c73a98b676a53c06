//! Problem Details assertions for broker error responses.
//!
//! Kept independent of the broker crate so the error contract is checked
//! from the outside, the way a management controller would see it.

use actix_web::http::header::HeaderMap;
use actix_web::http::StatusCode;
use serde::Deserialize;

/// Local mirror of the broker's Problem Details body.
#[derive(Debug, Deserialize)]
pub struct ProblemDetailsLike {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

/// Assert that response parts conform to the broker's error contract and
/// return the parsed body for further checks.
///
/// Validates the status, the `application/problem+json` content type, the
/// `x-trace-id` header/body parity, the code, and optionally a detail
/// substring.
pub fn assert_problem_details(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
    expected_status: StatusCode,
    expected_code: &str,
    expected_detail_contains: Option<&str>,
) -> ProblemDetailsLike {
    assert_eq!(status, expected_status);

    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        content_type.starts_with("application/problem+json"),
        "Content-Type must be application/problem+json (got {content_type})"
    );

    let body_str = std::str::from_utf8(body).expect("response body should be UTF-8");
    let problem: ProblemDetailsLike = serde_json::from_str(body_str)
        .unwrap_or_else(|_| panic!("body is not Problem Details: {body_str}"));

    let trace_id_header = headers
        .get("x-trace-id")
        .expect("x-trace-id header should be present")
        .to_str()
        .expect("x-trace-id header should be valid UTF-8");
    assert_eq!(
        problem.trace_id, trace_id_header,
        "trace_id in body should match x-trace-id header"
    );

    assert_eq!(problem.code, expected_code);
    assert_eq!(problem.status, expected_status.as_u16());

    if let Some(expected) = expected_detail_contains {
        assert!(
            problem.detail.contains(expected),
            "expected detail to contain '{expected}', got '{}'",
            problem.detail
        );
    }

    problem
}
