//! HTTP Relay Backend.
//!
//! Always speaks HTTPS to the target, whatever label the caller used.
//! Certificate verification toward targets is disabled: targets commonly
//! present self-signed certificates, so target identity is not verified.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_LENGTH, HOST};
use reqwest::Client;
use tracing::{debug, warn};

use super::HttpRelay;
use crate::error::AppError;
use crate::protocol::{ExecutionResult, HttpPayload};

pub const GATEWAY_TIMEOUT_STATUS: i64 = 504;
pub const BAD_GATEWAY_STATUS: i64 = 502;

/// reqwest-backed relay. The client is shared, but idle connections are not
/// kept, so no connection is reused across requests.
#[derive(Debug, Clone)]
pub struct HttpsRelay {
    client: Client,
}

impl HttpsRelay {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTPS client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpRelay for HttpsRelay {
    async fn relay(&self, target: &str, payload: &HttpPayload) -> ExecutionResult {
        let started = Instant::now();
        let url = destination_url(target, &payload.uri);

        let mut request = self
            .client
            .request(payload.method.clone(), &url)
            .headers(forwarded_headers(&payload.headers));
        if let Some(body) = &payload.body {
            request = request.body(body.clone());
        }

        debug!(target_addr = %target, method = %payload.method, uri = %payload.uri, "relaying request");

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return transport_failure(target, &e, started),
        };

        let status = response.status().as_u16();
        let headers = flatten_headers(response.headers());
        match response.text().await {
            Ok(body) => ExecutionResult::http(status, body, headers, started),
            Err(e) => transport_failure(target, &e, started),
        }
    }
}

pub fn destination_url(target: &str, uri: &str) -> String {
    format!("https://{target}{uri}")
}

/// Caller headers minus the ones that must be recomputed for the new
/// destination. Lookup is case-insensitive.
fn forwarded_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = headers.clone();
    forwarded.remove(HOST);
    forwarded.remove(CONTENT_LENGTH);
    forwarded
}

/// Collapse a header map into one string per name; repeated values are
/// joined with `", "`.
fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut flat = BTreeMap::new();
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        flat.insert(name.as_str().to_string(), joined);
    }
    flat
}

fn transport_failure(target: &str, error: &reqwest::Error, started: Instant) -> ExecutionResult {
    if error.is_timeout() {
        warn!(target_addr = %target, protocol = "HTTPS", "relay timed out");
        return ExecutionResult::failure(GATEWAY_TIMEOUT_STATUS, "Gateway Timeout", started);
    }

    let description = describe(error);
    warn!(target_addr = %target, protocol = "HTTPS", error = %description, "relay failed");
    ExecutionResult::failure(
        BAD_GATEWAY_STATUS,
        format!("Bad Gateway: {description}"),
        started,
    )
}

/// The error followed by its innermost cause, which is usually the useful
/// part ("Connection refused", "invalid peer certificate", ...).
fn describe(error: &reqwest::Error) -> String {
    let mut root: &dyn std::error::Error = error;
    while let Some(source) = root.source() {
        root = source;
    }
    let top = error.to_string();
    let cause = root.to_string();
    if cause == top {
        top
    } else {
        format!("{top}: {cause}")
    }
}
