//! Proxy request parsing.
//!
//! The wire format is a loose JSON object. It is validated here, at the
//! boundary, into a tagged [`ProxyAction`] with one strongly typed payload
//! per protocol family.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Deserialize;

use crate::error::AppError;
use crate::errors::ErrorCode;

pub const DEFAULT_SSH_USERNAME: &str = "admin";
pub const DEFAULT_SSH_PORT: u16 = 22;

/// The request body as sent by the controller, before validation.
#[derive(Debug, Default, Deserialize)]
pub struct RawProxyRequest {
    pub target: Option<String>,
    pub protocol: Option<String>,
    pub method: Option<String>,
    pub uri: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
    pub body: Option<String>,
    pub command: Option<String>,
    pub ssh_username: Option<String>,
    pub ssh_password: Option<String>,
    pub ssh_port: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Http,
    Https,
    Ssh,
}

/// What the dispatcher should do for an authorized request.
#[derive(Debug)]
pub enum ProxyAction {
    Http(HttpPayload),
    Ssh(SshPayload),
}

/// An HTTP(S) exchange to relay. `protocol` is only a label; the relay
/// always speaks HTTPS to the target.
#[derive(Debug, Clone)]
pub struct HttpPayload {
    pub protocol: Protocol,
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// A single remote command.
#[derive(Clone, PartialEq, Eq)]
pub struct SshPayload {
    pub command: String,
    pub username: String,
    pub password: Option<String>,
    pub port: u16,
}

impl RawProxyRequest {
    /// Parse a request body. Empty bodies, `null`, non-objects and wrongly
    /// typed fields are all rejected as invalid JSON.
    pub fn parse(body: &[u8]) -> Result<Self, AppError> {
        match serde_json::from_slice::<Option<RawProxyRequest>>(body) {
            Ok(Some(raw)) => Ok(raw),
            Ok(None) => Err(AppError::bad_request(ErrorCode::InvalidJson, "Invalid JSON")),
            Err(e) => Err(AppError::bad_request(
                ErrorCode::InvalidJson,
                classify_json_error(&e),
            )),
        }
    }

    /// The target address; an empty string counts as missing.
    pub fn target(&self) -> Result<&str, AppError> {
        self.target
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::bad_request(ErrorCode::MissingTarget, "Missing target IP"))
    }

    /// Resolve the protocol selector (default HTTPS) and validate the
    /// matching payload.
    pub fn into_action(self) -> Result<ProxyAction, AppError> {
        let protocol = match self.protocol.as_deref() {
            Some(raw) => raw.parse::<Protocol>()?,
            None => Protocol::Https,
        };

        match protocol {
            Protocol::Http | Protocol::Https => {
                let method = parse_method(self.method.as_deref().unwrap_or("GET"))?;
                let headers = parse_headers(self.headers.unwrap_or_default())?;
                Ok(ProxyAction::Http(HttpPayload {
                    protocol,
                    method,
                    uri: self.uri.unwrap_or_else(|| "/".to_string()),
                    headers,
                    body: self.body,
                }))
            }
            Protocol::Ssh => {
                let command = self.command.filter(|c| !c.is_empty()).ok_or_else(|| {
                    AppError::bad_request(ErrorCode::MissingCommand, "Missing command for SSH")
                })?;
                Ok(ProxyAction::Ssh(SshPayload {
                    command,
                    username: self
                        .ssh_username
                        .unwrap_or_else(|| DEFAULT_SSH_USERNAME.to_string()),
                    password: self.ssh_password.filter(|p| !p.is_empty()),
                    port: self.ssh_port.unwrap_or(DEFAULT_SSH_PORT),
                }))
            }
        }
    }
}

impl Protocol {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "HTTP",
            Protocol::Https => "HTTPS",
            Protocol::Ssh => "SSH",
        }
    }
}

impl FromStr for Protocol {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_uppercase();
        match normalized.as_str() {
            "HTTP" => Ok(Protocol::Http),
            "HTTPS" => Ok(Protocol::Https),
            "SSH" => Ok(Protocol::Ssh),
            _ => Err(AppError::bad_request(
                ErrorCode::UnsupportedProtocol,
                format!("Unsupported protocol: {normalized}"),
            )),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ProxyAction {
    pub fn protocol(&self) -> Protocol {
        match self {
            ProxyAction::Http(payload) => payload.protocol,
            ProxyAction::Ssh(_) => Protocol::Ssh,
        }
    }
}

impl fmt::Debug for SshPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshPayload")
            .field("command", &self.command)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("port", &self.port)
            .finish()
    }
}

fn parse_method(raw: &str) -> Result<Method, AppError> {
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes()).map_err(|_| {
        AppError::bad_request(ErrorCode::InvalidMethod, format!("Invalid HTTP method: {raw}"))
    })
}

fn parse_headers(raw: BTreeMap<String, String>) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::with_capacity(raw.len());
    for (name, value) in raw {
        let invalid =
            || AppError::bad_request(ErrorCode::InvalidHeader, format!("Invalid header: {name}"));
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(&value).map_err(|_| invalid())?;
        headers.append(header_name, header_value);
    }
    Ok(headers)
}

/// Sanitized description of a JSON parse failure; never echoes the body.
fn classify_json_error(error: &serde_json::Error) -> String {
    match error.classify() {
        serde_json::error::Category::Syntax => {
            format!("Invalid JSON at line {}", error.line())
        }
        serde_json::error::Category::Eof => "Invalid JSON: unexpected end of input".to_string(),
        serde_json::error::Category::Data => {
            "Invalid JSON: wrong types for one or more fields".to_string()
        }
        serde_json::error::Category::Io => "Invalid JSON: I/O error while reading body".to_string(),
    }
}
