//! Claims carried by broker bearer tokens.

use serde::{Deserialize, Serialize};

/// Decoded token claims. Built per request and dropped with it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Caller identifier
    #[serde(default)]
    pub sub: String,
    /// Issued-at (seconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    /// Expiry (seconds since epoch); absent means non-expiring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
    /// Restricts the token to exactly this target address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_target: Option<String>,
}
