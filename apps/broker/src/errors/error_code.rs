//! Error codes for the VNF broker API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that
//! appear in Problem Details responses.

use core::fmt;

/// Centralized error codes for the broker API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication & Authorization
    /// Missing or malformed Bearer token
    UnauthorizedMissingBearer,
    /// Token failed signature, structure, algorithm or expiry checks
    ForbiddenInvalidToken,
    /// Target outside the token scope or the global allow-list
    ForbiddenTarget,
    /// Caller address outside the management allow-list
    ForbiddenClient,

    // Request Validation
    /// Body is not a usable JSON object
    InvalidJson,
    /// `target` absent or empty
    MissingTarget,
    /// `command` absent or empty for SSH
    MissingCommand,
    /// Protocol selector not one of HTTP, HTTPS, SSH
    UnsupportedProtocol,
    /// HTTP method is not a valid token
    InvalidMethod,
    /// Relay header name or value is not valid HTTP
    InvalidHeader,
    /// Body larger than the proxy endpoint accepts
    PayloadTooLarge,

    // System Errors
    Internal,
    ConfigError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnauthorizedMissingBearer => "UNAUTHORIZED_MISSING_BEARER",
            Self::ForbiddenInvalidToken => "FORBIDDEN_INVALID_TOKEN",
            Self::ForbiddenTarget => "FORBIDDEN_TARGET",
            Self::ForbiddenClient => "FORBIDDEN_CLIENT",

            Self::InvalidJson => "INVALID_JSON",
            Self::MissingTarget => "MISSING_TARGET",
            Self::MissingCommand => "MISSING_COMMAND",
            Self::UnsupportedProtocol => "UNSUPPORTED_PROTOCOL",
            Self::InvalidMethod => "INVALID_METHOD",
            Self::InvalidHeader => "INVALID_HEADER",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",

            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
