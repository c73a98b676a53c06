//! Token Validator.
//!
//! Tokens are HS256 JWTs signed with the process-wide secret. Every failure
//! mode collapses into [`TokenRejected`]; the reason is only logged.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use crate::auth::claims::Claims;
use crate::error::AppError;
use crate::state::security_config::SecurityConfig;

/// The token was not accepted. Deliberately carries no reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("token rejected")]
pub struct TokenRejected;

impl From<TokenRejected> for AppError {
    fn from(_: TokenRejected) -> Self {
        AppError::forbidden_invalid_token()
    }
}

/// Verify a token and return its claims.
///
/// The algorithm is pinned to the configured one. `exp` is optional, but
/// when present it is enforced with no leeway. Audience is not checked.
pub fn validate_token(token: &str, security: &SecurityConfig) -> Result<Claims, TokenRejected> {
    let mut validation = Validation::new(security.algorithm);
    validation.required_spec_claims.clear();
    validation.validate_exp = true;
    validation.validate_aud = false;
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(&security.jwt_secret),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        debug!(reason = ?e.kind(), "token rejected");
        TokenRejected
    })
}

/// Sign a token for `sub`, valid for `ttl` from `now`, optionally scoped to
/// one target.
pub fn mint_token(
    sub: &str,
    allowed_target: Option<&str>,
    now: SystemTime,
    ttl: Duration,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    let iat = now
        .duration_since(UNIX_EPOCH)
        .map_err(|_| AppError::internal("Failed to get current time"))?
        .as_secs();

    let claims = Claims {
        sub: sub.to_string(),
        iat: Some(iat),
        exp: Some(iat.saturating_add(ttl.as_secs())),
        allowed_target: allowed_target.map(str::to_string),
    };

    encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(&security.jwt_secret),
    )
    .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))
}
