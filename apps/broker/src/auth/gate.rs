//! Authorization Gate.
//!
//! Decides whether a validated caller may contact a target. The per-token
//! scope is checked before the process-wide allow-list so a narrow grant is
//! always honored ahead of a broader list. With no allow-list and no scope
//! every target is permitted; that default is insecure and is announced at
//! startup.

use crate::auth::claims::Claims;
use crate::config::allowlist::AddressAllowlist;
use crate::error::AppError;

/// Why a target was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    #[error("token is scoped to {allowed}")]
    OutOfScope { allowed: String },
    #[error("target is not in the allowed target list")]
    NotAllowlisted,
}

impl From<AccessDenied> for AppError {
    fn from(_: AccessDenied) -> Self {
        AppError::forbidden_target()
    }
}

pub fn authorize(
    claims: &Claims,
    target: &str,
    allowed_targets: &AddressAllowlist,
) -> Result<(), AccessDenied> {
    if let Some(allowed) = claims.allowed_target.as_deref() {
        if allowed != target {
            return Err(AccessDenied::OutOfScope {
                allowed: allowed.to_string(),
            });
        }
    }

    if !allowed_targets.permits(target) {
        return Err(AccessDenied::NotAllowlisted);
    }

    Ok(())
}
