//! The proxy pipeline after authentication.
//!
//! Parse, require a target, authorize, validate the protocol payload, then
//! hand off to exactly one backend. Every rejection is logged with the
//! caller's address. Once a backend has run the outcome is always an
//! [`ExecutionResult`]; backend failures live inside it.

use tracing::{info, warn};

use crate::auth::{authorize, Claims};
use crate::error::AppError;
use crate::protocol::{ExecutionResult, ProxyAction, RawProxyRequest};
use crate::state::app_state::AppState;

pub async fn handle_proxy(
    state: &AppState,
    claims: &Claims,
    body: &[u8],
    client: &str,
) -> Result<ExecutionResult, AppError> {
    let raw = RawProxyRequest::parse(body).map_err(|e| rejected(client, e))?;
    let target = raw.target().map_err(|e| rejected(client, e))?.to_string();

    authorize(claims, &target, &state.allowed_targets).map_err(|denied| {
        warn!(client, target_addr = %target, sub = %claims.sub, reason = %denied, "target not permitted");
        AppError::from(denied)
    })?;

    let action = raw.into_action().map_err(|e| rejected(client, e))?;
    Ok(dispatch(state, &target, &action, client).await)
}

/// Route an authorized action to its backend.
pub async fn dispatch(
    state: &AppState,
    target: &str,
    action: &ProxyAction,
    client: &str,
) -> ExecutionResult {
    let protocol = action.protocol();
    info!(client, target_addr = %target, %protocol, "dispatching");

    let result = match action {
        ProxyAction::Http(payload) => state.http_relay.relay(target, payload).await,
        ProxyAction::Ssh(payload) => state.command_executor.execute(target, payload).await,
    };

    if result.success {
        info!(
            target_addr = %target,
            %protocol,
            status_code = result.status_code,
            duration_ms = result.duration_ms,
            "backend call completed"
        );
    } else {
        warn!(
            client,
            target_addr = %target,
            %protocol,
            status_code = result.status_code,
            duration_ms = result.duration_ms,
            error = result.error.as_deref().unwrap_or(""),
            "backend call failed"
        );
    }
    result
}

fn rejected(client: &str, error: AppError) -> AppError {
    warn!(client, code = %error.code(), detail = error.detail(), "proxy request rejected");
    error
}
