#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod auth;
pub mod backends;
pub mod config;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod infra;
pub mod middleware;
pub mod protocol;
pub mod routes;
pub mod services;
pub mod state;
pub mod trace_ctx;

// Re-exports for public API
pub use auth::{authorize, mint_token, validate_token, AccessDenied, Claims, TokenRejected};
pub use backends::{CommandExecutor, HttpRelay, HttpsRelay, SshExecutor};
pub use config::{AddressAllowlist, BrokerConfig};
pub use error::AppError;
pub use errors::ErrorCode;
pub use extractors::{Authenticated, RequestContext};
pub use infra::state::{build_state, StateBuilder};
pub use middleware::{AccessLog, ManagementGuard, RequestTrace, TraceSpan};
pub use protocol::{ExecutionOutput, ExecutionResult, ProxyAction, RawProxyRequest};
pub use state::app_state::AppState;
pub use state::security_config::SecurityConfig;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    broker_test_support::test_logging::init();
}
