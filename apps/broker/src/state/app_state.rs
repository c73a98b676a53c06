use std::sync::Arc;

use super::security_config::SecurityConfig;
use crate::backends::{CommandExecutor, HttpRelay};
use crate::config::AddressAllowlist;

/// Shared, read-only state handed to every request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Token signing settings
    pub security: SecurityConfig,
    /// Targets the broker may contact; empty means any
    pub allowed_targets: AddressAllowlist,
    /// Callers allowed to use the proxy endpoint; empty means any
    pub allowed_management_ips: AddressAllowlist,
    /// Expose internal error detail in 500 responses
    pub debug: bool,
    pub http_relay: Arc<dyn HttpRelay>,
    pub command_executor: Arc<dyn CommandExecutor>,
}
