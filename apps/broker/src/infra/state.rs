use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::backends::{CommandExecutor, HttpRelay, HttpsRelay, SshExecutor};
use crate::config::{AddressAllowlist, BrokerConfig};
use crate::error::AppError;
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    security_config: Option<SecurityConfig>,
    allowed_targets: AddressAllowlist,
    allowed_management_ips: AddressAllowlist,
    debug: bool,
    request_timeout: Duration,
    ssh_key_path: Option<PathBuf>,
    http_relay: Option<Arc<dyn HttpRelay>>,
    command_executor: Option<Arc<dyn CommandExecutor>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            security_config: None,
            allowed_targets: AddressAllowlist::default(),
            allowed_management_ips: AddressAllowlist::default(),
            debug: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            ssh_key_path: None,
            http_relay: None,
            command_executor: None,
        }
    }

    /// Seed every setting from the process configuration.
    pub fn from_config(config: &BrokerConfig) -> Self {
        Self::new()
            .with_security(SecurityConfig::new(config.jwt_secret.clone()))
            .with_allowed_targets(config.allowed_targets.clone())
            .with_allowed_management_ips(config.allowed_management_ips.clone())
            .with_debug(config.debug)
            .with_request_timeout(config.request_timeout)
            .with_ssh_key_path(config.ssh_key_path.clone())
    }

    pub fn with_security(mut self, security_config: SecurityConfig) -> Self {
        self.security_config = Some(security_config);
        self
    }
    pub fn with_allowed_targets(mut self, allowed_targets: AddressAllowlist) -> Self {
        self.allowed_targets = allowed_targets;
        self
    }
    pub fn with_allowed_management_ips(mut self, allowed: AddressAllowlist) -> Self {
        self.allowed_management_ips = allowed;
        self
    }
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
    pub fn with_ssh_key_path(mut self, path: Option<PathBuf>) -> Self {
        self.ssh_key_path = path;
        self
    }
    /// Replace the HTTPS relay (tests inject stubs here).
    pub fn with_http_relay(mut self, relay: Arc<dyn HttpRelay>) -> Self {
        self.http_relay = Some(relay);
        self
    }
    /// Replace the SSH executor (tests inject stubs here).
    pub fn with_command_executor(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.command_executor = Some(executor);
        self
    }

    pub fn build(self) -> Result<AppState, AppError> {
        let security = self
            .security_config
            .ok_or_else(|| AppError::config("JWT secret is not configured"))?;

        let http_relay = match self.http_relay {
            Some(relay) => relay,
            None => Arc::new(HttpsRelay::new(self.request_timeout)?),
        };
        let command_executor = self.command_executor.unwrap_or_else(|| {
            Arc::new(SshExecutor::new(self.ssh_key_path, self.request_timeout))
        });

        Ok(AppState {
            security,
            allowed_targets: self.allowed_targets,
            allowed_management_ips: self.allowed_management_ips,
            debug: self.debug,
            http_relay,
            command_executor,
        })
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
