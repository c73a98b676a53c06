//! Process configuration for the broker.
//!
//! Everything is read once at startup and never changes afterwards. The
//! lookup is injected so tests can use a plain map instead of the process
//! environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::allowlist::AddressAllowlist;
use crate::error::AppError;

pub const ENV_HOST: &str = "VNF_BROKER_HOST";
pub const ENV_PORT: &str = "VNF_BROKER_PORT";
pub const ENV_JWT_SECRET: &str = "VNF_BROKER_JWT_SECRET";
pub const ENV_JWT_SECRET_FILE: &str = "VNF_BROKER_JWT_SECRET_FILE";
pub const ENV_ALLOWED_TARGETS: &str = "VNF_BROKER_ALLOWED_TARGETS";
pub const ENV_ALLOWED_MANAGEMENT_IPS: &str = "VNF_BROKER_ALLOWED_MANAGEMENT_IPS";
pub const ENV_SSH_KEY_PATH: &str = "VNF_BROKER_SSH_KEY_PATH";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "VNF_BROKER_REQUEST_TIMEOUT_SECS";
pub const ENV_DEBUG: &str = "VNF_BROKER_DEBUG";
pub const ENV_TLS_CERT: &str = "VNF_BROKER_TLS_CERT";
pub const ENV_TLS_KEY: &str = "VNF_BROKER_TLS_KEY";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8443;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// PEM files for the listener's own TLS identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerTls {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

#[derive(Clone)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: Vec<u8>,
    pub allowed_targets: AddressAllowlist,
    pub allowed_management_ips: AddressAllowlist,
    pub ssh_key_path: Option<PathBuf>,
    pub request_timeout: Duration,
    pub debug: bool,
    pub tls: Option<ListenerTls>,
}

impl BrokerConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = get(ENV_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(ENV_PORT) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| AppError::config(format!("{ENV_PORT} must be a valid port number")))?,
            None => DEFAULT_PORT,
        };

        let jwt_secret = match (get(ENV_JWT_SECRET), get(ENV_JWT_SECRET_FILE)) {
            (Some(secret), _) => secret.into_bytes(),
            (None, Some(path)) => read_secret_file(&path)?,
            (None, None) => {
                return Err(AppError::config(format!(
                    "{ENV_JWT_SECRET} or {ENV_JWT_SECRET_FILE} must be set"
                )))
            }
        };

        let request_timeout_secs = match get(ENV_REQUEST_TIMEOUT_SECS) {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    AppError::config(format!(
                        "{ENV_REQUEST_TIMEOUT_SECS} must be a positive number of seconds"
                    ))
                })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let debug = match get(ENV_DEBUG) {
            Some(raw) => parse_bool(&raw)
                .ok_or_else(|| AppError::config(format!("{ENV_DEBUG} must be true or false")))?,
            None => false,
        };

        let tls = match (get(ENV_TLS_CERT), get(ENV_TLS_KEY)) {
            (Some(cert), Some(key)) => Some(ListenerTls {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => {
                return Err(AppError::config(format!(
                    "{ENV_TLS_CERT} and {ENV_TLS_KEY} must be set together"
                )))
            }
        };

        Ok(Self {
            host,
            port,
            jwt_secret,
            allowed_targets: get(ENV_ALLOWED_TARGETS)
                .map(|raw| AddressAllowlist::parse(&raw))
                .unwrap_or_default(),
            allowed_management_ips: get(ENV_ALLOWED_MANAGEMENT_IPS)
                .map(|raw| AddressAllowlist::parse(&raw))
                .unwrap_or_default(),
            ssh_key_path: get(ENV_SSH_KEY_PATH).map(PathBuf::from),
            request_timeout: Duration::from_secs(request_timeout_secs),
            debug,
            tls,
        })
    }
}

impl std::fmt::Debug for BrokerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"<redacted>")
            .field("allowed_targets", &self.allowed_targets)
            .field("allowed_management_ips", &self.allowed_management_ips)
            .field("ssh_key_path", &self.ssh_key_path)
            .field("request_timeout", &self.request_timeout)
            .field("debug", &self.debug)
            .field("tls", &self.tls)
            .finish()
    }
}

fn read_secret_file(path: &str) -> Result<Vec<u8>, AppError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::config(format!("failed to read JWT secret file {path}: {e}")))?;
    let secret = contents.trim();
    if secret.is_empty() {
        return Err(AppError::config(format!("JWT secret file {path} is empty")));
    }
    Ok(secret.as_bytes().to_vec())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;
    use crate::errors::ErrorCode;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_inline_secret() {
        let cfg = BrokerConfig::from_lookup(lookup(&[(ENV_JWT_SECRET, "s3cret")])).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8443);
        assert_eq!(cfg.jwt_secret, b"s3cret");
        assert!(cfg.allowed_targets.is_empty());
        assert!(cfg.allowed_management_ips.is_empty());
        assert_eq!(cfg.ssh_key_path, None);
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
        assert!(!cfg.debug);
        assert_eq!(cfg.tls, None);
    }

    #[test]
    fn test_missing_secret_is_a_config_error() {
        let err = BrokerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ConfigError);
    }

    #[test]
    fn test_secret_file_is_trimmed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  from-file  ").unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let cfg = BrokerConfig::from_lookup(lookup(&[(ENV_JWT_SECRET_FILE, path.as_str())])).unwrap();
        assert_eq!(cfg.jwt_secret, b"from-file");
    }

    #[test]
    fn test_inline_secret_wins_over_file() {
        let cfg = BrokerConfig::from_lookup(lookup(&[
            (ENV_JWT_SECRET, "inline"),
            (ENV_JWT_SECRET_FILE, "/nonexistent/secret"),
        ]))
        .unwrap();
        assert_eq!(cfg.jwt_secret, b"inline");
    }

    #[test]
    fn test_unreadable_secret_file_is_a_config_error() {
        let err = BrokerConfig::from_lookup(lookup(&[(
            ENV_JWT_SECRET_FILE,
            "/nonexistent/vnf-broker/jwt_secret",
        )]))
        .unwrap_err();
        assert!(err.detail().contains("failed to read JWT secret file"));
    }

    #[test]
    fn test_full_configuration() {
        let cfg = BrokerConfig::from_lookup(lookup(&[
            (ENV_JWT_SECRET, "s3cret"),
            (ENV_HOST, "127.0.0.1"),
            (ENV_PORT, "9443"),
            (ENV_ALLOWED_TARGETS, "10.0.0.5, 10.0.0.6"),
            (ENV_ALLOWED_MANAGEMENT_IPS, "172.16.0.1"),
            (ENV_SSH_KEY_PATH, "/etc/vnf-broker/ssh_key"),
            (ENV_REQUEST_TIMEOUT_SECS, "5"),
            (ENV_DEBUG, "TRUE"),
            (ENV_TLS_CERT, "/etc/vnf-broker/server.crt"),
            (ENV_TLS_KEY, "/etc/vnf-broker/server.key"),
        ]))
        .unwrap();

        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 9443);
        assert_eq!(cfg.allowed_targets.len(), 2);
        assert!(cfg.allowed_management_ips.contains("172.16.0.1"));
        assert_eq!(
            cfg.ssh_key_path,
            Some(PathBuf::from("/etc/vnf-broker/ssh_key"))
        );
        assert_eq!(cfg.request_timeout, Duration::from_secs(5));
        assert!(cfg.debug);
        assert_eq!(
            cfg.tls,
            Some(ListenerTls {
                cert_path: PathBuf::from("/etc/vnf-broker/server.crt"),
                key_path: PathBuf::from("/etc/vnf-broker/server.key"),
            })
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for (key, value) in [
            (ENV_PORT, "not-a-port"),
            (ENV_PORT, "70000"),
            (ENV_REQUEST_TIMEOUT_SECS, "0"),
            (ENV_REQUEST_TIMEOUT_SECS, "soon"),
            (ENV_DEBUG, "maybe"),
        ] {
            let result = BrokerConfig::from_lookup(lookup(&[(ENV_JWT_SECRET, "s"), (key, value)]));
            let err = result.expect_err("value should be rejected");
            assert!(err.detail().contains(key), "{key}={value}: {}", err.detail());
        }
    }

    #[test]
    fn test_half_configured_tls_is_rejected() {
        let err = BrokerConfig::from_lookup(lookup(&[
            (ENV_JWT_SECRET, "s"),
            (ENV_TLS_CERT, "/etc/vnf-broker/server.crt"),
        ]))
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ConfigError);
    }
}
