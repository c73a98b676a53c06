//! Command Execution Backend over SSH.
//!
//! Host keys are accepted without pinning. Authentication walks an ordered
//! list of strategies (configured key first, then the caller's password)
//! and stops at the first success. The configured timeout bounds connect,
//! handshake and authentication; the command itself is not time-bounded.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use russh::client::{self, Handle};
use russh::keys::{load_secret_key, PrivateKeyWithHashAlg};
use russh::{ChannelMsg, Disconnect};
use thiserror::Error;
use tracing::{debug, warn};

use super::CommandExecutor;
use crate::protocol::{ExecutionOutput, ExecutionResult, SshPayload, TRANSPORT_FAILURE_STATUS};

/// SSH extended data stream carrying stderr.
const STDERR_STREAM: u32 = 1;

#[derive(Debug, Error)]
pub enum SshError {
    #[error("Connection to {addr} timed out after {timeout:?}")]
    Timeout { addr: String, timeout: Duration },
    #[error("SSH error: {0}")]
    Transport(#[from] russh::Error),
    #[error("Failed to load private key {path}: {message}")]
    KeyUnavailable { path: String, message: String },
    #[error("Authentication failed ({strategy} rejected)")]
    AuthRejected { strategy: &'static str },
    #[error("No authentication methods available")]
    NoCredentials,
}

impl SshError {
    /// Rejections let the next strategy run; anything else ends the attempt.
    fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            SshError::AuthRejected { .. } | SshError::KeyUnavailable { .. }
        )
    }
}

/// One way of proving identity to the target.
#[derive(Clone, PartialEq, Eq)]
enum AuthStrategy {
    PublicKey(PathBuf),
    Password(String),
}

impl AuthStrategy {
    fn name(&self) -> &'static str {
        match self {
            AuthStrategy::PublicKey(_) => "publickey",
            AuthStrategy::Password(_) => "password",
        }
    }
}

impl std::fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthStrategy::PublicKey(path) => f.debug_tuple("PublicKey").field(path).finish(),
            AuthStrategy::Password(_) => f.debug_tuple("Password").field(&"<redacted>").finish(),
        }
    }
}

/// Strategies in the order they are tried. A configured key is only used
/// when the file exists.
fn auth_plan(key_path: Option<&Path>, password: Option<&str>) -> Vec<AuthStrategy> {
    let mut plan = Vec::with_capacity(2);
    if let Some(path) = key_path.filter(|p| p.exists()) {
        plan.push(AuthStrategy::PublicKey(path.to_path_buf()));
    }
    if let Some(password) = password {
        plan.push(AuthStrategy::Password(password.to_string()));
    }
    plan
}

/// Accepts every server key; targets are not pinned.
struct AcceptAnyHostKey;

impl client::Handler for AcceptAnyHostKey {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh::keys::ssh_key::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// What the remote command produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CommandOutput {
    stdout: String,
    stderr: String,
    exit_status: Option<u32>,
    exit_signal: Option<String>,
}

impl CommandOutput {
    fn into_result(self, started: Instant) -> ExecutionResult {
        match self.exit_status {
            Some(status) => ExecutionResult::command(status, self.stdout, self.stderr, started),
            None => {
                let error = match &self.exit_signal {
                    Some(signal) => format!("Command terminated by signal {signal}"),
                    None => "Command terminated without an exit status".to_string(),
                };
                ExecutionResult::failure(TRANSPORT_FAILURE_STATUS, error, started).with_output(
                    ExecutionOutput::Command {
                        stdout: self.stdout,
                        stderr: self.stderr,
                    },
                )
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SshExecutor {
    key_path: Option<PathBuf>,
    timeout: Duration,
}

impl SshExecutor {
    pub fn new(key_path: Option<PathBuf>, timeout: Duration) -> Self {
        Self { key_path, timeout }
    }

    async fn run(&self, target: &str, payload: &SshPayload) -> Result<CommandOutput, SshError> {
        let addr = format!("{target}:{}", payload.port);
        let plan = auth_plan(self.key_path.as_deref(), payload.password.as_deref());

        let session = tokio::time::timeout(
            self.timeout,
            connect_and_authenticate(target, payload.port, &payload.username, &plan),
        )
        .await
        .map_err(|_| SshError::Timeout {
            addr: addr.clone(),
            timeout: self.timeout,
        })??;

        let output = run_command(&session, &payload.command).await;
        if let Err(e) = session
            .disconnect(Disconnect::ByApplication, "", "English")
            .await
        {
            debug!(target_addr = %addr, error = %e, "disconnect failed");
        }
        output
    }
}

#[async_trait]
impl CommandExecutor for SshExecutor {
    async fn execute(&self, target: &str, payload: &SshPayload) -> ExecutionResult {
        let started = Instant::now();
        match self.run(target, payload).await {
            Ok(output) => output.into_result(started),
            Err(e) => {
                warn!(target_addr = %target, protocol = "SSH", error = %e, "command execution failed");
                ExecutionResult::failure(TRANSPORT_FAILURE_STATUS, e.to_string(), started)
            }
        }
    }
}

async fn connect_and_authenticate(
    host: &str,
    port: u16,
    username: &str,
    plan: &[AuthStrategy],
) -> Result<Handle<AcceptAnyHostKey>, SshError> {
    let config = Arc::new(client::Config::default());
    let mut session = client::connect(config, (host, port), AcceptAnyHostKey).await?;

    let mut last_error = SshError::NoCredentials;
    for strategy in plan {
        match try_strategy(&mut session, username, strategy).await {
            Ok(()) => return Ok(session),
            Err(e) if e.is_auth_rejection() => {
                debug!(strategy = strategy.name(), error = %e, "authentication strategy rejected");
                last_error = e;
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_error)
}

async fn try_strategy(
    session: &mut Handle<AcceptAnyHostKey>,
    username: &str,
    strategy: &AuthStrategy,
) -> Result<(), SshError> {
    let accepted = match strategy {
        AuthStrategy::PublicKey(path) => {
            let key = load_secret_key(path, None).map_err(|e| SshError::KeyUnavailable {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            let hash_alg = session.best_supported_rsa_hash().await?.flatten();
            session
                .authenticate_publickey(username, PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg))
                .await?
                .success()
        }
        AuthStrategy::Password(password) => session
            .authenticate_password(username, password)
            .await?
            .success(),
    };

    if accepted {
        Ok(())
    } else {
        Err(SshError::AuthRejected {
            strategy: strategy.name(),
        })
    }
}

async fn run_command(
    session: &Handle<AcceptAnyHostKey>,
    command: &str,
) -> Result<CommandOutput, SshError> {
    let mut channel = session.channel_open_session().await?;
    channel.exec(true, command).await?;

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut output = CommandOutput::default();

    while let Some(msg) = channel.wait().await {
        match msg {
            ChannelMsg::Data { ref data } => stdout.extend_from_slice(data),
            ChannelMsg::ExtendedData { ref data, ext } if ext == STDERR_STREAM => {
                stderr.extend_from_slice(data)
            }
            ChannelMsg::ExitStatus { exit_status } => output.exit_status = Some(exit_status),
            ChannelMsg::ExitSignal { signal_name, .. } => {
                output.exit_signal = Some(format!("{signal_name:?}"))
            }
            _ => {}
        }
    }

    output.stdout = String::from_utf8_lossy(&stdout).into_owned();
    output.stderr = String::from_utf8_lossy(&stderr).into_owned();
    Ok(output)
}
