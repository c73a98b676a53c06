//! Execution backends.
//!
//! Both backends catch their own failures and fold them into an
//! [`ExecutionResult`]; nothing here returns an error to the dispatcher.

use async_trait::async_trait;

use crate::protocol::{ExecutionResult, HttpPayload, SshPayload};

pub mod http_relay;
pub mod ssh;

pub use http_relay::HttpsRelay;
pub use ssh::SshExecutor;

/// Forwards one HTTP exchange to a target.
#[async_trait]
pub trait HttpRelay: Send + Sync + std::fmt::Debug {
    async fn relay(&self, target: &str, payload: &HttpPayload) -> ExecutionResult;
}

/// Runs one command on a target.
#[async_trait]
pub trait CommandExecutor: Send + Sync + std::fmt::Debug {
    async fn execute(&self, target: &str, payload: &SshPayload) -> ExecutionResult;
}
