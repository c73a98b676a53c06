//! Backend stubs injected through `StateBuilder`.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use vnf_broker::backends::{CommandExecutor, HttpRelay};
use vnf_broker::protocol::{ExecutionResult, HttpPayload, SshPayload};

/// Returns a canned result and records every call as `"<target> <METHOD> <uri>"`.
#[derive(Debug)]
pub struct StubRelay {
    result: ExecutionResult,
    pub calls: Mutex<Vec<String>>,
}

impl StubRelay {
    pub fn returning(result: ExecutionResult) -> Self {
        Self {
            result,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn ok() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self::returning(ExecutionResult::http(
            200,
            r#"{"status":"up"}"#.to_string(),
            headers,
            Instant::now(),
        ))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpRelay for StubRelay {
    async fn relay(&self, target: &str, payload: &HttpPayload) -> ExecutionResult {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{target} {} {}", payload.method, payload.uri));
        self.result.clone()
    }
}

/// Returns a canned result and records every call as
/// `"<username>@<target>:<port> <command>"`.
#[derive(Debug)]
pub struct StubExecutor {
    result: ExecutionResult,
    pub calls: Mutex<Vec<String>>,
}

impl StubExecutor {
    pub fn returning(result: ExecutionResult) -> Self {
        Self {
            result,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn exit(status: u32) -> Self {
        Self::returning(ExecutionResult::command(
            status,
            "Linux vnf 5.15.0\n".to_string(),
            String::new(),
            Instant::now(),
        ))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for StubExecutor {
    async fn execute(&self, target: &str, payload: &SshPayload) -> ExecutionResult {
        self.calls.lock().unwrap().push(format!(
            "{}@{target}:{} {}",
            payload.username, payload.port, payload.command
        ));
        self.result.clone()
    }
}

/// Panics on every call.
#[derive(Debug)]
pub struct PanickingRelay;

#[async_trait]
impl HttpRelay for PanickingRelay {
    async fn relay(&self, _target: &str, _payload: &HttpPayload) -> ExecutionResult {
        panic!("relay exploded")
    }
}
