//! The uniform result returned to callers for every backend.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;

/// Status code reported when the transport itself failed (command backend).
pub const TRANSPORT_FAILURE_STATUS: i64 = -1;

/// Outcome of one backend call.
///
/// The broker always answers 200 once dispatch succeeds; callers must look
/// at `success` and `status_code` here to detect backend failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    /// HTTP status (relay), exit status (command), or a failure sentinel
    pub status_code: i64,
    pub duration_ms: u64,
    #[serde(flatten)]
    pub output: Option<ExecutionOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Protocol-specific payload of a completed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExecutionOutput {
    Http {
        body: String,
        headers: BTreeMap<String, String>,
    },
    Command {
        stdout: String,
        stderr: String,
    },
}

impl ExecutionResult {
    /// A relayed HTTP exchange. Any status the target returned counts as
    /// success at this level.
    pub fn http(
        status: u16,
        body: String,
        headers: BTreeMap<String, String>,
        started: Instant,
    ) -> Self {
        Self {
            success: true,
            status_code: i64::from(status),
            duration_ms: elapsed_ms(started),
            output: Some(ExecutionOutput::Http { body, headers }),
            error: None,
        }
    }

    /// A finished remote command. Success iff the exit status is zero.
    pub fn command(exit_status: u32, stdout: String, stderr: String, started: Instant) -> Self {
        Self {
            success: exit_status == 0,
            status_code: i64::from(exit_status),
            duration_ms: elapsed_ms(started),
            output: Some(ExecutionOutput::Command { stdout, stderr }),
            error: None,
        }
    }

    /// A backend failure with no protocol output.
    pub fn failure(status_code: i64, error: impl Into<String>, started: Instant) -> Self {
        Self {
            success: false,
            status_code,
            duration_ms: elapsed_ms(started),
            output: None,
            error: Some(error.into()),
        }
    }

    pub fn with_output(mut self, output: ExecutionOutput) -> Self {
        self.output = Some(output);
        self
    }
}

pub fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_http_result_shape() {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        let result = ExecutionResult::http(503, "{}".to_string(), headers, Instant::now());

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["status_code"], json!(503));
        assert_eq!(value["body"], json!("{}"));
        assert_eq!(value["headers"]["content-type"], json!("application/json"));
        assert!(value["duration_ms"].is_u64());
        assert!(value.get("error").is_none());
        assert!(value.get("stdout").is_none());
    }

    #[test]
    fn test_command_success_iff_exit_zero() {
        let ok = ExecutionResult::command(0, "up\n".into(), String::new(), Instant::now());
        assert!(ok.success);
        assert_eq!(ok.status_code, 0);

        let failed = ExecutionResult::command(2, String::new(), "no such file\n".into(), Instant::now());
        assert!(!failed.success);
        assert_eq!(failed.status_code, 2);

        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["stderr"], json!("no such file\n"));
        assert!(value.get("body").is_none());
    }

    #[test]
    fn test_failure_shape() {
        let result = ExecutionResult::failure(504, "Gateway Timeout", Instant::now());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value.as_object().unwrap().keys().collect::<Vec<_>>(),
            vec!["duration_ms", "error", "status_code", "success"]
        );
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["error"], json!("Gateway Timeout"));
    }
}
