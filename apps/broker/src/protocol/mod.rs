//! Wire-level request and result types.

pub mod request;
pub mod result;

pub use request::{HttpPayload, Protocol, ProxyAction, RawProxyRequest, SshPayload};
pub use result::{ExecutionOutput, ExecutionResult, TRANSPORT_FAILURE_STATUS};
