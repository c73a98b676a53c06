pub mod access_log;
pub mod management_guard;
pub mod request_trace;
pub mod trace_span;

pub use access_log::AccessLog;
pub use management_guard::ManagementGuard;
pub use request_trace::RequestTrace;
pub use trace_span::TraceSpan;
