//! Task-local trace context for broker requests.
//!
//! `RequestTrace` scopes the current request's trace id here so that code
//! without access to the `HttpRequest` (error rendering in particular) can
//! echo it back to the caller.

use tokio::task_local;

task_local! {
    static TRACE_ID: String;
}

/// Trace id of the request being handled, or `"unknown"` outside a request.
pub fn trace_id() -> String {
    TRACE_ID
        .try_with(Clone::clone)
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Run a future with `trace_id` installed as the task-local trace id.
pub async fn with_trace_id<F, R>(trace_id: String, future: F) -> R
where
    F: std::future::Future<Output = R>,
{
    TRACE_ID.scope(trace_id, future).await
}

/// Run a synchronous closure with `trace_id` installed.
pub fn sync_with_trace_id<F, R>(trace_id: String, f: F) -> R
where
    F: FnOnce() -> R,
{
    TRACE_ID.sync_scope(trace_id, f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trace_id_outside_context() {
        assert_eq!(trace_id(), "unknown");
    }

    #[tokio::test]
    async fn test_trace_id_is_scoped_to_the_future() {
        let result = with_trace_id("req-123".to_string(), async {
            assert_eq!(trace_id(), "req-123");
            with_trace_id("req-456".to_string(), async {
                assert_eq!(trace_id(), "req-456");
            })
            .await;
            assert_eq!(trace_id(), "req-123");
            "done"
        })
        .await;

        assert_eq!(result, "done");
        assert_eq!(trace_id(), "unknown");
    }

    #[test]
    fn test_sync_scope() {
        let seen = sync_with_trace_id("req-789".to_string(), trace_id);
        assert_eq!(seen, "req-789");
        assert_eq!(trace_id(), "unknown");
    }
}
