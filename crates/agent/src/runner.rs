//! Agent Runner (C2): races an agent coroutine against a per-agent
//! timeout and never lets one agent's failure abort the pipeline.

use std::future::Future;
use std::time::Duration;

/// Runs `fut` against `timeout`. On timeout, logs and returns `fallback`.
/// If `fut` completes normally — even with a `success: false` value the
/// agent itself constructed — that value is returned verbatim (spec.md
/// §4.2: "A result is considered a fallback only when the coroutine did
/// not complete in time ... If the coroutine returns normally ... the
/// caller sees that returned value verbatim").
pub async fn run<T, F>(name: &'static str, fallback: T, timeout: Duration, fut: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(agent = name, timeout_ms = timeout.as_millis() as u64, "agent timed out, using fallback");
            fallback
        }
    }
}

/// Same as `run`, but for agents whose coroutine can itself fail with an
/// `Err` (e.g. because it calls a capability that returns `Result`).
/// A raised error is treated the same as a timeout: logged, fallback
/// returned.
pub async fn run_fallible<T, F>(
    name: &'static str,
    fallback: T,
    timeout: Duration,
    fut: F,
) -> T
where
    F: Future<Output = persona_core::Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            tracing::warn!(agent = name, error = %err, "agent errored, using fallback");
            fallback
        }
        Err(_) => {
            tracing::warn!(agent = name, timeout_ms = timeout.as_millis() as u64, "agent timed out, using fallback");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_value_on_success() {
        let result = run("test", 0, Duration::from_millis(100), async { 42 }).await;
        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn returns_fallback_on_timeout() {
        let result = run("test", -1, Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            42
        })
        .await;
        assert_eq!(result, -1);
    }

    #[tokio::test]
    async fn returns_success_false_value_verbatim_not_as_fallback() {
        #[derive(Debug, PartialEq)]
        struct AgentResult {
            success: bool,
        }
        let result = run("test", AgentResult { success: true }, Duration::from_millis(100), async {
            AgentResult { success: false }
        })
        .await;
        assert_eq!(result, AgentResult { success: false });
    }

    #[tokio::test]
    async fn fallible_returns_fallback_on_error() {
        let result: i32 = run_fallible("test", -1, Duration::from_millis(100), async {
            Err(persona_core::Error::Capability("boom".to_string()))
        })
        .await;
        assert_eq!(result, -1);
    }
}
