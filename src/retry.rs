//! Bounded-timeout helper for document-store calls.
//!
//! Per the concurrency model, every document-store call is subject to a
//! bounded timeout (selection + operation). On timeout the *calling* code
//! path decides whether to proceed best-effort (audio persistence) or
//! surface an error (seat/map updates) — this module only enforces the
//! bound, it never swallows the error.

use std::future::IntoFuture;
use std::time::Duration;

/// Wraps `fut` in `tokio::time::timeout(bound, fut)` and flattens the
/// result into a single error type. `E` must be constructible from a
/// timeout via `From<tokio::time::error::Elapsed>` is not required —
/// callers map the error string themselves, since the precise wording
/// depends on the call site (see `store::mongo`).
pub async fn with_timeout<T, E>(
    bound: Duration,
    fut: impl IntoFuture<Output = Result<T, E>>,
) -> Result<T, String>
where
    E: std::fmt::Display,
{
    match tokio::time::timeout(bound, fut.into_future()).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("operation exceeded {bound:?} timeout")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_timeout_returns_ok_before_bound() {
        let result: Result<u32, String> =
            with_timeout(Duration::from_millis(50), async { Ok::<u32, String>(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn with_timeout_errors_when_future_never_resolves_in_time() {
        let result: Result<u32, String> = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<u32, String>(7)
        })
        .await;
        assert!(result.is_err());
    }
}
