//! Bounded fixed-delay retry for the fallback provider
//!
//! Yahoo returns a near-empty payload instead of an explicit error for
//! unknown or rate-limited tickers, so "empty according to a caller-supplied
//! predicate" is the operative failure signal here, distinct from a raised
//! error. The delay between attempts is constant, with no backoff growth.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry policy for fallback-provider calls
#[derive(Debug, Clone)]
pub struct FallbackRetry {
    /// Maximum number of attempts (treated as at least 1)
    pub max_attempts: u32,

    /// Fixed pause between attempts
    pub delay: Duration,
}

impl Default for FallbackRetry {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(1),
        }
    }
}

impl FallbackRetry {
    /// Create a new retry policy
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Repeatedly invoke `operation` until it yields a non-empty payload or
    /// attempts are exhausted.
    ///
    /// On exhaustion the best last payload is returned (so a caller can
    /// distinguish "no data" from "no response"); `Err` is returned only
    /// when every attempt raised.
    pub async fn run<T, E, Op, Fut, P>(
        &self,
        operation_name: &str,
        mut operation: Op,
        is_empty: P,
    ) -> std::result::Result<T, E>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        P: Fn(&T) -> bool,
        E: Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut last_payload: Option<T> = None;
        let mut last_error: Option<E> = None;

        for attempt in 1..=max_attempts {
            debug!(
                attempt,
                max_attempts, operation_name, "fallback provider attempt"
            );

            match operation().await {
                Ok(payload) if !is_empty(&payload) => {
                    if attempt > 1 {
                        debug!(
                            attempt,
                            operation_name, "fallback provider succeeded after retries"
                        );
                    }
                    return Ok(payload);
                }
                Ok(payload) => {
                    debug!(attempt, operation_name, "fallback provider returned an empty payload");
                    last_payload = Some(payload);
                }
                Err(e) => {
                    warn!(attempt, operation_name, error = %e, "fallback provider attempt failed");
                    last_error = Some(e);
                }
            }

            if attempt < max_attempts {
                sleep(self.delay).await;
            }
        }

        match (last_payload, last_error) {
            // An empty payload still beats an error: the caller can inspect it
            (Some(payload), _) => Ok(payload),
            (None, Some(e)) => Err(e),
            // max_attempts >= 1 guarantees one of the two is set
            (None, None) => unreachable!("retry loop ran zero attempts"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> FallbackRetry {
        FallbackRetry::new(max_attempts, Duration::from_millis(1))
    }

    fn sentinel_only(payload: &Vec<&'static str>) -> bool {
        payload.len() <= 1 && payload.contains(&"trailingPegRatio")
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = fast(5)
            .run(
                "test",
                || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, String>(vec!["regularMarketPrice", "trailingPE"])
                    }
                },
                sentinel_only,
            )
            .await;

        assert_eq!(result.unwrap().len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fails_n_minus_one_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = fast(5)
            .run(
                "test",
                || {
                    let counter = counter.clone();
                    async move {
                        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                        if n < 3 {
                            Err("connection reset".to_string())
                        } else {
                            Ok(vec!["regularMarketPrice", "trailingPE"])
                        }
                    }
                },
                sentinel_only,
            )
            .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_sentinel_only_exhausts_and_returns_payload() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = fast(4)
            .run(
                "test",
                || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, String>(vec!["trailingPegRatio"])
                    }
                },
                sentinel_only,
            )
            .await;

        // All attempts used, and the sentinel payload comes back rather than
        // an error so the caller can tell "no data" from "no response".
        let payload = result.unwrap();
        assert_eq!(payload, vec!["trailingPegRatio"]);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_all_attempts_raise() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<Vec<&'static str>, String> = fast(3)
            .run(
                "test",
                || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err("timeout".to_string())
                    }
                },
                sentinel_only,
            )
            .await;

        assert_eq!(result.unwrap_err(), "timeout");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_treated_as_one() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = fast(0)
            .run(
                "test",
                || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, String>(vec!["regularMarketPrice"])
                    }
                },
                sentinel_only,
            )
            .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
