//! Generic primary/fallback orchestration
//!
//! All six categories follow the same state machine: try the primary
//! provider; on failure or empty result, invoke the fallback; if both fail,
//! surface a combined error retaining both causes. This module implements
//! that machine once, parameterized by the two fetch operations and a
//! validity predicate; per-category field mapping lives in the category
//! modules as pure normalization functions over [`Fetched`].

use crate::error::{MarketError, Result};
use crate::records::DataSource;
use std::future::Future;
use tracing::{debug, warn};

/// Payload obtained by [`fetch_with_fallback`], tagged with its origin
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<P, F> {
    /// Primary provider responded with a valid payload
    Primary(P),
    /// Primary failed or was empty; payload came from the fallback provider
    Fallback(F),
}

impl<P, F> Fetched<P, F> {
    /// Provenance tag for the normalized record
    pub fn data_source(&self) -> DataSource {
        match self {
            Self::Primary(_) => DataSource::Eastmoney,
            Self::Fallback(_) => DataSource::Yahoo,
        }
    }
}

/// Try the primary provider, falling back to the secondary on failure or
/// empty result.
///
/// `is_valid` decides whether a successful primary response actually holds
/// data; an invalid response is treated like a primary failure. When both
/// providers fail the error retains both messages.
pub async fn fetch_with_fallback<P, F, FutP, FutF, V, FB>(
    category: &str,
    primary: FutP,
    is_valid: V,
    fallback: FB,
) -> Result<Fetched<P, F>>
where
    FutP: Future<Output = Result<P>>,
    V: FnOnce(&P) -> bool,
    FB: FnOnce() -> FutF,
    FutF: Future<Output = Result<F>>,
{
    let primary_error = match primary.await {
        Ok(payload) if is_valid(&payload) => {
            debug!(category, "primary provider returned data");
            return Ok(Fetched::Primary(payload));
        }
        Ok(_) => MarketError::Eastmoney(format!(
            "primary provider returned an empty result for {category}"
        )),
        Err(e) => e,
    };

    warn!(category, error = %primary_error, "primary provider failed, trying fallback");

    match fallback().await {
        Ok(payload) => {
            debug!(category, "fallback provider returned data");
            Ok(Fetched::Fallback(payload))
        }
        Err(fallback_error) => Err(MarketError::BothProvidersFailed {
            primary: primary_error.to_string(),
            fallback: fallback_error.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ok<T>(value: T) -> Result<T> {
        Ok(value)
    }

    async fn fail<T>(message: &str) -> Result<T> {
        Err(MarketError::Eastmoney(message.to_string()))
    }

    #[tokio::test]
    async fn test_valid_primary_wins() {
        let fetched: Fetched<i32, i32> =
            fetch_with_fallback("quote", ok(42), |v| *v > 0, || ok(7))
                .await
                .unwrap();

        assert_eq!(fetched, Fetched::Primary(42));
        assert_eq!(fetched.data_source(), DataSource::Eastmoney);
    }

    #[tokio::test]
    async fn test_empty_primary_falls_back() {
        let fetched: Fetched<i32, i32> =
            fetch_with_fallback("quote", ok(0), |v| *v > 0, || ok(7))
                .await
                .unwrap();

        assert_eq!(fetched, Fetched::Fallback(7));
        assert_eq!(fetched.data_source(), DataSource::Yahoo);
    }

    #[tokio::test]
    async fn test_primary_error_falls_back() {
        let fetched: Fetched<i32, i32> =
            fetch_with_fallback("quote", fail("boom"), |v| *v > 0, || ok(7))
                .await
                .unwrap();

        assert_eq!(fetched, Fetched::Fallback(7));
    }

    #[tokio::test]
    async fn test_both_failures_combine_messages() {
        let result: Result<Fetched<i32, i32>> = fetch_with_fallback(
            "quote",
            fail("primary exploded"),
            |v| *v > 0,
            || fail("fallback exploded"),
        )
        .await;

        let message = result.unwrap_err().to_string();
        assert!(message.contains("primary exploded"));
        assert!(message.contains("fallback exploded"));
    }

    #[tokio::test]
    async fn test_empty_primary_and_failing_fallback_cites_empty_result() {
        let result: Result<Fetched<i32, i32>> =
            fetch_with_fallback("quote", ok(0), |v| *v > 0, || fail("no ticker")).await;

        let message = result.unwrap_err().to_string();
        assert!(message.contains("empty result"));
        assert!(message.contains("no ticker"));
    }
}
