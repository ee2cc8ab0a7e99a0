//! Error types for market data operations

use thiserror::Error;

/// Result type alias for market data operations
pub type Result<T> = std::result::Result<T, MarketError>;

/// Market data specific errors
///
/// These circulate between the provider clients and the fallback
/// orchestrator; category handlers convert them into error records instead
/// of letting them escape.
#[derive(Debug, Error)]
pub enum MarketError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// East Money endpoint returned an error or unusable payload
    #[error("East Money error: {0}")]
    Eastmoney(String),

    /// Yahoo Finance endpoint returned an error or unusable payload
    #[error("Yahoo Finance error: {0}")]
    Yahoo(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Both the primary and the fallback provider failed for a category.
    /// Retains both failure texts; either may hold the actionable
    /// diagnostic.
    #[error("primary provider failed: {primary}; fallback provider also failed: {fallback}")]
    BothProvidersFailed { primary: String, fallback: String },
}
