//! Market data layer for the A-share analyst agent
//!
//! This crate retrieves equity data for 6-digit China A-share codes from two
//! providers and normalizes the results into fixed-schema category records:
//!
//! - **Primary**: East Money web endpoints (profile, spot price, daily
//!   klines, periodic financial indicators, industry peer comparison)
//! - **Fallback**: Yahoo Finance (quoteSummary info map and OHLCV history),
//!   wrapped in a bounded fixed-delay retry with an empty-payload heuristic
//!
//! Every category goes through the same path: try the primary provider,
//! fall back to Yahoo on failure or empty result, normalize the payload into
//! the category's record with a `data_source` provenance tag. Category
//! methods never return `Err`; total failure is encoded as an error record.
//!
//! The six categories are exposed both as methods on [`MarketData`] and as
//! agent-callable tools via [`tools::register_market_tools`].

pub mod categories;
pub mod config;
pub mod error;
pub mod fallback;
pub mod providers;
pub mod records;
pub mod retry;
pub mod symbol;
pub mod tools;

pub use categories::MarketData;
pub use config::MarketConfig;
pub use error::{MarketError, Result};
pub use fallback::{Fetched, fetch_with_fallback};
pub use records::{CategoryResult, DataSource};
pub use retry::FallbackRetry;
