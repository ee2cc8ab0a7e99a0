//! Normalized category records
//!
//! Every category handler produces a record with a fixed key set: numeric
//! fields default to 0 and string fields to "" when the upstream value is
//! absent, so no key is ever missing from the serialized output. Downstream
//! consumers must treat 0 as "unknown/missing", not as a valid financial
//! zero.

use chrono::NaiveDate;
use serde::Serialize;

/// Which provider produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Primary provider (East Money)
    Eastmoney,
    /// Fallback provider (Yahoo Finance)
    Yahoo,
    /// Lookup failed; record holds placeholder values
    Error,
}

/// Outcome of a category fetch
///
/// Serializes as either the category record itself or `{"error": "..."}`.
/// Category handlers return this instead of `Result`: total provider
/// failure is a normal outcome for the agent, not an exceptional one.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CategoryResult<T> {
    /// Normalized category record
    Data(T),
    /// Both providers failed; message retains both causes
    Error { error: String },
}

impl<T: Serialize> CategoryResult<T> {
    /// Build an error result
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// Whether this is the error variant
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Serialize to a JSON value (tool output format)
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({ "error": format!("failed to serialize record: {e}") })
        })
    }
}

/// Aggregate peer-group metrics for the symbol's industry
///
/// Looked up independently of the main valuation result; on failure it
/// degrades to an all-zero placeholder tagged with an error note instead of
/// propagating the failure.
#[derive(Debug, Clone, Serialize)]
pub struct IndustryAverages {
    pub industry: String,
    pub eps_growth_3y_avg: f64,
    pub eps_growth_ttm_avg: f64,
    pub revenue_growth_3y_avg: f64,
    pub revenue_growth_ttm_avg: f64,
    pub net_profit_growth_3y_avg: f64,
    pub net_profit_growth_ttm_avg: f64,
    pub pe_ttm_avg: f64,
    pub pb_mrq_avg: f64,
    pub ps_ttm_avg: f64,
    pub peg_avg: f64,
    pub ev_ebitda_avg: f64,
    pub data_source: DataSource,
    pub note: String,
}

impl IndustryAverages {
    /// All-zero placeholder used when the peer comparison lookup fails
    pub fn placeholder(industry: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            industry: industry.into(),
            eps_growth_3y_avg: 0.0,
            eps_growth_ttm_avg: 0.0,
            revenue_growth_3y_avg: 0.0,
            revenue_growth_ttm_avg: 0.0,
            net_profit_growth_3y_avg: 0.0,
            net_profit_growth_ttm_avg: 0.0,
            pe_ttm_avg: 0.0,
            pb_mrq_avg: 0.0,
            ps_ttm_avg: 0.0,
            peg_avg: 0.0,
            ev_ebitda_avg: 0.0,
            data_source: DataSource::Error,
            note: note.into(),
        }
    }
}

/// Market valuation record: price, multiples, market caps
#[derive(Debug, Clone, Serialize)]
pub struct Valuation {
    pub symbol: String,
    pub name: String,
    pub latest_price: f64,
    pub pe_ttm: f64,
    pub pb: f64,
    pub eps_ttm: f64,
    pub eps_forward: f64,
    pub market_cap: f64,
    pub circulating_market_cap: f64,
    pub industry_averages: IndustryAverages,
    pub data_source: DataSource,
    pub note: String,
}

/// Company profile record
#[derive(Debug, Clone, Serialize)]
pub struct CompanyProfile {
    pub symbol: String,
    pub company_name: String,
    pub industry: String,
    pub listing_date: String,
    pub business_scope: String,
    pub company_introduction: String,
    pub total_employees: u64,
    pub shares_outstanding: f64,
    pub data_source: DataSource,
    pub note: String,
}

/// One periodic financial snapshot
#[derive(Debug, Clone, Serialize)]
pub struct FinPeriodRecord {
    /// Report date (`YYYY-MM-DD`), empty for the synthesized fallback row
    pub date: String,
    pub roe: f64,
    pub gross_margin: f64,
    pub net_profit_growth: f64,
    pub total_revenue: f64,
    pub net_profit: f64,
}

/// Financial indicators record: most recent periodic snapshots first
#[derive(Debug, Clone, Serialize)]
pub struct FinancialIndicators {
    pub symbol: String,
    pub indicators: Vec<FinPeriodRecord>,
    pub count: usize,
    pub data_source: DataSource,
    pub note: String,
}

/// One daily OHLCV bar with change percent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub change_percent: f64,
}

/// Price history record: most recent bars first, truncated to a fixed window
#[derive(Debug, Clone, Serialize)]
pub struct PriceHistory {
    pub symbol: String,
    pub history: Vec<DailyBar>,
    pub count: usize,
    pub latest_price: f64,
    pub data_source: DataSource,
    pub note: String,
}

/// Live quote record (fallback-provider-only category)
#[derive(Debug, Clone, Serialize)]
pub struct LiveQuote {
    pub symbol: String,
    pub latest_price: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub avg_volume: u64,
    pub beta: f64,
    pub market_cap: f64,
    pub moving_average_50: f64,
    pub moving_average_200: f64,
    pub data_source: DataSource,
    pub note: String,
}

/// Risk indicators record (fallback-provider-only category)
#[derive(Debug, Clone, Serialize)]
pub struct RiskIndicators {
    pub symbol: String,
    pub beta: f64,
    pub debt_to_equity: f64,
    pub current_ratio: f64,
    pub quick_ratio: f64,
    pub total_debt: f64,
    pub earnings_growth: f64,
    pub revenue_growth: f64,
    pub volatility_percent: f64,
    pub fifty_two_week_high: f64,
    pub fifty_two_week_low: f64,
    pub data_source: DataSource,
    pub note: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_result_serialization() {
        let ok: CategoryResult<IndustryAverages> =
            CategoryResult::Data(IndustryAverages::placeholder("", "n/a"));
        let value = ok.to_value();
        assert!(value.get("error").is_none());
        assert_eq!(value["pe_ttm_avg"], 0.0);

        let err: CategoryResult<IndustryAverages> = CategoryResult::error("both failed");
        let value = err.to_value();
        assert_eq!(value["error"], "both failed");
    }

    #[test]
    fn test_placeholder_is_all_zero() {
        let avg = IndustryAverages::placeholder("Liquor", "lookup failed");
        let value = serde_json::to_value(&avg).unwrap();
        for key in [
            "eps_growth_3y_avg",
            "eps_growth_ttm_avg",
            "revenue_growth_3y_avg",
            "revenue_growth_ttm_avg",
            "net_profit_growth_3y_avg",
            "net_profit_growth_ttm_avg",
            "pe_ttm_avg",
            "pb_mrq_avg",
            "ps_ttm_avg",
            "peg_avg",
            "ev_ebitda_avg",
        ] {
            assert_eq!(value[key], 0.0, "expected zero default for {key}");
        }
        assert_eq!(value["data_source"], "error");
        assert_eq!(value["industry"], "Liquor");
    }

    #[test]
    fn test_data_source_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(DataSource::Eastmoney).unwrap(),
            "eastmoney"
        );
        assert_eq!(serde_json::to_value(DataSource::Yahoo).unwrap(), "yahoo");
        assert_eq!(serde_json::to_value(DataSource::Error).unwrap(), "error");
    }
}
