//! Yahoo Finance client (fallback provider)
//!
//! Daily history goes through the `yahoo_finance_api` connector; the
//! fundamentals summary comes from the `quoteSummary` endpoint directly
//! because the connector does not expose it. Summary values arrive as
//! `{"raw": ..., "fmt": ...}` pairs which are flattened to their raw form.
//!
//! A known failure mode: for unknown or throttled tickers Yahoo sometimes
//! answers with a near-empty summary whose only key is `trailingPegRatio`
//! instead of an error. [`YahooInfo::is_sentinel`] detects that shape so
//! callers can retry.

use crate::config::MarketConfig;
use crate::error::{MarketError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

const QUOTE_SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const QUOTE_SUMMARY_MODULES: &str =
    "price,summaryDetail,defaultKeyStatistics,financialData,assetProfile";

/// One daily bar from the history endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct YahooBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Flattened fundamentals summary for one ticker
#[derive(Debug, Clone, Default)]
pub struct YahooInfo {
    pub long_name: Option<String>,
    pub industry: Option<String>,
    pub long_business_summary: Option<String>,
    pub full_time_employees: Option<u64>,
    pub first_trade_date: Option<i64>,
    pub shares_outstanding: Option<f64>,
    pub float_shares: Option<f64>,
    pub current_price: Option<f64>,
    pub regular_market_change_percent: Option<f64>,
    pub regular_market_volume: Option<u64>,
    pub average_volume: Option<u64>,
    pub trailing_pe: Option<f64>,
    pub price_to_book: Option<f64>,
    pub trailing_eps: Option<f64>,
    pub forward_eps: Option<f64>,
    pub market_cap: Option<f64>,
    pub beta: Option<f64>,
    pub fifty_day_average: Option<f64>,
    pub two_hundred_day_average: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub current_ratio: Option<f64>,
    pub quick_ratio: Option<f64>,
    pub total_debt: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub gross_margins: Option<f64>,
    pub net_income_to_common: Option<f64>,
    pub total_revenue: Option<f64>,
    /// Empty-response marker: the summary held at most one key and it was
    /// `trailingPegRatio`. Crate-visible so category tests can build infos
    /// with struct update syntax.
    pub(crate) sentinel: bool,
}

impl YahooInfo {
    /// Whether this response is the near-empty shape Yahoo returns instead
    /// of an error
    pub fn is_sentinel(&self) -> bool {
        self.sentinel
    }

    /// Build from a flattened summary map
    pub fn from_flat(flat: &Map<String, Value>) -> Self {
        let f64_of = |key: &str| flat.get(key).and_then(Value::as_f64);
        let u64_of = |key: &str| flat.get(key).and_then(Value::as_u64);
        let str_of = |key: &str| flat.get(key).and_then(Value::as_str).map(String::from);

        Self {
            long_name: str_of("longName").or_else(|| str_of("shortName")),
            industry: str_of("industry"),
            long_business_summary: str_of("longBusinessSummary"),
            full_time_employees: u64_of("fullTimeEmployees"),
            first_trade_date: flat.get("firstTradeDateEpochUtc").and_then(Value::as_i64),
            shares_outstanding: f64_of("sharesOutstanding"),
            float_shares: f64_of("floatShares"),
            current_price: f64_of("currentPrice").or_else(|| f64_of("regularMarketPrice")),
            regular_market_change_percent: f64_of("regularMarketChangePercent"),
            regular_market_volume: u64_of("regularMarketVolume"),
            average_volume: u64_of("averageVolume"),
            trailing_pe: f64_of("trailingPE"),
            price_to_book: f64_of("priceToBook"),
            trailing_eps: f64_of("trailingEps"),
            forward_eps: f64_of("forwardEps"),
            market_cap: f64_of("marketCap"),
            beta: f64_of("beta"),
            fifty_day_average: f64_of("fiftyDayAverage"),
            two_hundred_day_average: f64_of("twoHundredDayAverage"),
            debt_to_equity: f64_of("debtToEquity"),
            current_ratio: f64_of("currentRatio"),
            quick_ratio: f64_of("quickRatio"),
            total_debt: f64_of("totalDebt"),
            earnings_growth: f64_of("earningsGrowth"),
            revenue_growth: f64_of("revenueGrowth"),
            fifty_two_week_high: f64_of("fiftyTwoWeekHigh"),
            fifty_two_week_low: f64_of("fiftyTwoWeekLow"),
            return_on_equity: f64_of("returnOnEquity"),
            gross_margins: f64_of("grossMargins"),
            net_income_to_common: f64_of("netIncomeToCommon"),
            total_revenue: f64_of("totalRevenue"),
            // A fully empty map counts as the sentinel shape as well; it
            // carries no usable data and gets the same retry treatment
            sentinel: flat.len() <= 1
                && flat.keys().all(|key| key == "trailingPegRatio"),
        }
    }
}

/// Merge all summary modules into one flat map, unwrapping `{"raw": ...}`
fn flatten_summary(result: &Value) -> Map<String, Value> {
    let mut flat = Map::new();

    let Some(modules) = result.as_object() else {
        return flat;
    };

    for module in modules.values() {
        let Some(fields) = module.as_object() else {
            continue;
        };
        for (key, value) in fields {
            let scalar = match value {
                Value::Object(pair) => pair.get("raw").cloned(),
                Value::Null | Value::Array(_) => None,
                other => Some(other.clone()),
            };
            if let Some(scalar) = scalar {
                flat.insert(key.clone(), scalar);
            }
        }
    }

    flat
}

/// Yahoo Finance client
pub struct YahooClient {
    http: Client,
}

impl YahooClient {
    /// Create a client; the summary endpoint honors the config's proxy and
    /// timeout
    pub fn new(config: &MarketConfig) -> Result<Self> {
        Ok(Self {
            http: config.http_client()?,
        })
    }

    /// Fetch and flatten the fundamentals summary for a suffixed ticker
    /// (`600519.SS` form)
    pub async fn info(&self, ticker: &str) -> Result<YahooInfo> {
        let url = format!(
            "{QUOTE_SUMMARY_URL}/{ticker}?modules={QUOTE_SUMMARY_MODULES}&formatted=false"
        );
        debug!(ticker, "yahoo summary request");

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(MarketError::Yahoo(format!(
                "summary request for {ticker} returned status {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        let result = body
            .pointer("/quoteSummary/result/0")
            .ok_or_else(|| MarketError::Yahoo(format!("no summary result for {ticker}")))?;

        Ok(YahooInfo::from_flat(&flatten_summary(result)))
    }

    /// Daily bars for the most recent `days` calendar days
    pub async fn history(&self, ticker: &str, days: i64) -> Result<Vec<YahooBar>> {
        let provider =
            yahoo::YahooConnector::new().map_err(|e| MarketError::Yahoo(e.to_string()))?;

        let end = Utc::now();
        let start = end - chrono::Duration::days(days);
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| MarketError::Yahoo(format!("invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| MarketError::Yahoo(format!("invalid end timestamp: {e}")))?;

        debug!(ticker, days, "yahoo history request");
        let response = provider
            .get_quote_history(ticker, start_odt, end_odt)
            .await
            .map_err(|e| MarketError::Yahoo(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| MarketError::Yahoo(e.to_string()))?;

        Ok(quotes
            .iter()
            .map(|q| YahooBar {
                date: DateTime::from_timestamp(q.timestamp as i64, 0)
                    .unwrap_or_else(Utc::now)
                    .date_naive(),
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
            })
            .collect())
    }
}
