//! East Money API client (primary provider)
//!
//! Three endpoint families are used: the `push2` realtime snapshot, the
//! `push2his` daily kline feed, and the F10 pages (company survey, industry
//! comparison) plus the datacenter report API for periodic financial
//! indicators. All are public JSON endpoints; numeric fields arrive
//! pre-scaled because requests pass `fltt=2`.
//!
//! Rate limit: self-imposed requests-per-minute cap, East Money publishes
//! no official quota but throttles aggressive clients.

use crate::config::MarketConfig;
use crate::error::{MarketError, Result};
use crate::symbol;
use chrono::NaiveDate;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const PUSH2_BASE_URL: &str = "https://push2.eastmoney.com";
const PUSH2HIS_BASE_URL: &str = "https://push2his.eastmoney.com";
const F10_BASE_URL: &str = "https://emweb.securities.eastmoney.com";
const DATACENTER_BASE_URL: &str = "https://datacenter-web.eastmoney.com";

/// Realtime snapshot: price, multiples, caps, identity fields
///
/// Field codes follow the push2 protocol; a null `data` object means the
/// security id is unknown.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockSnapshot {
    /// f43: latest price
    #[serde(rename = "f43", default)]
    pub latest_price: Option<f64>,
    /// f57: security code
    #[serde(rename = "f57", default)]
    pub code: Option<String>,
    /// f58: security name
    #[serde(rename = "f58", default)]
    pub name: Option<String>,
    /// f55: earnings per share (TTM)
    #[serde(rename = "f55", default)]
    pub eps_ttm: Option<f64>,
    /// f84: total shares
    #[serde(rename = "f84", default)]
    pub total_shares: Option<f64>,
    /// f85: float shares
    #[serde(rename = "f85", default)]
    pub float_shares: Option<f64>,
    /// f116: total market cap
    #[serde(rename = "f116", default)]
    pub market_cap: Option<f64>,
    /// f117: circulating market cap
    #[serde(rename = "f117", default)]
    pub circulating_market_cap: Option<f64>,
    /// f127: industry name
    #[serde(rename = "f127", default)]
    pub industry: Option<String>,
    /// f162: price/earnings (TTM)
    #[serde(rename = "f162", default)]
    pub pe_ttm: Option<f64>,
    /// f167: price/book
    #[serde(rename = "f167", default)]
    pub pb: Option<f64>,
    /// f189: listing date as yyyymmdd
    #[serde(rename = "f189", default)]
    pub listing_date: Option<u32>,
}

impl StockSnapshot {
    /// Listing date formatted as `YYYY-MM-DD`, empty when absent
    pub fn listing_date_string(&self) -> String {
        match self.listing_date {
            Some(ymd) if ymd >= 19_000_101 => {
                format!("{:04}-{:02}-{:02}", ymd / 10_000, ymd / 100 % 100, ymd % 100)
            }
            _ => String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    data: Option<StockSnapshot>,
}

/// One parsed daily kline bar
#[derive(Debug, Clone, PartialEq)]
pub struct Kline {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub change_percent: f64,
}

#[derive(Debug, Deserialize)]
struct KlineResponse {
    data: Option<KlineData>,
}

#[derive(Debug, Deserialize)]
struct KlineData {
    #[serde(default)]
    klines: Vec<String>,
}

/// One periodic row from the datacenter financial report
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinPeriod {
    /// Report date, `YYYY-MM-DD 00:00:00`
    #[serde(rename = "REPORT_DATE", default)]
    pub report_date: Option<String>,
    /// Return on equity (weighted), percent
    #[serde(rename = "ROEJQ", default)]
    pub roe: Option<f64>,
    /// Gross margin, percent
    #[serde(rename = "XSMLL", default)]
    pub gross_margin: Option<f64>,
    /// Net profit growth year over year, percent
    #[serde(rename = "PARENTNETPROFITTZ", default)]
    pub net_profit_growth: Option<f64>,
    /// Total operating revenue
    #[serde(rename = "TOTALOPERATEREVE", default)]
    pub total_revenue: Option<f64>,
    /// Net profit attributable to parent
    #[serde(rename = "PARENTNETPROFIT", default)]
    pub net_profit: Option<f64>,
}

impl FinPeriod {
    /// Report date trimmed to `YYYY-MM-DD`
    pub fn date(&self) -> String {
        self.report_date
            .as_deref()
            .map(|d| d.chars().take(10).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct DatacenterResponse {
    result: Option<DatacenterResult>,
}

#[derive(Debug, Deserialize)]
struct DatacenterResult {
    #[serde(default)]
    data: Vec<FinPeriod>,
}

/// Company survey from the F10 pages: descriptive fields the realtime
/// snapshot lacks
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct CompanySurvey {
    #[serde(rename = "ORG_NAME", default)]
    pub org_name: Option<String>,
    #[serde(rename = "BUSINESS_SCOPE", default)]
    pub business_scope: Option<String>,
    #[serde(rename = "ORG_PROFILE", default)]
    pub org_profile: Option<String>,
    #[serde(rename = "EMP_NUM", default)]
    pub employees: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SurveyResponse {
    #[serde(default)]
    jbzl: Vec<CompanySurvey>,
}

/// Industry peer averages from the F10 industry comparison page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndustryComparison {
    #[serde(rename = "BOARD_NAME", default)]
    pub industry: Option<String>,
    #[serde(rename = "EPS_GROWTH_3Y", default)]
    pub eps_growth_3y: Option<f64>,
    #[serde(rename = "EPS_GROWTH_TTM", default)]
    pub eps_growth_ttm: Option<f64>,
    #[serde(rename = "REVENUE_GROWTH_3Y", default)]
    pub revenue_growth_3y: Option<f64>,
    #[serde(rename = "REVENUE_GROWTH_TTM", default)]
    pub revenue_growth_ttm: Option<f64>,
    #[serde(rename = "PROFIT_GROWTH_3Y", default)]
    pub net_profit_growth_3y: Option<f64>,
    #[serde(rename = "PROFIT_GROWTH_TTM", default)]
    pub net_profit_growth_ttm: Option<f64>,
    #[serde(rename = "PE_TTM", default)]
    pub pe_ttm: Option<f64>,
    #[serde(rename = "PB_MRQ", default)]
    pub pb_mrq: Option<f64>,
    #[serde(rename = "PS_TTM", default)]
    pub ps_ttm: Option<f64>,
    #[serde(rename = "PEG_CAR", default)]
    pub peg: Option<f64>,
    #[serde(rename = "EV_EBITDA", default)]
    pub ev_ebitda: Option<f64>,
    /// Row kind marker; the industry-average row carries a non-stock code
    #[serde(rename = "CORRE_SECURITY_CODE", default)]
    pub row_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ComparisonResponse {
    #[serde(default)]
    hyjzbj: Vec<IndustryComparison>,
}

/// East Money API client
pub struct EastmoneyClient {
    client: Client,
    rate_limiter: SharedRateLimiter,
}

impl EastmoneyClient {
    /// Create a client honoring the config's timeout, proxy and rate limit
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let per_minute = NonZeroU32::new(config.primary_rate_limit).ok_or_else(|| {
            MarketError::Config("primary_rate_limit must be greater than 0".to_string())
        })?;
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

        Ok(Self {
            client: config.http_client()?,
            rate_limiter,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.rate_limiter.until_ready().await;
        debug!(url, "eastmoney request");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(MarketError::Eastmoney(format!(
                "request to {url} returned status {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// Realtime snapshot for a bare 6-digit code
    pub async fn snapshot(&self, code: &str) -> Result<StockSnapshot> {
        let url = format!(
            "{PUSH2_BASE_URL}/api/qt/stock/get?invt=2&fltt=2&secid={}\
             &fields=f43,f55,f57,f58,f84,f85,f116,f117,f127,f162,f167,f189",
            symbol::to_secid(code)
        );

        let body: SnapshotResponse = self.get_json(&url).await?;
        body.data.ok_or_else(|| MarketError::Eastmoney(format!("no snapshot data for {code}")))
    }

    /// Most recent `limit` daily bars, forward-adjusted
    pub async fn daily_klines(&self, code: &str, limit: u32) -> Result<Vec<Kline>> {
        let url = format!(
            "{PUSH2HIS_BASE_URL}/api/qt/stock/kline/get?secid={}&klt=101&fqt=1\
             &fields1=f1,f2,f3,f4,f5,f6&fields2=f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61\
             &end=20500101&lmt={limit}",
            symbol::to_secid(code)
        );

        let body: KlineResponse = self.get_json(&url).await?;
        let data = body
            .data
            .ok_or_else(|| MarketError::Eastmoney(format!("no kline data for {code}")))?;

        data.klines.iter().map(|line| parse_kline(line)).collect()
    }

    /// Most recent `limit` periodic financial indicator rows, newest first
    pub async fn financial_indicators(&self, code: &str, limit: u32) -> Result<Vec<FinPeriod>> {
        let url = format!(
            "{DATACENTER_BASE_URL}/api/data/v1/get?reportName=RPT_DMSK_FN_MAIN\
             &columns=REPORT_DATE,ROEJQ,XSMLL,PARENTNETPROFITTZ,TOTALOPERATEREVE,PARENTNETPROFIT\
             &filter=(SECURITY_CODE%3D%22{code}%22)\
             &sortColumns=REPORT_DATE&sortTypes=-1&pageSize={limit}&pageNumber=1"
        );

        let body: DatacenterResponse = self.get_json(&url).await?;
        Ok(body.result.map(|r| r.data).unwrap_or_default())
    }

    /// Company survey (business scope, introduction, headcount)
    pub async fn company_survey(&self, code: &str) -> Result<CompanySurvey> {
        let url = format!(
            "{F10_BASE_URL}/PC_HSF10/CompanySurvey/PageAjax?code={}",
            symbol::to_prefixed(code)
        );

        let body: SurveyResponse = self.get_json(&url).await?;
        body.jbzl
            .into_iter()
            .next()
            .ok_or_else(|| MarketError::Eastmoney(format!("no company survey for {code}")))
    }

    /// Industry-average row from the F10 industry comparison page
    ///
    /// The page lists the stock itself, selected peers, and one aggregate
    /// row; only the aggregate row is returned here.
    pub async fn industry_comparison(&self, code: &str) -> Result<IndustryComparison> {
        let url = format!(
            "{F10_BASE_URL}/PC_HSF10/IndustryAnalysis/PageAjax?code={}",
            symbol::to_prefixed(code)
        );

        let body: ComparisonResponse = self.get_json(&url).await?;
        select_industry_average(body.hyjzbj)
            .ok_or_else(|| MarketError::Eastmoney(format!("no industry comparison for {code}")))
    }
}

/// Pick the aggregate row: the one without a per-stock security code
fn select_industry_average(rows: Vec<IndustryComparison>) -> Option<IndustryComparison> {
    rows.into_iter()
        .find(|row| row.row_code.as_deref().is_none_or(str::is_empty))
}

/// Parse one kline line:
/// `date,open,close,high,low,volume,amount,amplitude,pct_chg,chg,turnover`
fn parse_kline(line: &str) -> Result<Kline> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 9 {
        return Err(MarketError::Eastmoney(format!("malformed kline row: {line}")));
    }

    let num = |i: usize| -> Result<f64> {
        fields[i]
            .parse()
            .map_err(|_| MarketError::Eastmoney(format!("malformed kline field: {}", fields[i])))
    };

    Ok(Kline {
        date: NaiveDate::parse_from_str(fields[0], "%Y-%m-%d")
            .map_err(|_| MarketError::Eastmoney(format!("malformed kline date: {}", fields[0])))?,
        open: num(1)?,
        close: num(2)?,
        high: num(3)?,
        low: num(4)?,
        volume: num(5)?,
        change_percent: num(8)?,
    })
}
