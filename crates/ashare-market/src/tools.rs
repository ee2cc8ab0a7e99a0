//! Tool wrappers exposing each data category to the agent

use crate::categories::MarketData;
use ashare_tools::{Tool, ToolError, ToolRegistry};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

/// The six data categories an agent can request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Valuation,
    CompanyInfo,
    FinancialIndicators,
    PriceHistory,
    LiveQuote,
    RiskIndicators,
}

impl Category {
    /// All categories in report order
    pub const ALL: [Category; 6] = [
        Category::Valuation,
        Category::CompanyInfo,
        Category::FinancialIndicators,
        Category::PriceHistory,
        Category::LiveQuote,
        Category::RiskIndicators,
    ];

    /// Tool name exposed to the model
    pub fn tool_name(self) -> &'static str {
        match self {
            Category::Valuation => "get_valuation",
            Category::CompanyInfo => "get_company_info",
            Category::FinancialIndicators => "get_financial_indicators",
            Category::PriceHistory => "get_price_history",
            Category::LiveQuote => "get_live_quote",
            Category::RiskIndicators => "get_risk_indicators",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Category::Valuation => {
                "Valuation metrics for an A-share stock: latest price, PE/PB multiples, \
                 EPS, market caps and industry peer averages"
            }
            Category::CompanyInfo => {
                "Company profile for an A-share stock: name, industry, listing date, \
                 business scope, introduction, headcount and shares outstanding"
            }
            Category::FinancialIndicators => {
                "Recent periodic financial indicators: ROE, gross margin, net profit \
                 growth, revenue and net profit per report period"
            }
            Category::PriceHistory => {
                "Daily OHLCV bars for the most recent trading month, newest first"
            }
            Category::LiveQuote => {
                "Live quote: price, change percent, volumes, beta and moving averages"
            }
            Category::RiskIndicators => {
                "Risk indicators: beta, leverage and liquidity ratios, growth rates \
                 and 52-week volatility"
            }
        }
    }
}

/// One registered tool per category, all sharing the same market handle
pub struct CategoryTool {
    category: Category,
    market: Arc<MarketData>,
}

impl CategoryTool {
    pub fn new(category: Category, market: Arc<MarketData>) -> Self {
        Self { category, market }
    }
}

fn validate_symbol(params: &Value) -> Result<&str, ToolError> {
    let symbol = params
        .get("symbol")
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidParameters("missing 'symbol' parameter".to_string()))?;

    if symbol.len() != 6 || !symbol.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ToolError::InvalidParameters(format!(
            "'{symbol}' is not a 6-digit A-share code"
        )));
    }

    Ok(symbol)
}

#[async_trait]
impl Tool for CategoryTool {
    async fn execute(&self, params: Value) -> ashare_tools::Result<Value> {
        let symbol = validate_symbol(&params)?;

        // Category fetchers embed failures in the record itself, so this
        // never returns an execution error for provider trouble
        let result = match self.category {
            Category::Valuation => self.market.valuation(symbol).await.to_value(),
            Category::CompanyInfo => self.market.company_info(symbol).await.to_value(),
            Category::FinancialIndicators => {
                self.market.financial_indicators(symbol).await.to_value()
            }
            Category::PriceHistory => self.market.price_history(symbol).await.to_value(),
            Category::LiveQuote => self.market.live_quote(symbol).await.to_value(),
            Category::RiskIndicators => self.market.risk_indicators(symbol).await.to_value(),
        };

        Ok(result)
    }

    fn name(&self) -> &str {
        self.category.tool_name()
    }

    fn description(&self) -> &str {
        self.category.description()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "6-digit A-share stock code, e.g. 600519",
                    "pattern": "^[0-9]{6}$"
                }
            },
            "required": ["symbol"]
        })
    }
}

/// Register one tool per category on the given registry
pub fn register_market_tools(registry: &ToolRegistry, market: &Arc<MarketData>) {
    for category in Category::ALL {
        registry.register(Arc::new(CategoryTool::new(category, Arc::clone(market))));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_symbol() {
        assert_eq!(validate_symbol(&json!({"symbol": "600519"})).unwrap(), "600519");
        assert!(validate_symbol(&json!({"symbol": "60051"})).is_err());
        assert!(validate_symbol(&json!({"symbol": "60051A"})).is_err());
        assert!(validate_symbol(&json!({"symbol": 600519})).is_err());
        assert!(validate_symbol(&json!({})).is_err());
    }

    #[test]
    fn test_tool_names_are_unique() {
        let mut names: Vec<&str> = Category::ALL.iter().map(|c| c.tool_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Category::ALL.len());
    }
}
