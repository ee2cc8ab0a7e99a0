//! Risk indicator normalization (fallback provider only)

use crate::providers::YahooInfo;
use crate::records::{DataSource, RiskIndicators};

pub(crate) fn normalize(code: &str, info: &YahooInfo) -> RiskIndicators {
    let high = info.fifty_two_week_high.unwrap_or_default();
    let low = info.fifty_two_week_low.unwrap_or_default();

    RiskIndicators {
        symbol: code.to_string(),
        beta: info.beta.unwrap_or_default(),
        debt_to_equity: info.debt_to_equity.unwrap_or_default(),
        current_ratio: info.current_ratio.unwrap_or_default(),
        quick_ratio: info.quick_ratio.unwrap_or_default(),
        total_debt: info.total_debt.unwrap_or_default(),
        earnings_growth: info.earnings_growth.unwrap_or_default(),
        revenue_growth: info.revenue_growth.unwrap_or_default(),
        volatility_percent: volatility_percent(high, low),
        fifty_two_week_high: high,
        fifty_two_week_low: low,
        data_source: DataSource::Yahoo,
        note: String::new(),
    }
}

/// 52-week range as a percentage of the low; 0 when the low is missing so
/// the division never blows up on placeholder data
fn volatility_percent(high: f64, low: f64) -> f64 {
    if low > 0.0 {
        (high - low) / low * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volatility_from_52_week_range() {
        let info = YahooInfo {
            fifty_two_week_high: Some(1900.0),
            fifty_two_week_low: Some(1500.0),
            beta: Some(0.45),
            ..Default::default()
        };

        let risk = normalize("600519", &info);
        assert!((risk.volatility_percent - (400.0 / 1500.0 * 100.0)).abs() < 1e-9);
        assert_eq!(risk.fifty_two_week_high, 1900.0);
        assert_eq!(risk.data_source, DataSource::Yahoo);
    }

    #[test]
    fn test_zero_low_guards_division() {
        let info = YahooInfo {
            fifty_two_week_high: Some(1900.0),
            ..Default::default()
        };

        let risk = normalize("600519", &info);
        assert_eq!(risk.volatility_percent, 0.0);
    }
}
