//! Financial indicators normalization
//!
//! The primary provider yields up to four periodic rows. The fallback
//! summary has no per-period history, so it is synthesized into a single
//! TTM-flavored row; the growth figure is unknown there and stays 0.

use crate::fallback::Fetched;
use crate::providers::{FinPeriod, YahooInfo};
use crate::records::{FinPeriodRecord, FinancialIndicators};

pub(crate) const PERIOD_LIMIT: u32 = 4;

pub(crate) fn normalize(
    code: &str,
    fetched: &Fetched<Vec<FinPeriod>, YahooInfo>,
) -> FinancialIndicators {
    let data_source = fetched.data_source();

    let (indicators, note) = match fetched {
        Fetched::Primary(periods) => {
            let rows: Vec<FinPeriodRecord> = periods
                .iter()
                .take(PERIOD_LIMIT as usize)
                .map(|period| FinPeriodRecord {
                    date: period.date(),
                    roe: period.roe.unwrap_or_default(),
                    gross_margin: period.gross_margin.unwrap_or_default(),
                    net_profit_growth: period.net_profit_growth.unwrap_or_default(),
                    total_revenue: period.total_revenue.unwrap_or_default(),
                    net_profit: period.net_profit.unwrap_or_default(),
                })
                .collect();
            (rows, String::new())
        }
        Fetched::Fallback(info) => {
            let row = FinPeriodRecord {
                date: String::new(),
                // Ratios arrive as fractions; records carry percents
                roe: info.return_on_equity.unwrap_or_default() * 100.0,
                gross_margin: info.gross_margins.unwrap_or_default() * 100.0,
                net_profit_growth: 0.0,
                total_revenue: info.total_revenue.unwrap_or_default(),
                net_profit: info.net_income_to_common.unwrap_or_default(),
            };
            (
                vec![row],
                "single trailing period synthesized from summary data".to_string(),
            )
        }
    };

    FinancialIndicators {
        symbol: code.to_string(),
        count: indicators.len(),
        indicators,
        data_source,
        note,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::DataSource;

    fn period(date: &str, roe: f64) -> FinPeriod {
        FinPeriod {
            report_date: Some(format!("{date} 00:00:00")),
            roe: Some(roe),
            gross_margin: Some(91.5),
            net_profit_growth: Some(15.0),
            total_revenue: Some(1.2e11),
            net_profit: Some(6.0e10),
        }
    }

    #[test]
    fn test_primary_keeps_at_most_four_periods() {
        let periods = vec![
            period("2024-09-30", 25.0),
            period("2024-06-30", 17.0),
            period("2024-03-31", 9.0),
            period("2023-12-31", 34.0),
            period("2023-09-30", 26.0),
        ];

        let record = normalize("600519", &Fetched::Primary(periods));
        assert_eq!(record.count, 4);
        assert_eq!(record.indicators.len(), 4);
        assert_eq!(record.indicators[0].date, "2024-09-30");
        assert_eq!(record.indicators[0].roe, 25.0);
        assert_eq!(record.data_source, DataSource::Eastmoney);
    }

    #[test]
    fn test_fallback_synthesizes_one_row() {
        let info = YahooInfo {
            return_on_equity: Some(0.34),
            gross_margins: Some(0.915),
            total_revenue: Some(1.5e11),
            net_income_to_common: Some(7.5e10),
            ..Default::default()
        };

        let record = normalize("600519", &Fetched::Fallback(info));
        assert_eq!(record.count, 1);
        let row = &record.indicators[0];
        assert_eq!(row.date, "");
        assert!((row.roe - 34.0).abs() < 1e-9);
        assert!((row.gross_margin - 91.5).abs() < 1e-9);
        assert_eq!(row.net_profit_growth, 0.0);
        assert_eq!(record.data_source, DataSource::Yahoo);
    }
}
