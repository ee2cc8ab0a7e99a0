//! Industry peer-average normalization

use crate::providers::IndustryComparison;
use crate::records::{DataSource, IndustryAverages};

/// Map the F10 aggregate row onto the fixed-schema record
pub(crate) fn normalize(comparison: &IndustryComparison) -> IndustryAverages {
    let value = |v: Option<f64>| v.unwrap_or_default();

    IndustryAverages {
        industry: comparison.industry.clone().unwrap_or_default(),
        eps_growth_3y_avg: value(comparison.eps_growth_3y),
        eps_growth_ttm_avg: value(comparison.eps_growth_ttm),
        revenue_growth_3y_avg: value(comparison.revenue_growth_3y),
        revenue_growth_ttm_avg: value(comparison.revenue_growth_ttm),
        net_profit_growth_3y_avg: value(comparison.net_profit_growth_3y),
        net_profit_growth_ttm_avg: value(comparison.net_profit_growth_ttm),
        pe_ttm_avg: value(comparison.pe_ttm),
        pb_mrq_avg: value(comparison.pb_mrq),
        ps_ttm_avg: value(comparison.ps_ttm),
        peg_avg: value(comparison.peg),
        ev_ebitda_avg: value(comparison.ev_ebitda),
        data_source: DataSource::Eastmoney,
        note: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_fills_missing_with_zero() {
        let comparison = IndustryComparison {
            industry: Some("Liquor".to_string()),
            pe_ttm: Some(31.2),
            pb_mrq: Some(6.4),
            ..Default::default()
        };

        let averages = normalize(&comparison);
        assert_eq!(averages.industry, "Liquor");
        assert_eq!(averages.pe_ttm_avg, 31.2);
        assert_eq!(averages.pb_mrq_avg, 6.4);
        assert_eq!(averages.eps_growth_3y_avg, 0.0);
        assert_eq!(averages.data_source, DataSource::Eastmoney);
    }
}
