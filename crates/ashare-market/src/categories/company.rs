//! Company profile normalization

use crate::fallback::Fetched;
use crate::providers::{CompanySurvey, StockSnapshot, YahooInfo};
use crate::records::CompanyProfile;
use chrono::DateTime;

pub(crate) fn normalize(
    code: &str,
    fetched: &Fetched<(StockSnapshot, CompanySurvey), YahooInfo>,
) -> CompanyProfile {
    let data_source = fetched.data_source();

    match fetched {
        Fetched::Primary((snapshot, survey)) => CompanyProfile {
            symbol: code.to_string(),
            company_name: survey
                .org_name
                .clone()
                .or_else(|| snapshot.name.clone())
                .unwrap_or_default(),
            industry: snapshot.industry.clone().unwrap_or_default(),
            listing_date: snapshot.listing_date_string(),
            business_scope: survey.business_scope.clone().unwrap_or_default(),
            company_introduction: survey.org_profile.clone().unwrap_or_default(),
            total_employees: survey.employees.unwrap_or_default(),
            shares_outstanding: snapshot.total_shares.unwrap_or_default(),
            data_source,
            note: String::new(),
        },
        Fetched::Fallback(info) => CompanyProfile {
            symbol: code.to_string(),
            company_name: info.long_name.clone().unwrap_or_default(),
            industry: info.industry.clone().unwrap_or_default(),
            listing_date: first_trade_date_string(info.first_trade_date),
            business_scope: String::new(),
            company_introduction: info.long_business_summary.clone().unwrap_or_default(),
            total_employees: info.full_time_employees.unwrap_or_default(),
            shares_outstanding: info.shares_outstanding.unwrap_or_default(),
            data_source,
            note: "business scope not available from fallback provider".to_string(),
        },
    }
}

fn first_trade_date_string(epoch: Option<i64>) -> String {
    epoch
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.date_naive().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::DataSource;

    #[test]
    fn test_primary_combines_snapshot_and_survey() {
        let snapshot = StockSnapshot {
            name: Some("Kweichow Moutai".to_string()),
            industry: Some("Liquor".to_string()),
            total_shares: Some(1_256_197_800.0),
            listing_date: Some(20_010_827),
            ..Default::default()
        };
        let survey = CompanySurvey {
            org_name: Some("Kweichow Moutai Co., Ltd.".to_string()),
            business_scope: Some("Production and sale of Moutai liquor".to_string()),
            employees: Some(34_396),
            ..Default::default()
        };

        let profile = normalize("600519", &Fetched::Primary((snapshot, survey)));
        assert_eq!(profile.company_name, "Kweichow Moutai Co., Ltd.");
        assert_eq!(profile.industry, "Liquor");
        assert_eq!(profile.listing_date, "2001-08-27");
        assert_eq!(profile.total_employees, 34_396);
        assert_eq!(profile.data_source, DataSource::Eastmoney);
    }

    #[test]
    fn test_fallback_uses_first_trade_date() {
        let info = YahooInfo {
            long_name: Some("Kweichow Moutai Co., Ltd.".to_string()),
            first_trade_date: Some(998_870_400),
            full_time_employees: Some(34_396),
            ..Default::default()
        };

        let profile = normalize("600519", &Fetched::Fallback(info));
        assert_eq!(profile.listing_date, "2001-08-27");
        assert_eq!(profile.business_scope, "");
        assert_eq!(profile.data_source, DataSource::Yahoo);
    }

    #[test]
    fn test_missing_fields_default_to_empty_and_zero() {
        let profile = normalize(
            "600519",
            &Fetched::Primary((StockSnapshot::default(), CompanySurvey::default())),
        );
        assert_eq!(profile.company_name, "");
        assert_eq!(profile.listing_date, "");
        assert_eq!(profile.total_employees, 0);
    }
}
