//! Live quote normalization (fallback provider only)

use crate::providers::YahooInfo;
use crate::records::{DataSource, LiveQuote};

pub(crate) fn normalize(code: &str, info: &YahooInfo) -> LiveQuote {
    LiveQuote {
        symbol: code.to_string(),
        latest_price: info.current_price.unwrap_or_default(),
        change_percent: info.regular_market_change_percent.unwrap_or_default(),
        volume: info.regular_market_volume.unwrap_or_default(),
        avg_volume: info.average_volume.unwrap_or_default(),
        beta: info.beta.unwrap_or_default(),
        market_cap: info.market_cap.unwrap_or_default(),
        moving_average_50: info.fifty_day_average.unwrap_or_default(),
        moving_average_200: info.two_hundred_day_average.unwrap_or_default(),
        data_source: DataSource::Yahoo,
        note: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_maps_summary_fields() {
        let info = YahooInfo {
            current_price: Some(1685.0),
            regular_market_change_percent: Some(-0.82),
            regular_market_volume: Some(3_246_900),
            average_volume: Some(2_800_000),
            beta: Some(0.45),
            fifty_day_average: Some(1650.2),
            two_hundred_day_average: Some(1588.7),
            ..Default::default()
        };

        let quote = normalize("600519", &info);
        assert_eq!(quote.latest_price, 1685.0);
        assert_eq!(quote.moving_average_50, 1650.2);
        assert_eq!(quote.moving_average_200, 1588.7);
        assert_eq!(quote.data_source, DataSource::Yahoo);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let quote = normalize("600519", &YahooInfo::default());
        assert_eq!(quote.latest_price, 0.0);
        assert_eq!(quote.volume, 0);
        assert_eq!(quote.beta, 0.0);
    }
}
