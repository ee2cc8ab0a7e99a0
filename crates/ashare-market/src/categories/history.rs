//! Price history normalization
//!
//! Both providers are reduced to the same shape: bars sorted most recent
//! first and truncated to a fixed window. Yahoo bars carry no change
//! percent, so it is derived from consecutive closes before sorting.

use crate::fallback::Fetched;
use crate::providers::{Kline, YahooBar};
use crate::records::{DailyBar, PriceHistory};

/// Trading days kept in the normalized record
pub(crate) const WINDOW: usize = 30;

/// Calendar days requested from the fallback provider; wide enough to
/// cover the window across weekends and holidays
pub(crate) const FALLBACK_SPAN_DAYS: i64 = 60;

pub(crate) fn normalize(code: &str, fetched: &Fetched<Vec<Kline>, Vec<YahooBar>>) -> PriceHistory {
    let data_source = fetched.data_source();

    let mut history: Vec<DailyBar> = match fetched {
        Fetched::Primary(klines) => klines
            .iter()
            .map(|k| DailyBar {
                date: k.date,
                open: k.open,
                close: k.close,
                high: k.high,
                low: k.low,
                volume: k.volume,
                change_percent: k.change_percent,
            })
            .collect(),
        Fetched::Fallback(bars) => with_change_percent(bars),
    };

    history.sort_by(|a, b| b.date.cmp(&a.date));
    history.truncate(WINDOW);

    PriceHistory {
        symbol: code.to_string(),
        latest_price: history.first().map(|bar| bar.close).unwrap_or_default(),
        count: history.len(),
        history,
        data_source,
        note: String::new(),
    }
}

/// Derive day-over-day change percent from consecutive closes; the oldest
/// bar has no predecessor and stays 0
fn with_change_percent(bars: &[YahooBar]) -> Vec<DailyBar> {
    let mut sorted: Vec<&YahooBar> = bars.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));

    sorted
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let change_percent = if i > 0 && sorted[i - 1].close > 0.0 {
                (bar.close - sorted[i - 1].close) / sorted[i - 1].close * 100.0
            } else {
                0.0
            };
            DailyBar {
                date: bar.date,
                open: bar.open,
                close: bar.close,
                high: bar.high,
                low: bar.low,
                volume: bar.volume as f64,
                change_percent,
            }
        })
        .collect()
}
