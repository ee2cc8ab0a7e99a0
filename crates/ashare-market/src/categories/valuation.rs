//! Valuation normalization
//!
//! The circulating market cap has no direct Yahoo counterpart: it is
//! estimated from float shares when available, otherwise as 70% of the
//! total market cap.

use crate::fallback::Fetched;
use crate::providers::{StockSnapshot, YahooInfo};
use crate::records::{IndustryAverages, Valuation};

const CIRCULATING_CAP_FRACTION: f64 = 0.7;

pub(crate) fn normalize(
    code: &str,
    fetched: &Fetched<StockSnapshot, YahooInfo>,
    industry_averages: IndustryAverages,
) -> Valuation {
    let data_source = fetched.data_source();

    match fetched {
        Fetched::Primary(snapshot) => Valuation {
            symbol: code.to_string(),
            name: snapshot.name.clone().unwrap_or_default(),
            latest_price: snapshot.latest_price.unwrap_or_default(),
            pe_ttm: snapshot.pe_ttm.unwrap_or_default(),
            pb: snapshot.pb.unwrap_or_default(),
            eps_ttm: snapshot.eps_ttm.unwrap_or_default(),
            eps_forward: 0.0,
            market_cap: snapshot.market_cap.unwrap_or_default(),
            circulating_market_cap: snapshot.circulating_market_cap.unwrap_or_default(),
            industry_averages,
            data_source,
            note: String::new(),
        },
        Fetched::Fallback(info) => Valuation {
            symbol: code.to_string(),
            name: info.long_name.clone().unwrap_or_default(),
            latest_price: info.current_price.unwrap_or_default(),
            pe_ttm: info.trailing_pe.unwrap_or_default(),
            pb: info.price_to_book.unwrap_or_default(),
            eps_ttm: info.trailing_eps.unwrap_or_default(),
            eps_forward: info.forward_eps.unwrap_or_default(),
            market_cap: info.market_cap.unwrap_or_default(),
            circulating_market_cap: estimate_circulating_cap(info),
            industry_averages,
            data_source,
            note: "circulating market cap estimated".to_string(),
        },
    }
}

/// Fill forward-looking fields the primary provider lacks; absent values
/// stay at their zero defaults
pub(crate) fn enrich_from_info(valuation: &mut Valuation, info: &YahooInfo) {
    if valuation.eps_forward == 0.0 {
        valuation.eps_forward = info.forward_eps.unwrap_or_default();
    }
    if valuation.eps_ttm == 0.0 {
        valuation.eps_ttm = info.trailing_eps.unwrap_or_default();
    }
}

fn estimate_circulating_cap(info: &YahooInfo) -> f64 {
    match (info.float_shares, info.current_price) {
        (Some(float_shares), Some(price)) if float_shares > 0.0 => float_shares * price,
        _ => info.market_cap.unwrap_or_default() * CIRCULATING_CAP_FRACTION,
    }
}
