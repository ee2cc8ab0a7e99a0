//! Provider clients: East Money (primary) and Yahoo Finance (fallback)

mod eastmoney;
mod yahoo;

pub use eastmoney::{
    CompanySurvey, EastmoneyClient, FinPeriod, IndustryComparison, Kline, StockSnapshot,
};
pub use yahoo::{YahooBar, YahooClient, YahooInfo};
