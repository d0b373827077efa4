//! Daily OHLC bar as supplied by a market data provider.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<i64>,
}

impl OhlcvBar {
    /// The price the analytics consume. Providers call it "Close".
    pub fn price(&self) -> f64 {
        self.close
    }
}
