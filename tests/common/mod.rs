#![allow(dead_code)]

use chrono::NaiveDate;
pub use stocksim::domain::ohlcv::OhlcvBar;
use stocksim::domain::error::StocksimError;
use stocksim::ports::data_port::PriceDataPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub calls: RefCell<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PriceDataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StocksimError> {
        self.calls
            .borrow_mut()
            .push((symbol.to_string(), start, end));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StocksimError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start && b.date < end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, StocksimError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(symbol: &str, date: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        symbol: symbol.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: Some(1000),
    }
}

/// One bar per calendar day, close rising by `step` each day.
pub fn generate_bars(
    symbol: &str,
    start_date: &str,
    count: usize,
    start_price: f64,
    step: f64,
) -> Vec<OhlcvBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let close = start_price + step * i as f64;
            OhlcvBar {
                symbol: symbol.to_string(),
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: Some(1000),
            }
        })
        .collect()
}
