//! Market data port.

use crate::domain::error::StocksimError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait PriceDataPort {
    /// Daily bars for `symbol` with `start <= date < end`.
    ///
    /// An unknown symbol is `Ok(vec![])`; `Err` means the source itself
    /// failed.
    fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StocksimError>;

    fn list_symbols(&self) -> Result<Vec<String>, StocksimError>;
}
