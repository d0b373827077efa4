//! Simple moving average columns.
//!
//! MA(n)[d] = mean of the raw price over the trailing n rows ending at d.
//! Fewer than n rows at the start: average whatever is available.

use crate::domain::error::StocksimError;
use crate::domain::indicator::Periods;
use crate::domain::indicator_helpers::{mean, rolling};
use crate::domain::price_table::{Column, ColumnKind, PriceTable};

pub fn add_moving_average(
    table: &PriceTable,
    periods: impl Into<Periods>,
) -> Result<PriceTable, StocksimError> {
    let periods = periods.into();
    if let Some(&bad) = periods.as_slice().iter().find(|&&p| p == 0) {
        return Err(StocksimError::InvalidPeriod { period: bad });
    }

    let mut out = table.clone();
    for column in table.raw_columns() {
        for &period in periods.as_slice() {
            out.upsert(Column {
                symbol: column.symbol.clone(),
                kind: ColumnKind::MovingAverage(period),
                values: rolling(&column.values, period, mean),
            });
        }
    }
    Ok(out)
}
