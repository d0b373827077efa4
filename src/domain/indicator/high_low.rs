//! 52-week rolling high and low.

use crate::domain::indicator_helpers::{max, min, rolling};
use crate::domain::price_table::{Column, ColumnKind, PriceTable, WEEKS_52_WINDOW};

pub fn add_52w_high_low(table: &PriceTable) -> PriceTable {
    let mut out = table.clone();
    for column in table.raw_columns() {
        out.upsert(Column {
            symbol: column.symbol.clone(),
            kind: ColumnKind::RollingHigh(WEEKS_52_WINDOW),
            values: rolling(&column.values, WEEKS_52_WINDOW, max),
        });
        out.upsert(Column {
            symbol: column.symbol.clone(),
            kind: ColumnKind::RollingLow(WEEKS_52_WINDOW),
            values: rolling(&column.values, WEEKS_52_WINDOW, min),
        });
    }
    out
}
