//! RSI (Relative Strength Index) with Wilder smoothing.
//!
//! Per raw column, gaps are dropped first so they never count as flat days.
//! Day-over-day changes split into gains and losses, each smoothed with a
//! recursive EMA (alpha = 1/period, seeded with the first change):
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//!
//! Both averages zero: RSI = 50. Only avg_loss zero: RSI = 100.
//! The first sample has no change and no RSI.

use crate::domain::indicator_helpers::ema_unadjusted;
use crate::domain::price_table::{Column, ColumnKind, PriceTable};

pub const RSI_PERIOD: usize = 14;

/// RSI(14) for every raw column of `table`, on the table's date axis.
///
/// Columns with no usable prices are left out. When no column produces a
/// result the returned table is empty (no columns), not an error.
pub fn calculate_rsi(table: &PriceTable) -> PriceTable {
    let mut columns = Vec::new();

    for column in table.raw_columns() {
        let present: Vec<(usize, f64)> = column
            .values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.filter(|p| p.is_finite()).map(|p| (i, p)))
            .collect();
        if present.is_empty() {
            continue;
        }

        let prices: Vec<f64> = present.iter().map(|&(_, p)| p).collect();
        let rsi = wilder_rsi(&prices, RSI_PERIOD);

        let mut values = vec![None; table.dates().len()];
        for (&(i, _), value) in present.iter().zip(rsi) {
            values[i] = value;
        }

        columns.push(Column {
            symbol: column.symbol.clone(),
            kind: ColumnKind::Rsi(RSI_PERIOD),
            values,
        });
    }

    if columns.is_empty() {
        return PriceTable::empty();
    }
    PriceTable::with_columns(table.dates().to_vec(), columns)
}

/// Wilder RSI over a gap-free price slice. Output has one entry per price;
/// the first is always `None`.
pub fn wilder_rsi(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    if prices.is_empty() {
        return Vec::new();
    }

    let mut gains = Vec::with_capacity(prices.len() - 1);
    let mut losses = Vec::with_capacity(prices.len() - 1);
    for pair in prices.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let alpha = 1.0 / period.max(1) as f64;
    let avg_gain = ema_unadjusted(&gains, alpha);
    let avg_loss = ema_unadjusted(&losses, alpha);

    let mut out = Vec::with_capacity(prices.len());
    out.push(None);
    out.extend(
        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&up, &down)| Some(rsi_value(up, down))),
    );
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain == 0.0 && avg_loss == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
