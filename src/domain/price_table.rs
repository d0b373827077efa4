//! Multi-instrument price table on a shared date axis.
//!
//! Every column carries an explicit [`ColumnKind`] tag, so indicator
//! functions pick raw price columns by tag and never by parsing names.

use crate::domain::price::{PricePoint, PriceSeries};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt;

/// Days in the trailing 52-week window (trading-day approximation).
pub const WEEKS_52_WINDOW: usize = 252;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Raw,
    MovingAverage(usize),
    RollingHigh(usize),
    RollingLow(usize),
    Rsi(usize),
}

impl ColumnKind {
    pub fn is_raw(&self) -> bool {
        matches!(self, ColumnKind::Raw)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Raw => write!(f, "PRICE"),
            ColumnKind::MovingAverage(period) => write!(f, "MA{}", period),
            ColumnKind::RollingHigh(WEEKS_52_WINDOW) => write!(f, "52w_high"),
            ColumnKind::RollingLow(WEEKS_52_WINDOW) => write!(f, "52w_low"),
            ColumnKind::RollingHigh(window) => write!(f, "high{}", window),
            ColumnKind::RollingLow(window) => write!(f, "low{}", window),
            ColumnKind::Rsi(period) => write!(f, "RSI{}", period),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub symbol: String,
    pub kind: ColumnKind,
    pub values: Vec<Option<f64>>,
}

impl Column {
    /// Display label: the bare symbol for raw prices, `SYMBOL_<kind>` otherwise.
    pub fn name(&self) -> String {
        match self.kind {
            ColumnKind::Raw => self.symbol.clone(),
            kind => format!("{}_{}", self.symbol, kind),
        }
    }

    /// Last present value.
    pub fn last_value(&self) -> Option<f64> {
        self.values.iter().rev().find_map(|v| *v)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl PriceTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Aligns each symbol's series on the union of all dates. Dates a symbol
    /// lacks become gaps (`None`), never zeros.
    pub fn from_series(entries: Vec<(String, PriceSeries)>) -> Self {
        let axis: BTreeSet<NaiveDate> = entries
            .iter()
            .flat_map(|(_, s)| s.points().iter().map(|p| p.date))
            .collect();
        let dates: Vec<NaiveDate> = axis.into_iter().collect();

        let columns = entries
            .into_iter()
            .map(|(symbol, series)| {
                let values = dates
                    .iter()
                    .map(|&d| series.price_on(d).filter(|p| p.is_finite()))
                    .collect();
                Column {
                    symbol,
                    kind: ColumnKind::Raw,
                    values,
                }
            })
            .collect();

        Self { dates, columns }
    }

    pub(crate) fn with_columns(dates: Vec<NaiveDate>, columns: Vec<Column>) -> Self {
        Self { dates, columns }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn raw_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.kind.is_raw())
    }

    pub fn symbols(&self) -> Vec<String> {
        self.raw_columns().map(|c| c.symbol.clone()).collect()
    }

    pub fn column(&self, symbol: &str, kind: ColumnKind) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.symbol == symbol && c.kind == kind)
    }

    /// Raw prices of `symbol` with gaps dropped.
    pub fn raw_series(&self, symbol: &str) -> Option<PriceSeries> {
        let column = self.column(symbol, ColumnKind::Raw)?;
        let points = self
            .dates
            .iter()
            .zip(&column.values)
            .filter_map(|(&date, value)| value.map(|p| PricePoint::new(date, p)))
            .collect();
        PriceSeries::new(points).ok()
    }

    /// Adds or replaces the column with the same symbol and kind.
    pub(crate) fn upsert(&mut self, column: Column) {
        match self
            .columns
            .iter_mut()
            .find(|c| c.symbol == column.symbol && c.kind == column.kind)
        {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }
}
