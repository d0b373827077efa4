//! Price performance statistics for a single instrument.

use crate::domain::indicator::{RSI_PERIOD, wilder_rsi};
use crate::domain::indicator_helpers::{max, mean, min};
use crate::domain::price::PriceSeries;
use crate::domain::price_table::WEEKS_52_WINDOW;
use chrono::{Datelike, Duration, NaiveDate};

/// Lookback windows in calendar days, labelled for display.
pub const LOOKBACKS: [(&str, i64); 8] = [
    ("Perf Week", 7),
    ("Perf Month", 30),
    ("Perf Quarter", 91),
    ("Perf Half Y", 182),
    ("Perf Year", 365),
    ("Perf 3Y", 365 * 3),
    ("Perf 5Y", 365 * 5),
    ("Perf 10Y", 365 * 10),
];

pub const SMA_DISTANCES: [usize; 3] = [20, 50, 200];

/// Fractional change `(current - old) / old`; `None` when `old` is zero or
/// not finite.
pub fn change(current: f64, old: f64) -> Option<f64> {
    if old == 0.0 || !old.is_finite() || !current.is_finite() {
        return None;
    }
    Some((current - old) / old)
}

/// Percent change from the first to the last price.
pub fn growth_pct(series: &PriceSeries) -> Option<f64> {
    let clean = series.without_gaps();
    let (first, last) = (clean.first()?, clean.last()?);
    change(last.price, first.price).map(|c| c * 100.0)
}

/// Change from the price on the date nearest `last_date - days` to the last
/// price. Ties resolve to the earlier date.
pub fn period_change(series: &PriceSeries, days: i64) -> Option<f64> {
    let clean = series.without_gaps();
    let last = *clean.last()?;
    let target = last.date - Duration::days(days);
    let old = clean
        .points()
        .iter()
        .min_by_key(|p| (p.date - target).num_days().abs())?;
    change(last.price, old.price)
}

/// Change since the first price of the last date's calendar year.
pub fn ytd_change(series: &PriceSeries) -> Option<f64> {
    let clean = series.without_gaps();
    let last = *clean.last()?;
    let year_start = NaiveDate::from_ymd_opt(last.date.year(), 1, 1)?;
    let first_of_year = clean.points().iter().find(|p| p.date >= year_start)?;
    change(last.price, first_of_year.price)
}

/// Relative distance of the last price from its full-window SMA.
pub fn sma_distance(series: &PriceSeries, period: usize) -> Option<f64> {
    let prices = series.without_gaps().prices();
    if period == 0 || prices.len() < period {
        return None;
    }
    let window = &prices[prices.len() - period..];
    change(*prices.last()?, mean(window))
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub last_date: NaiveDate,
    pub last_price: f64,
    pub growth_pct: Option<f64>,
    pub lookbacks: Vec<(&'static str, Option<f64>)>,
    pub ytd: Option<f64>,
    pub sma_distances: Vec<(usize, Option<f64>)>,
    pub high_52w: f64,
    pub low_52w: f64,
    pub rsi: Option<f64>,
}

impl PerformanceSummary {
    /// `None` for a series with no usable prices.
    pub fn compute(series: &PriceSeries) -> Option<Self> {
        let clean = series.without_gaps();
        let last = *clean.last()?;
        let prices = clean.prices();
        let window = &prices[prices.len().saturating_sub(WEEKS_52_WINDOW)..];

        Some(PerformanceSummary {
            last_date: last.date,
            last_price: last.price,
            growth_pct: growth_pct(&clean),
            lookbacks: LOOKBACKS
                .iter()
                .map(|&(label, days)| (label, period_change(&clean, days)))
                .collect(),
            ytd: ytd_change(&clean),
            sma_distances: SMA_DISTANCES
                .iter()
                .map(|&p| (p, sma_distance(&clean, p)))
                .collect(),
            high_52w: max(window),
            low_52w: min(window),
            rsi: wilder_rsi(&prices, RSI_PERIOD).last().copied().flatten(),
        })
    }
}

/// Compact number: `1.23T`, `4.56B`, `7.89M`, else two decimals. `-` if absent.
pub fn format_compact(num: Option<f64>) -> String {
    match num {
        None => "-".to_string(),
        Some(n) if !n.is_finite() => "-".to_string(),
        Some(n) if n >= 1e12 => format!("{:.2}T", n / 1e12),
        Some(n) if n >= 1e9 => format!("{:.2}B", n / 1e9),
        Some(n) if n >= 1e6 => format!("{:.2}M", n / 1e6),
        Some(n) => format!("{:.2}", n),
    }
}

/// Fraction as a percentage with two decimals. `-` if absent.
pub fn format_percent(fraction: Option<f64>) -> String {
    match fraction {
        Some(f) if f.is_finite() => format!("{:.2}%", f * 100.0),
        _ => "-".to_string(),
    }
}
