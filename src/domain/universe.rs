//! Multi-symbol fetch with partial-failure tolerance.
//!
//! Parses symbol lists and fetches each symbol independently. A symbol that
//! fails or has no bars is skipped (and reported); the rest still make it
//! into the resulting [`PriceTable`].

use crate::domain::price::PriceSeries;
use crate::domain::price_table::PriceTable;
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Splits a comma-separated symbol list: trims, upper-cases, drops empty
/// tokens and duplicates while keeping first-seen order.
pub fn parse_symbols(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    input
        .split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    FetchFailed(String),
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub table: PriceTable,
    pub skipped: Vec<SkippedSymbol>,
}

/// Fetches `[start, end)` for every symbol and aligns the results on one
/// date axis. Never fails as a whole: an all-empty batch is an empty table.
pub fn fetch_price_table(
    port: &dyn PriceDataPort,
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> FetchResult {
    let mut entries = Vec::new();
    let mut skipped = Vec::new();
    let mut seen = HashSet::new();

    for symbol in symbols {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() || !seen.insert(symbol.clone()) {
            continue;
        }

        let bars = match port.fetch_bars(&symbol, start, end) {
            Ok(bars) => bars,
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "skipping symbol, fetch failed");
                skipped.push(SkippedSymbol {
                    symbol,
                    reason: SkipReason::FetchFailed(e.to_string()),
                });
                continue;
            }
        };

        if bars.is_empty() {
            tracing::warn!(%symbol, %start, %end, "skipping symbol, no data");
            skipped.push(SkippedSymbol {
                symbol,
                reason: SkipReason::NoData,
            });
            continue;
        }

        tracing::debug!(%symbol, bars = bars.len(), "fetched");
        entries.push((symbol, PriceSeries::from_bars(&bars)));
    }

    FetchResult {
        table: PriceTable::from_series(entries),
        skipped,
    }
}
