//! Single-instrument price series.
//!
//! A `PriceSeries` is an ordered run of (date, price) pairs with strictly
//! increasing dates. Prices may be NaN to mark gaps; math that assumes
//! contiguity works on [`PriceSeries::without_gaps`].

use crate::domain::error::StocksimError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }

    pub fn is_gap(&self) -> bool {
        !self.price.is_finite()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series, rejecting unordered or duplicate dates.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, StocksimError> {
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(StocksimError::UnorderedSeries {
                    previous: pair[0].date,
                    next: pair[1].date,
                });
            }
        }
        Ok(Self { points })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a series from provider bars, using the close as the price.
    /// Bars are sorted by date and later duplicates of a date are dropped.
    pub fn from_bars(bars: &[OhlcvBar]) -> Self {
        let mut points: Vec<PricePoint> = bars
            .iter()
            .map(|b| PricePoint::new(b.date, b.price()))
            .collect();
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Self { points }
    }

    pub fn from_pairs(dates: &[NaiveDate], prices: &[f64]) -> Result<Self, StocksimError> {
        if dates.len() != prices.len() {
            return Err(StocksimError::LengthMismatch {
                dates: dates.len(),
                prices: prices.len(),
            });
        }
        let points = dates
            .iter()
            .zip(prices)
            .map(|(&date, &price)| PricePoint::new(date, price))
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn price_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].price)
    }

    /// Copy of the series with NaN/infinite prices removed.
    pub fn without_gaps(&self) -> Self {
        Self {
            points: self.points.iter().copied().filter(|p| !p.is_gap()).collect(),
        }
    }

    /// Points with `from <= date <= to`.
    pub fn between(&self, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            points: self
                .points
                .iter()
                .copied()
                .filter(|p| p.date >= from && p.date <= to)
                .collect(),
        }
    }

    /// Appends `tail` after this series. Points of `tail` that do not come
    /// strictly after the last date here are dropped.
    pub fn spliced(&self, tail: &PriceSeries) -> Self {
        let mut points = self.points.clone();
        let cutoff = self.last().map(|p| p.date);
        points.extend(
            tail.points
                .iter()
                .copied()
                .filter(|p| cutoff.is_none_or(|c| p.date > c)),
        );
        Self { points }
    }
}
