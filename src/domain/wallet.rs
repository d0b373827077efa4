//! Periodic-contribution wallet replay.
//!
//! The wallet buys shares with its initial capital on the first date of a
//! price series, then adds one contribution each time the date reaches the
//! next scheduled contribution date. The schedule advances by one calendar
//! period per contribution; periods skipped by data gaps are not backfilled.
//! The series can be realized or spliced with predictions; the wallet does
//! not care.

use crate::domain::error::StocksimError;
use crate::domain::price::PriceSeries;
use chrono::{Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContributionFrequency {
    #[default]
    None,
    Monthly,
    Quarterly,
    Annually,
}

impl ContributionFrequency {
    /// Next contribution date after `date`, or `None` when there is no
    /// schedule (or the calendar overflows).
    pub fn next_after(self, date: NaiveDate) -> Option<NaiveDate> {
        let months = match self {
            ContributionFrequency::None => return None,
            ContributionFrequency::Monthly => 1,
            ContributionFrequency::Quarterly => 3,
            ContributionFrequency::Annually => 12,
        };
        date.checked_add_months(Months::new(months))
    }
}

impl FromStr for ContributionFrequency {
    type Err = StocksimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(ContributionFrequency::None),
            "monthly" => Ok(ContributionFrequency::Monthly),
            "quarterly" => Ok(ContributionFrequency::Quarterly),
            "annually" | "yearly" => Ok(ContributionFrequency::Annually),
            other => Err(StocksimError::ConfigInvalid {
                section: "wallet".into(),
                key: "contribution_frequency".into(),
                reason: format!("unknown frequency '{}'", other),
            }),
        }
    }
}

impl fmt::Display for ContributionFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContributionFrequency::None => "None",
            ContributionFrequency::Monthly => "Monthly",
            ContributionFrequency::Quarterly => "Quarterly",
            ContributionFrequency::Annually => "Annually",
        };
        f.write_str(name)
    }
}

/// What happens to capital scheduled on a date whose price is not positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkippedCapitalPolicy {
    /// Never invested and never counted.
    #[default]
    Lost,
    /// Carried forward and invested at the next positive price.
    Deferred,
}

impl FromStr for SkippedCapitalPolicy {
    type Err = StocksimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lost" => Ok(SkippedCapitalPolicy::Lost),
            "deferred" => Ok(SkippedCapitalPolicy::Deferred),
            other => Err(StocksimError::ConfigInvalid {
                section: "wallet".into(),
                key: "skipped_capital".into(),
                reason: format!("unknown policy '{}' (expected lost or deferred)", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalletPoint {
    pub date: NaiveDate,
    pub shares: f64,
    pub invested: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wallet {
    initial_capital: f64,
    contribution_amount: f64,
    frequency: ContributionFrequency,
    skipped_capital: SkippedCapitalPolicy,
}

/// Running account while replaying a series.
struct Account {
    shares: f64,
    invested: f64,
    pending: f64,
    policy: SkippedCapitalPolicy,
}

impl Account {
    fn commit(&mut self, amount: f64, price: f64, date: NaiveDate) {
        if price > 0.0 {
            self.shares += amount / price;
            self.invested += amount;
            return;
        }
        match self.policy {
            SkippedCapitalPolicy::Lost => {
                tracing::warn!(%date, price, amount, "non-positive price, capital not invested");
            }
            SkippedCapitalPolicy::Deferred => {
                tracing::warn!(%date, price, amount, "non-positive price, deferring capital");
                self.pending += amount;
            }
        }
    }

    fn flush_pending(&mut self, price: f64) {
        if self.pending > 0.0 && price > 0.0 {
            self.shares += self.pending / price;
            self.invested += self.pending;
            self.pending = 0.0;
        }
    }
}

fn check_amount(field: &'static str, amount: f64) -> Result<(), StocksimError> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(StocksimError::InvalidAmount { field, amount })
    }
}

impl Wallet {
    /// Both amounts must be finite and non-negative.
    pub fn new(
        initial_capital: f64,
        contribution_amount: f64,
        frequency: ContributionFrequency,
    ) -> Result<Self, StocksimError> {
        check_amount("initial_capital", initial_capital)?;
        check_amount("contribution_amount", contribution_amount)?;
        Ok(Self {
            initial_capital,
            contribution_amount,
            frequency,
            skipped_capital: SkippedCapitalPolicy::default(),
        })
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn contribution_amount(&self) -> f64 {
        self.contribution_amount
    }

    pub fn frequency(&self) -> ContributionFrequency {
        self.frequency
    }

    pub fn skipped_capital(&self) -> SkippedCapitalPolicy {
        self.skipped_capital
    }

    pub fn with_policy(mut self, policy: SkippedCapitalPolicy) -> Self {
        self.skipped_capital = policy;
        self
    }

    /// Replays the wallet over `series` (gaps dropped), one point per date.
    pub fn simulate_portfolio(&self, series: &PriceSeries) -> Vec<WalletPoint> {
        let series = series.without_gaps();
        let Some(first) = series.first() else {
            return Vec::new();
        };

        let mut account = Account {
            shares: 0.0,
            invested: 0.0,
            pending: 0.0,
            policy: self.skipped_capital,
        };
        account.commit(self.initial_capital, first.price, first.date);

        let mut next_contribution = self.frequency.next_after(first.date);
        let mut out = Vec::with_capacity(series.len());

        for point in series.points() {
            account.flush_pending(point.price);

            if let Some(due) = next_contribution.filter(|&due| point.date >= due) {
                account.commit(self.contribution_amount, point.price, point.date);
                next_contribution = self.frequency.next_after(due);
            }

            out.push(WalletPoint {
                date: point.date,
                shares: account.shares,
                invested: account.invested,
                value: account.shares * point.price,
            });
        }

        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioSummary {
    pub date: NaiveDate,
    pub value: f64,
    pub invested: f64,
    pub profit: f64,
    /// Percent; zero when nothing was invested.
    pub roi_pct: f64,
}

impl ScenarioSummary {
    pub fn from_point(point: &WalletPoint) -> Self {
        let profit = point.value - point.invested;
        let roi_pct = if point.invested > 0.0 {
            profit / point.invested * 100.0
        } else {
            0.0
        };
        Self {
            date: point.date,
            value: point.value,
            invested: point.invested,
            profit,
            roi_pct,
        }
    }

    /// Summary at `date`, if the wallet has a point there.
    pub fn at(points: &[WalletPoint], date: NaiveDate) -> Option<Self> {
        points
            .iter()
            .find(|p| p.date == date)
            .map(Self::from_point)
    }

    pub fn last(points: &[WalletPoint]) -> Option<Self> {
        points.last().map(Self::from_point)
    }
}
