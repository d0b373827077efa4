//! Simulation orchestrator: train, project, and compare wallet outcomes.
//!
//! Pipeline for one ticker:
//! 1. split the price series at the cutoff (train: `start..=cutoff`,
//!    test: `(cutoff, horizon]`, empty when the horizon is in the future)
//! 2. train the model on the training prefix
//! 3. predict every business day from cutoff + 1 to the horizon
//! 4. replay the wallet over train + actual test prices and over
//!    train + predicted prices
//! 5. compare both scenarios at the latest date they share

use crate::domain::error::StocksimError;
use crate::domain::prediction::{Prediction, PredictionModel};
use crate::domain::price::{PricePoint, PriceSeries};
use crate::domain::wallet::{ScenarioSummary, Wallet, WalletPoint};
use crate::ports::data_port::PriceDataPort;
use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    pub start: NaiveDate,
    /// Training cutoff (inclusive).
    pub cutoff: NaiveDate,
    /// Last projected date (inclusive), strictly after `cutoff`.
    pub horizon: NaiveDate,
    pub confidence: f64,
}

impl SimulationRequest {
    /// Default horizon: three calendar months after the cutoff.
    pub fn default_horizon(cutoff: NaiveDate) -> NaiveDate {
        cutoff
            .checked_add_months(Months::new(3))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn validate(&self) -> Result<(), StocksimError> {
        if self.horizon <= self.cutoff {
            return Err(StocksimError::InvalidHorizon {
                cutoff: self.cutoff,
                horizon: self.horizon,
            });
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(StocksimError::InvalidConfidence {
                confidence: self.confidence,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub train: PriceSeries,
    pub test: PriceSeries,
}

impl TrainTestSplit {
    /// Gaps are dropped from both halves.
    pub fn new(
        series: &PriceSeries,
        start: NaiveDate,
        cutoff: NaiveDate,
        horizon: NaiveDate,
    ) -> Self {
        let clean = series.without_gaps();
        let train = clean.between(start, cutoff);
        let test = match cutoff.succ_opt() {
            Some(next) => clean.between(next, horizon),
            None => PriceSeries::empty(),
        };
        Self { train, test }
    }
}

/// Monday-to-Friday dates in `from..=to`.
pub fn business_days(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days()
        .take_while(|d| *d <= to)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Latest date present in both scenarios.
    pub anchor: NaiveDate,
    pub actual: ScenarioSummary,
    pub predicted: ScenarioSummary,
}

#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub model: String,
    pub split: TrainTestSplit,
    pub prediction: Prediction,
    pub actual_wallet: Vec<WalletPoint>,
    pub predicted_wallet: Vec<WalletPoint>,
    pub comparison: Option<Comparison>,
}

impl SimulationOutcome {
    /// Predicted scenario at the horizon end.
    pub fn predicted_final(&self) -> Option<ScenarioSummary> {
        ScenarioSummary::last(&self.predicted_wallet)
    }

    /// Actual scenario at the last realized date.
    pub fn actual_final(&self) -> Option<ScenarioSummary> {
        ScenarioSummary::last(&self.actual_wallet)
    }
}

fn prediction_series(prediction: &Prediction) -> Result<PriceSeries, StocksimError> {
    PriceSeries::new(
        prediction
            .points
            .iter()
            .map(|p| PricePoint::new(p.date, p.estimate))
            .collect(),
    )
}

fn compare(actual: &[WalletPoint], predicted: &[WalletPoint]) -> Option<Comparison> {
    let predicted_dates: HashSet<NaiveDate> = predicted.iter().map(|p| p.date).collect();
    let anchor = actual
        .iter()
        .rev()
        .map(|p| p.date)
        .find(|d| predicted_dates.contains(d))?;
    Some(Comparison {
        anchor,
        actual: ScenarioSummary::at(actual, anchor)?,
        predicted: ScenarioSummary::at(predicted, anchor)?,
    })
}

/// Runs the full pipeline over an already-fetched series.
pub fn run_simulation(
    series: &PriceSeries,
    request: &SimulationRequest,
    model: &mut dyn PredictionModel,
    wallet: &Wallet,
) -> Result<SimulationOutcome, StocksimError> {
    request.validate()?;

    let split = TrainTestSplit::new(series, request.start, request.cutoff, request.horizon);
    model.train(&split.train.dates(), &split.train.prices())?;

    let future = match request.cutoff.checked_add_days(Days::new(1)) {
        Some(first) => business_days(first, request.horizon),
        None => Vec::new(),
    };
    let prediction = model.predict(&future, request.confidence)?;

    let actual_path = split.train.spliced(&split.test);
    let predicted_path = split.train.spliced(&prediction_series(&prediction)?);

    let actual_wallet = wallet.simulate_portfolio(&actual_path);
    let predicted_wallet = wallet.simulate_portfolio(&predicted_path);
    let comparison = compare(&actual_wallet, &predicted_wallet);

    tracing::debug!(
        model = model.name(),
        train = split.train.len(),
        test = split.test.len(),
        projected = prediction.points.len(),
        "simulation complete"
    );

    Ok(SimulationOutcome {
        model: model.name().to_string(),
        split,
        prediction,
        actual_wallet,
        predicted_wallet,
        comparison,
    })
}

/// Fetches `symbol` from `start` through the horizon and runs the pipeline.
///
/// `Ok(None)` when the source has no bars for the range.
pub fn simulate_symbol(
    port: &dyn PriceDataPort,
    symbol: &str,
    request: &SimulationRequest,
    model: &mut dyn PredictionModel,
    wallet: &Wallet,
) -> Result<Option<SimulationOutcome>, StocksimError> {
    request.validate()?;

    let end = request.horizon.succ_opt().unwrap_or(request.horizon);
    let bars = port.fetch_bars(symbol, request.start, end)?;
    if bars.is_empty() {
        tracing::warn!(%symbol, start = %request.start, %end, "no data for simulation");
        return Ok(None);
    }

    let series = PriceSeries::from_bars(&bars);
    run_simulation(&series, request, model, wallet).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prediction::LinearRegressionPredictor;
    use crate::domain::wallet::ContributionFrequency;
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn daily_linear(start: NaiveDate, n: i64) -> PriceSeries {
        let dates: Vec<NaiveDate> = (0..n).map(|i| start + Duration::days(i)).collect();
        let prices: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        PriceSeries::from_pairs(&dates, &prices).unwrap()
    }

    fn request(start: NaiveDate, cutoff: NaiveDate, horizon: NaiveDate) -> SimulationRequest {
        SimulationRequest {
            start,
            cutoff,
            horizon,
            confidence: 0.95,
        }
    }

    #[test]
    fn business_days_skip_weekends() {
        // 2024-01-05 is a Friday
        let days = business_days(d(2024, 1, 5), d(2024, 1, 9));
        assert_eq!(days, vec![d(2024, 1, 5), d(2024, 1, 8), d(2024, 1, 9)]);
        assert!(business_days(d(2024, 1, 9), d(2024, 1, 5)).is_empty());
    }

    #[test]
    fn default_horizon_is_three_months() {
        assert_eq!(
            SimulationRequest::default_horizon(d(2024, 11, 30)),
            d(2025, 2, 28)
        );
    }

    #[test]
    fn horizon_must_follow_cutoff() {
        let req = request(d(2024, 1, 1), d(2024, 6, 1), d(2024, 6, 1));
        assert!(matches!(
            req.validate(),
            Err(StocksimError::InvalidHorizon { .. })
        ));
    }

    #[test]
    fn split_partitions_at_cutoff() {
        let series = daily_linear(d(2024, 1, 1), 60);
        let split = TrainTestSplit::new(&series, d(2024, 1, 1), d(2024, 1, 31), d(2024, 2, 10));
        assert_eq!(split.train.len(), 31);
        assert_eq!(split.train.last().unwrap().date, d(2024, 1, 31));
        assert_eq!(split.test.first().unwrap().date, d(2024, 2, 1));
        assert_eq!(split.test.last().unwrap().date, d(2024, 2, 10));
    }

    #[test]
    fn split_with_future_horizon_has_empty_test() {
        let series = daily_linear(d(2024, 1, 1), 31);
        let split = TrainTestSplit::new(&series, d(2024, 1, 1), d(2024, 1, 31), d(2024, 4, 30));
        assert!(split.test.is_empty());
    }

    #[test]
    fn predictions_cover_full_horizon_without_actuals() {
        let series = daily_linear(d(2024, 1, 1), 31);
        let req = request(d(2024, 1, 1), d(2024, 1, 31), d(2024, 3, 29));
        let mut model = LinearRegressionPredictor::new();
        let wallet = Wallet::new(1000.0, 0.0, ContributionFrequency::None).unwrap();

        let out = run_simulation(&series, &req, &mut model, &wallet).unwrap();

        let dates = out.prediction.dates();
        assert_eq!(dates.first(), Some(&d(2024, 2, 1)));
        assert_eq!(dates.last(), Some(&d(2024, 3, 29)));
        assert_eq!(dates, business_days(d(2024, 2, 1), d(2024, 3, 29)));

        // actual scenario stops at the cutoff; comparison anchors there
        let cmp = out.comparison.as_ref().unwrap();
        assert_eq!(cmp.anchor, d(2024, 1, 31));
        assert_relative_eq!(cmp.actual.value, cmp.predicted.value);
        assert_eq!(
            out.predicted_final().unwrap().date,
            d(2024, 3, 29)
        );
        assert_eq!(out.actual_final().unwrap().date, d(2024, 1, 31));
    }

    #[test]
    fn perfect_model_matches_actual_scenario() {
        // price rises one per calendar day; model recovers it exactly
        let series = daily_linear(d(2024, 1, 1), 91);
        let req = request(d(2024, 1, 1), d(2024, 1, 31), d(2024, 3, 31));
        let mut model = LinearRegressionPredictor::new();
        let wallet = Wallet::new(1000.0, 100.0, ContributionFrequency::Monthly).unwrap();

        let out = run_simulation(&series, &req, &mut model, &wallet).unwrap();
        let cmp = out.comparison.unwrap();

        // 2024-03-31 is a Sunday: last shared date is Friday 03-29
        assert_eq!(cmp.anchor, d(2024, 3, 29));
        assert_relative_eq!(cmp.actual.invested, cmp.predicted.invested);
        assert_relative_eq!(cmp.actual.value, cmp.predicted.value, epsilon = 1e-6);
        assert_relative_eq!(cmp.actual.invested, 1200.0);
    }

    #[test]
    fn empty_training_prefix_is_rejected() {
        let series = daily_linear(d(2024, 2, 1), 10);
        let req = request(d(2024, 1, 1), d(2024, 1, 15), d(2024, 3, 1));
        let mut model = LinearRegressionPredictor::new();
        let wallet = Wallet::new(1000.0, 0.0, ContributionFrequency::None).unwrap();

        let err = run_simulation(&series, &req, &mut model, &wallet).unwrap_err();
        assert!(matches!(
            err,
            StocksimError::InsufficientTrainingData { distinct: 0 }
        ));
    }

    #[test]
    fn training_respects_start() {
        let series = daily_linear(d(2024, 1, 1), 40);
        let split = TrainTestSplit::new(&series, d(2024, 1, 10), d(2024, 1, 20), d(2024, 1, 25));
        assert_eq!(split.train.first().unwrap().date, d(2024, 1, 10));
        assert_eq!(split.train.len(), 11);
    }
}
