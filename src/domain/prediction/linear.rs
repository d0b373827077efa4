//! Ordinary least squares on date ordinal vs. price.
//!
//! The single feature is the day count since 0001-01-01 (day 1). The band is
//! `estimate ± z * sigma`, where sigma is the population standard deviation
//! of the in-sample residuals and z comes from the requested confidence.
//! A perfectly linear history gives sigma = 0 and a zero-width band.

use crate::domain::error::StocksimError;
use crate::domain::prediction::{Prediction, PredictionModel, PredictionPoint};
use crate::domain::stats::{population_std_dev, z_for_confidence};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

pub const MODEL_NAME: &str = "Linear Regression";

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fit {
    slope: f64,
    // The line is stored around the training means for numerical stability
    // (ordinals are ~7e5).
    x_mean: f64,
    y_mean: f64,
}

impl Fit {
    fn at(&self, x: f64) -> f64 {
        self.y_mean + self.slope * (x - self.x_mean)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinearRegressionPredictor {
    fit: Option<Fit>,
    std_dev: f64,
}

pub fn date_ordinal(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

impl LinearRegressionPredictor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Residual standard deviation from the last `train` call.
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }
}

impl PredictionModel for LinearRegressionPredictor {
    fn name(&self) -> &str {
        MODEL_NAME
    }

    fn train(&mut self, dates: &[NaiveDate], prices: &[f64]) -> Result<(), StocksimError> {
        if dates.len() != prices.len() {
            return Err(StocksimError::LengthMismatch {
                dates: dates.len(),
                prices: prices.len(),
            });
        }
        let (xs, ys): (Vec<f64>, Vec<f64>) = dates
            .iter()
            .zip(prices)
            .filter(|(_, y)| y.is_finite())
            .map(|(&d, &y)| (date_ordinal(d), y))
            .unzip();
        let distinct = xs.iter().map(|x| *x as i64).collect::<BTreeSet<_>>().len();
        if distinct < 2 {
            return Err(StocksimError::InsufficientTrainingData { distinct });
        }

        let n = xs.len() as f64;
        let x_mean = xs.iter().sum::<f64>() / n;
        let y_mean = ys.iter().sum::<f64>() / n;

        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for (x, y) in xs.iter().zip(&ys) {
            sxy += (x - x_mean) * (y - y_mean);
            sxx += (x - x_mean) * (x - x_mean);
        }

        let fit = Fit {
            slope: sxy / sxx,
            x_mean,
            y_mean,
        };
        let residuals: Vec<f64> = xs
            .iter()
            .zip(&ys)
            .map(|(&x, &y)| y - fit.at(x))
            .collect();

        self.std_dev = population_std_dev(&residuals);
        self.fit = Some(fit);
        Ok(())
    }

    fn predict(
        &self,
        dates: &[NaiveDate],
        confidence: f64,
    ) -> Result<Prediction, StocksimError> {
        let fit = self.fit.ok_or_else(|| StocksimError::ModelNotTrained {
            model: MODEL_NAME.to_string(),
        })?;
        let half_width = z_for_confidence(confidence)? * self.std_dev;

        let points = dates
            .iter()
            .map(|&date| {
                let estimate = fit.at(date_ordinal(date));
                PredictionPoint {
                    date,
                    estimate,
                    lower: estimate - half_width,
                    upper: estimate + half_width,
                }
            })
            .collect();

        Ok(Prediction { points })
    }
}
