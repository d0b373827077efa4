//! Price prediction models.
//!
//! A model is anything implementing [`PredictionModel`]: fit on a dated
//! price history, then project point estimates with a symmetric band for
//! requested future dates. [`ModelRegistry`] resolves models by name so the
//! simulation never names a concrete type.

pub mod linear;

pub use linear::LinearRegressionPredictor;

use crate::domain::error::StocksimError;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionPoint {
    pub date: NaiveDate,
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prediction {
    pub points: Vec<PredictionPoint>,
}

impl Prediction {
    pub fn estimates(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.estimate).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }
}

pub trait PredictionModel {
    fn name(&self) -> &str;

    /// Fits the model. `dates` and `prices` are parallel slices; non-finite
    /// prices are skipped.
    fn train(&mut self, dates: &[NaiveDate], prices: &[f64]) -> Result<(), StocksimError>;

    /// Projects `dates` with a band at `confidence` (e.g. 0.95).
    fn predict(&self, dates: &[NaiveDate], confidence: f64)
    -> Result<Prediction, StocksimError>;
}

type ModelFactory = fn() -> Box<dyn PredictionModel>;

/// Name -> constructor lookup for the available models.
pub struct ModelRegistry {
    models: Vec<(&'static str, ModelFactory)>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self { models: Vec::new() }
    }

    pub fn register(&mut self, name: &'static str, factory: ModelFactory) {
        self.models.retain(|(n, _)| *n != name);
        self.models.push((name, factory));
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.models.iter().map(|(n, _)| *n).collect()
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn PredictionModel>, StocksimError> {
        self.models
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, factory)| factory())
            .ok_or_else(|| StocksimError::UnknownModel {
                name: name.to_string(),
            })
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(linear::MODEL_NAME, || {
            Box::new(LinearRegressionPredictor::new())
        });
        registry
    }
}
