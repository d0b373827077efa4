//! Domain error types.
//!
//! Validation errors (bad periods, horizons, model sequencing, config) are kept
//! apart from data-access errors so callers can tell "misconfigured" from
//! "the provider failed". Absence of data is not an error in the core: it is
//! an empty result.

/// Top-level error type for stocksim.
#[derive(Debug, thiserror::Error)]
pub enum StocksimError {
    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid indicator period {period}: must be at least 1")]
    InvalidPeriod { period: usize },

    #[error("horizon {horizon} must be after cutoff {cutoff}")]
    InvalidHorizon {
        cutoff: chrono::NaiveDate,
        horizon: chrono::NaiveDate,
    },

    #[error("confidence level {confidence} must be strictly between 0 and 1")]
    InvalidConfidence { confidence: f64 },

    #[error("training needs at least 2 distinct dates, got {distinct}")]
    InsufficientTrainingData { distinct: usize },

    #[error("length mismatch: {dates} dates but {prices} prices")]
    LengthMismatch { dates: usize, prices: usize },

    #[error("model {model} must be trained before predicting")]
    ModelNotTrained { model: String },

    #[error("{field} must be a finite, non-negative amount, got {amount}")]
    InvalidAmount { field: &'static str, amount: f64 },

    #[error("unknown model: {name}")]
    UnknownModel { name: String },

    #[error("series dates must be strictly increasing ({previous} then {next})")]
    UnorderedSeries {
        previous: chrono::NaiveDate,
        next: chrono::NaiveDate,
    },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StocksimError {
    /// True for programming/configuration errors that are rejected before any
    /// computation runs.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StocksimError::InvalidPeriod { .. }
                | StocksimError::InvalidHorizon { .. }
                | StocksimError::InvalidConfidence { .. }
                | StocksimError::InsufficientTrainingData { .. }
                | StocksimError::LengthMismatch { .. }
                | StocksimError::ModelNotTrained { .. }
                | StocksimError::UnknownModel { .. }
                | StocksimError::InvalidAmount { .. }
                | StocksimError::UnorderedSeries { .. }
        )
    }
}

impl From<&StocksimError> for std::process::ExitCode {
    fn from(err: &StocksimError) -> Self {
        let code: u8 = match err {
            StocksimError::Io(_) => 1,
            StocksimError::ConfigParse { .. }
            | StocksimError::ConfigMissing { .. }
            | StocksimError::ConfigInvalid { .. } => 2,
            StocksimError::DataSource { .. } => 3,
            StocksimError::InvalidPeriod { .. }
            | StocksimError::InvalidHorizon { .. }
            | StocksimError::InvalidConfidence { .. }
            | StocksimError::InsufficientTrainingData { .. }
            | StocksimError::LengthMismatch { .. }
            | StocksimError::ModelNotTrained { .. }
            | StocksimError::UnknownModel { .. }
            | StocksimError::InvalidAmount { .. }
            | StocksimError::UnorderedSeries { .. } => 4,
            StocksimError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
