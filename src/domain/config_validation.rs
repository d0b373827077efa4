//! Simulation configuration loading and validation.
//!
//! Every field is checked before any data is fetched or any model trained.

use crate::domain::error::StocksimError;
use crate::domain::prediction::ModelRegistry;
use crate::domain::prediction::linear::MODEL_NAME;
use crate::domain::simulation::SimulationRequest;
use crate::domain::wallet::{ContributionFrequency, SkippedCapitalPolicy, Wallet};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DEFAULT_CACHE_TTL_SECS: i64 = 86_400;
pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// A fully validated `[data]` / `[simulation]` / `[wallet]` configuration.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub data_path: String,
    pub news_path: Option<String>,
    pub cache_ttl_secs: u64,
    pub ticker: String,
    pub model: String,
    pub request: SimulationRequest,
    pub wallet: Wallet,
}

/// `[data] news_path`, required by the news listing when no directory is given.
pub fn configured_news_path(config: &dyn ConfigPort) -> Result<String, StocksimError> {
    required_string(config, "data", "news_path")
}

pub fn load_simulation_config(
    config: &dyn ConfigPort,
    registry: &ModelRegistry,
) -> Result<SimulationConfig, StocksimError> {
    let data_path = required_string(config, "data", "path")?;
    let news_path = optional_string(config, "data", "news_path");
    let cache_ttl_secs = validate_cache_ttl(config)?;

    let ticker = required_string(config, "simulation", "ticker")?.to_uppercase();
    let request = validate_dates(config)?;
    let model = validate_model(config, registry)?;

    let wallet = validate_wallet(config)?;

    Ok(SimulationConfig {
        data_path,
        news_path,
        cache_ttl_secs,
        ticker,
        model,
        request,
        wallet,
    })
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> StocksimError {
    StocksimError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn optional_string(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn required_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, StocksimError> {
    optional_string(config, section, key).ok_or_else(|| StocksimError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    })
}

fn validate_cache_ttl(config: &dyn ConfigPort) -> Result<u64, StocksimError> {
    let value = config.get_int("data", "cache_ttl_secs", DEFAULT_CACHE_TTL_SECS);
    u64::try_from(value)
        .map_err(|_| invalid("data", "cache_ttl_secs", "cache_ttl_secs must be non-negative"))
}

fn parse_date(section: &str, key: &str, value: &str) -> Result<NaiveDate, StocksimError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| invalid(section, key, format!("invalid {} format, expected YYYY-MM-DD", key)))
}

fn validate_dates(config: &dyn ConfigPort) -> Result<SimulationRequest, StocksimError> {
    let start = parse_date(
        "simulation",
        "start_date",
        &required_string(config, "simulation", "start_date")?,
    )?;
    let cutoff = parse_date(
        "simulation",
        "end_date",
        &required_string(config, "simulation", "end_date")?,
    )?;
    if start >= cutoff {
        return Err(invalid(
            "simulation",
            "start_date",
            "start_date must be before end_date",
        ));
    }

    let horizon = match optional_string(config, "simulation", "horizon_date") {
        Some(s) => parse_date("simulation", "horizon_date", &s)?,
        None => SimulationRequest::default_horizon(cutoff),
    };
    if horizon <= cutoff {
        return Err(invalid(
            "simulation",
            "horizon_date",
            "horizon_date must be after end_date",
        ));
    }

    let confidence = config.get_double("simulation", "confidence", DEFAULT_CONFIDENCE);
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(invalid(
            "simulation",
            "confidence",
            "confidence must be between 0 and 1 (exclusive)",
        ));
    }

    Ok(SimulationRequest {
        start,
        cutoff,
        horizon,
        confidence,
    })
}

fn validate_model(config: &dyn ConfigPort, registry: &ModelRegistry) -> Result<String, StocksimError> {
    let name = optional_string(config, "simulation", "model").unwrap_or_else(|| MODEL_NAME.to_string());
    if !registry.names().contains(&name.as_str()) {
        return Err(invalid(
            "simulation",
            "model",
            format!("unknown model '{}' (available: {})", name, registry.names().join(", ")),
        ));
    }
    Ok(name)
}

fn validate_wallet(config: &dyn ConfigPort) -> Result<Wallet, StocksimError> {
    let initial_capital = config.get_double("wallet", "initial_capital", DEFAULT_INITIAL_CAPITAL);
    if initial_capital <= 0.0 || !initial_capital.is_finite() {
        return Err(invalid(
            "wallet",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }

    let contribution = config.get_double("wallet", "contribution_amount", 0.0);
    if contribution < 0.0 || !contribution.is_finite() {
        return Err(invalid(
            "wallet",
            "contribution_amount",
            "contribution_amount must be non-negative",
        ));
    }

    let frequency: ContributionFrequency = optional_string(config, "wallet", "contribution_frequency")
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or_default();
    let policy: SkippedCapitalPolicy = optional_string(config, "wallet", "skipped_capital")
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or_default();

    Ok(Wallet::new(initial_capital, contribution, frequency)?.with_policy(policy))
}
