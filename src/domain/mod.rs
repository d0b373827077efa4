//! Core domain types and logic.

pub mod ohlcv;
pub mod price;
pub mod price_table;
pub mod indicator;
pub mod indicator_helpers;
pub mod stats;
pub mod prediction;
pub mod wallet;
pub mod simulation;
pub mod metrics;
pub mod universe;
pub mod news;
pub mod config_validation;
pub mod error;
