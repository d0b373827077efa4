//! CSV file market data adapter.
//!
//! One file per symbol, `<dir>/<SYMBOL>.csv`, with header
//! `date,open,high,low,close[,volume]`.

use crate::domain::error::StocksimError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::PriceDataPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn parse_field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    path: &Path,
) -> Result<T, StocksimError>
where
    T::Err: std::fmt::Display,
{
    let raw = record.get(index).ok_or_else(|| StocksimError::DataSource {
        reason: format!("{}: missing {} column", path.display(), name),
    })?;
    raw.trim().parse().map_err(|e| StocksimError::DataSource {
        reason: format!("{}: invalid {} value '{}': {}", path.display(), name, raw, e),
    })
}

impl PriceDataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, StocksimError> {
        let path = self.csv_path(symbol);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(%symbol, path = %path.display(), "no data file");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(StocksimError::DataSource {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| StocksimError::DataSource {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?;

            let date_str = record.get(0).ok_or_else(|| StocksimError::DataSource {
                reason: format!("{}: missing date column", path.display()),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                StocksimError::DataSource {
                    reason: format!("{}: invalid date '{}': {}", path.display(), date_str, e),
                }
            })?;

            if date < start || date >= end {
                continue;
            }

            let volume = match record.get(5).map(str::trim) {
                None | Some("") => None,
                Some(_) => Some(parse_field::<i64>(&record, 5, "volume", &path)?),
            };

            bars.push(OhlcvBar {
                symbol: symbol.to_string(),
                date,
                open: parse_field(&record, 1, "open", &path)?,
                high: parse_field(&record, 2, "high", &path)?,
                low: parse_field(&record, 3, "low", &path)?,
                close: parse_field(&record, 4, "close", &path)?,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, StocksimError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| StocksimError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StocksimError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            if let Some(symbol) = name.to_string_lossy().strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
