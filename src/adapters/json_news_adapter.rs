//! News adapter over a directory of `<SYMBOL>.json` article lists.

use crate::domain::error::StocksimError;
use crate::domain::news::{NewsItem, parse_news};
use crate::ports::news_port::NewsPort;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct JsonNewsAdapter {
    base_path: PathBuf,
}

impl JsonNewsAdapter {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl NewsPort for JsonNewsAdapter {
    fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsItem>, StocksimError> {
        let path = self.base_path.join(format!("{}.json", symbol));
        match fs::read_to_string(&path) {
            Ok(content) => parse_news(&content).map_err(|e| StocksimError::DataSource {
                reason: format!("{}: {}", path.display(), e),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StocksimError::DataSource {
                reason: format!("failed to read {}: {}", path.display(), e),
            }),
        }
    }
}
