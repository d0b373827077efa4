//! Headline news port.

use crate::domain::error::StocksimError;
use crate::domain::news::NewsItem;

pub trait NewsPort {
    /// Latest news for `symbol`; no news is an empty list.
    fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsItem>, StocksimError>;
}
