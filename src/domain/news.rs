//! News headline records.
//!
//! Providers return articles shaped as
//! `{"content": {"title": .., "canonicalUrl": {"url": ..}}, "publisher": ..}`
//! with any field possibly missing. Missing fields become fixed placeholder
//! strings, never empty or null.

use crate::domain::error::StocksimError;
use serde::Deserialize;

pub const NO_TITLE: &str = "N/A - No Title Found";
pub const NO_LINK: &str = "N/A - No Link Found";
pub const NO_PUBLISHER: &str = "N/A - No Publisher";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub headline: String,
    pub link: String,
    pub publisher: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawArticle {
    #[serde(default)]
    content: Option<RawContent>,
    #[serde(default)]
    publisher: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawContent {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "canonicalUrl")]
    canonical_url: Option<RawUrl>,
}

#[derive(Debug, Default, Deserialize)]
struct RawUrl {
    #[serde(default)]
    url: Option<String>,
}

impl From<RawArticle> for NewsItem {
    fn from(raw: RawArticle) -> Self {
        let content = raw.content.unwrap_or_default();
        NewsItem {
            headline: content.title.unwrap_or_else(|| NO_TITLE.to_string()),
            link: content
                .canonical_url
                .and_then(|u| u.url)
                .unwrap_or_else(|| NO_LINK.to_string()),
            publisher: raw.publisher.unwrap_or_else(|| NO_PUBLISHER.to_string()),
        }
    }
}

/// Parses a provider article list. `null` or `[]` is an empty list.
pub fn parse_news(json: &str) -> Result<Vec<NewsItem>, StocksimError> {
    let raw: Option<Vec<RawArticle>> =
        serde_json::from_str(json).map_err(|e| StocksimError::DataSource {
            reason: format!("invalid news JSON: {}", e),
        })?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(NewsItem::from)
        .collect())
}
