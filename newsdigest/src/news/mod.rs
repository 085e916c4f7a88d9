use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::markdown;

pub mod event_registry;
pub mod headlines;

pub const DEFAULT_TITLE: &str = "No Title";
pub const DEFAULT_BODY: &str = "No Description";
pub const DEFAULT_URL: &str = "#";
pub const DEFAULT_SOURCE_LANGUAGE: &str = "eng";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// A single news item, identified by its position in the fetched list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub body: String,
    pub url: String,
    pub language: String,
}

/// What the user asked for
#[derive(Debug, Clone)]
pub struct NewsQuery {
    pub keyword: String,
    pub days_back: u32,
    pub page_size: u32,
}

impl NewsQuery {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            days_back: 7,
            page_size: 10,
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// Timeout, DNS or connection failure
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// 2xx response whose payload does not have the expected shape
    #[error("could not decode news response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Network(format!("request timed out: {}", e))
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// A news search API
#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &'static str;

    async fn fetch(&self, query: &NewsQuery) -> Result<Vec<Article>, FetchError>;
}

/// One article record as it appears on the wire.
///
/// Every field is optional and non-string values are treated as absent, so a
/// record can only fail to decode when it is not a JSON object at all.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawArticle {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lang: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

impl RawArticle {
    /// Decode a single record with explicit per-field defaults.
    pub(crate) fn decode(value: serde_json::Value) -> Result<Self, FetchError> {
        serde_json::from_value(value).map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// Build an Article. `fallback_language` tags records from APIs that do
    /// not report a language per record.
    pub(crate) fn into_article(self, fallback_language: Option<&str>) -> Article {
        let body = self
            .body
            .or(self.content)
            .or(self.description)
            .unwrap_or_else(|| DEFAULT_BODY.to_string());
        Article {
            title: self.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            body,
            url: self.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
            language: self
                .lang
                .or_else(|| fallback_language.map(str::to_string))
                .unwrap_or_default(),
        }
    }
}

/// Turn wire records into display-ready articles: decode each record, keep
/// only the expected source language, strip markdown from title and body.
pub(crate) fn normalize_records(
    records: Vec<serde_json::Value>,
    source_language: &str,
    fallback_language: Option<&str>,
) -> Vec<Article> {
    let total = records.len();
    let articles: Vec<Article> = records
        .into_iter()
        .enumerate()
        .filter_map(|(i, record)| match RawArticle::decode(record) {
            Ok(raw) => Some(raw.into_article(fallback_language)),
            Err(e) => {
                warn!(index = i, error = %e, "skipping malformed article record");
                None
            }
        })
        .filter(|a| a.language == source_language)
        .map(|a| Article {
            title: markdown::strip(&a.title),
            body: markdown::strip(&a.body),
            ..a
        })
        .collect();

    debug!(total, kept = articles.len(), source_language, "normalized article records");
    articles
}

/// Read the response, mapping status and body failures onto FetchError.
pub(crate) async fn read_success_body(response: reqwest::Response) -> Result<String, FetchError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::Http {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.text().await?)
}
