use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

use super::{
    normalize_records, read_success_body, Article, FetchError, NewsQuery, NewsSource,
    DEFAULT_SOURCE_LANGUAGE, DEFAULT_TIMEOUT_SECS,
};

pub const DEFAULT_EVENT_REGISTRY_URL: &str = "https://eventregistry.org/api/v1/article/getArticles";

/// Structured search against an Event Registry style endpoint (JSON POST).
///
/// Records carry their own `lang` tag, so filtering happens on what the API
/// reports rather than on what was requested.
pub struct EventRegistryClient {
    base_url: String,
    api_key: String,
    source_language: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    articles: ArticlePage,
}

#[derive(Debug, Deserialize)]
struct ArticlePage {
    results: Vec<Value>,
    #[serde(default, rename = "totalResults")]
    total_results: Option<u64>,
}

impl EventRegistryClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, api_key, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("NewsDigest/0.1.0")
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            source_language: DEFAULT_SOURCE_LANGUAGE.to_string(),
            client,
        })
    }

    pub fn with_source_language(mut self, language: impl Into<String>) -> Self {
        self.source_language = language.into();
        self
    }

    /// Build the request body: keyword AND language AND a lookback window,
    /// newest first. A window reaching past the earliest representable date
    /// starts at that date.
    fn request_body(&self, query: &NewsQuery, today: NaiveDate) -> Value {
        let date_start = today
            .checked_sub_signed(ChronoDuration::days(i64::from(query.days_back)))
            .unwrap_or(NaiveDate::MIN);
        json!({
            "query": {
                "$query": {
                    "$and": [
                        { "keyword": query.keyword, "keywordLoc": "body,title" },
                        { "lang": self.source_language },
                        { "dateStart": date_start.format("%Y-%m-%d").to_string() }
                    ]
                }
            },
            "resultType": "articles",
            "articlesSortBy": "date",
            "articlesCount": query.page_size,
            "articleBodyLen": -1,
            "apiKey": self.api_key,
        })
    }
}

#[async_trait::async_trait]
impl NewsSource for EventRegistryClient {
    fn name(&self) -> &'static str {
        "event_registry"
    }

    async fn fetch(&self, query: &NewsQuery) -> Result<Vec<Article>, FetchError> {
        let body = self.request_body(query, Utc::now().date_naive());
        let response = self.client.post(&self.base_url).json(&body).send().await?;
        let text = read_success_body(response).await?;

        let envelope: SearchEnvelope =
            serde_json::from_str(&text).map_err(|e| FetchError::Decode(e.to_string()))?;
        info!(
            keyword = %query.keyword,
            days_back = query.days_back,
            total = envelope.articles.total_results.unwrap_or(0),
            received = envelope.articles.results.len(),
            "event registry articles fetched"
        );

        Ok(normalize_records(envelope.articles.results, &self.source_language, None))
    }
}
