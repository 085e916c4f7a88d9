use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use super::{
    normalize_records, read_success_body, Article, FetchError, NewsQuery, NewsSource,
    DEFAULT_SOURCE_LANGUAGE, DEFAULT_TIMEOUT_SECS,
};

pub const DEFAULT_HEADLINES_URL: &str = "https://newsapi.org/v2/top-headlines";

/// Three-letter source tags and the two-letter codes the endpoint expects
const REQUEST_LANGUAGES: &[(&str, &str)] = &[
    ("ara", "ar"),
    ("deu", "de"),
    ("eng", "en"),
    ("spa", "es"),
    ("fra", "fr"),
    ("heb", "he"),
    ("ita", "it"),
    ("nld", "nl"),
    ("nor", "no"),
    ("por", "pt"),
    ("rus", "ru"),
    ("swe", "sv"),
    ("zho", "zh"),
];

/// Two-letter request code for a source language tag. Two-letter tags pass
/// through unchanged.
fn request_language(source_language: &str) -> Option<&str> {
    if source_language.len() == 2 {
        return Some(source_language);
    }
    REQUEST_LANGUAGES
        .iter()
        .find(|(tag, _)| *tag == source_language)
        .map(|(_, code)| *code)
}

/// Keyword search against a top-headlines endpoint (GET with query string).
///
/// The endpoint does not tag records with a language; the request asks for
/// results in the source language and every record is tagged with it.
pub struct HeadlinesClient {
    base_url: String,
    api_key: String,
    source_language: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct HeadlinesEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default, rename = "totalResults")]
    total_results: Option<u64>,
    articles: Vec<serde_json::Value>,
}

impl HeadlinesClient {
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

    fn request_url(&self, query: &NewsQuery) -> Result<Url, FetchError> {
        let page_size = query.page_size.to_string();
        let mut params = vec![
            ("q", query.keyword.as_str()),
            ("pageSize", page_size.as_str()),
        ];
        match request_language(&self.source_language) {
            Some(code) => params.push(("language", code)),
            None => warn!(
                source_language = %self.source_language,
                "no request code for source language; searching all languages"
            ),
        }
        params.push(("apiKey", self.api_key.as_str()));

        Url::parse_with_params(&self.base_url, &params)
            .map_err(|e| FetchError::Network(format!("invalid headlines URL {}: {}", self.base_url, e)))
    }
}

#[async_trait::async_trait]
impl NewsSource for HeadlinesClient {
    fn name(&self) -> &'static str {
        "headlines"
    }

    async fn fetch(&self, query: &NewsQuery) -> Result<Vec<Article>, FetchError> {
        let url = self.request_url(query)?;
        let response = self.client.get(url).send().await?;
        let text = read_success_body(response).await?;

        let envelope: HeadlinesEnvelope =
            serde_json::from_str(&text).map_err(|e| FetchError::Decode(e.to_string()))?;
        info!(
            keyword = %query.keyword,
            status = envelope.status.as_deref().unwrap_or("unknown"),
            total = envelope.total_results.unwrap_or(0),
            received = envelope.articles.len(),
            "headlines fetched"
        );

        Ok(normalize_records(
            envelope.articles,
            &self.source_language,
            Some(&self.source_language),
        ))
    }
}
