//! User-action handlers: fetch, translate, sentiment, download.
//!
//! Each handler receives the caller's [`Session`] explicitly and performs at
//! most one external round trip per article. Failures degrade to a logged
//! warning plus an error value or `None`; nothing here panics or retries.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::languages::TargetLanguage;
use crate::llm::decoder::{LineProtocolDecoder, ResponseDecoder, TranslationResult};
use crate::llm::sentiment::{self, SentimentLabel};
use crate::llm::translator;
use crate::llm::LlmProvider;
use crate::news::{FetchError, NewsQuery, NewsSource};
use crate::pdf::{PdfArtifact, PdfExporter};
use crate::sessions::Session;

pub struct Digest {
    news: Box<dyn NewsSource>,
    llm: Arc<dyn LlmProvider>,
    decoder: Box<dyn ResponseDecoder>,
    exporter: PdfExporter,
}

impl Digest {
    pub fn new(news: Box<dyn NewsSource>, llm: Arc<dyn LlmProvider>, exporter: PdfExporter) -> Self {
        Self {
            news,
            llm,
            decoder: Box::new(LineProtocolDecoder),
            exporter,
        }
    }

    /// Swap the completion decoder (e.g. for a structured-output format).
    pub fn with_decoder(mut self, decoder: Box<dyn ResponseDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Fetch articles for `query` into the session.
    ///
    /// Network and HTTP failures leave the session untouched. A response that
    /// cannot be decoded empties the article list so nothing downstream works
    /// on stale positions.
    pub async fn fetch(&self, session: &mut Session, query: &NewsQuery) -> Result<usize, FetchError> {
        info!(provider = self.news.name(), keyword = %query.keyword, "fetching news");
        match self.news.fetch(query).await {
            Ok(articles) => {
                let count = articles.len();
                session.replace_articles(articles);
                info!(session = %session.id, count, "articles stored in session");
                Ok(count)
            }
            Err(e @ FetchError::Decode(_)) => {
                error!(session = %session.id, error = %e, "news response could not be decoded; clearing articles");
                session.replace_articles(Vec::new());
                Err(e)
            }
            Err(e) => {
                warn!(session = %session.id, error = %e, "news fetch failed");
                Err(e)
            }
        }
    }

    /// Summarize and translate one article, caching the result in the session.
    pub async fn translate<'s>(
        &self,
        session: &'s mut Session,
        index: usize,
        language: TargetLanguage,
    ) -> Option<&'s TranslationResult> {
        let Some(article) = session.article(index) else {
            warn!(index, "translate requested for unknown article");
            return None;
        };

        let result =
            translator::summarize_and_translate(self.llm.as_ref(), self.decoder.as_ref(), article, language).await?;
        session.set_translation(index, result);
        session.get_translation(index)
    }

    /// Translate every article in order, one request at a time.
    /// Returns how many translations succeeded.
    pub async fn translate_all(&self, session: &mut Session, language: TargetLanguage) -> usize {
        let mut translated = 0;
        for index in 0..session.articles().len() {
            if self.translate(session, index, language).await.is_some() {
                translated += 1;
            }
        }
        info!(session = %session.id, translated, total = session.articles().len(), "bulk translation finished");
        translated
    }

    /// Sentiment of the original article; `Unknown` for a bad index.
    pub async fn sentiment(&self, session: &Session, index: usize) -> SentimentLabel {
        match session.article(index) {
            Some(article) => sentiment::classify(self.llm.as_ref(), &article.title, &article.body).await,
            None => SentimentLabel::Unknown,
        }
    }

    /// Build the PDF report for an already translated article.
    pub async fn download(
        &self,
        session: &Session,
        index: usize,
        language: TargetLanguage,
    ) -> Result<PdfArtifact> {
        let article = session
            .article(index)
            .with_context(|| format!("No article at position {}", index))?;
        let translation = session
            .get_translation(index)
            .with_context(|| format!("Article {} has not been translated yet", index))?;

        let label = self.sentiment(session, index).await;
        let artifact = self
            .exporter
            .artifact(article, translation, label, language)
            .with_context(|| format!("Failed to render PDF for article {}", index))?;
        info!(file = %artifact.file_name, bytes = artifact.bytes.len(), "PDF report ready");
        Ok(artifact)
    }
}
