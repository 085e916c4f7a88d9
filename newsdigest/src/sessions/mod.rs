use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::llm::decoder::TranslationResult;
use crate::news::Article;

/// Session represents one user's state between interactions: the latest
/// fetch result and the translations produced for it.
///
/// Translations are keyed by article position only. Positions are not stable
/// across fetches, so replacing the article list drops every translation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    articles: Vec<Article>,
    translations: HashMap<usize, TranslationResult>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            articles: Vec::new(),
            translations: HashMap::new(),
        }
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn article(&self, index: usize) -> Option<&Article> {
        self.articles.get(index)
    }

    /// Install a new fetch result, clearing all cached translations
    pub fn replace_articles(&mut self, articles: Vec<Article>) {
        self.articles = articles;
        self.translations.clear();
    }

    /// Insert or overwrite the translation for `index`
    pub fn set_translation(&mut self, index: usize, result: TranslationResult) {
        self.translations.insert(index, result);
    }

    pub fn get_translation(&self, index: usize) -> Option<&TranslationResult> {
        self.translations.get(&index)
    }

    pub fn translation_count(&self) -> usize {
        self.translations.len()
    }
}
