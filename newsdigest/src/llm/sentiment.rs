use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use super::{LlmProvider, LlmRequest};

/// Three-way sentiment of an article, plus `Unknown` for anything unusable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Unknown,
}

impl SentimentLabel {
    /// Exact match on the trimmed completion; anything else is `Unknown`.
    pub fn from_completion(text: &str) -> Self {
        match text.trim() {
            "Positive" => SentimentLabel::Positive,
            "Negative" => SentimentLabel::Negative,
            "Neutral" => SentimentLabel::Neutral,
            _ => SentimentLabel::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn build_prompt(title: &str, body: &str) -> String {
    format!(
        "Classify the sentiment of the following news article. \
         Respond with exactly one word: Positive, Negative, or Neutral.\n\n\
         Title: {}\n\
         Content: {}",
        title, body
    )
}

/// Classify the original (untranslated) article. Never fails: provider
/// errors are logged and reported as `Unknown`.
pub async fn classify<P: LlmProvider + ?Sized>(provider: &P, title: &str, body: &str) -> SentimentLabel {
    let request = LlmRequest {
        prompt: build_prompt(title, body),
        max_tokens: Some(5),
        temperature: Some(0.0),
        timeout_seconds: None,
    };

    match provider.generate(request).await {
        Ok(response) => {
            let label = SentimentLabel::from_completion(&response.content);
            if label == SentimentLabel::Unknown {
                debug!(completion = %response.content, "sentiment completion did not match a label");
            }
            label
        }
        Err(e) => {
            warn!(error = %e, "sentiment request failed");
            SentimentLabel::Unknown
        }
    }
}
