// Summarize + translate one article through the LLM
use tracing::{info, warn};

use super::decoder::{ResponseDecoder, TranslationResult};
use super::{LlmProvider, LlmRequest};
use crate::languages::TargetLanguage;
use crate::news::Article;

/// Build the prompt asking for the `Summary in / Translated Title / Translated Content` layout.
pub fn build_prompt(article: &Article, language: TargetLanguage) -> String {
    let lang = language.name();
    format!(
        "Summarize the following news article in {lang} as 3 to 5 bullet points, \
         then translate its title and content into {lang}.\n\n\
         Answer using exactly this format:\n\
         Summary in {lang}:\n\
         - <bullet>\n\
         - <bullet>\n\
         Translated Title: <title in {lang}>\n\
         Translated Content: <content in {lang} on a single line>\n\n\
         Title: {title}\n\
         Content: {body}\n",
        lang = lang,
        title = article.title,
        body = article.body,
    )
}

/// Ask the LLM for a summary and translation of `article`.
///
/// A failed call is logged and reported as `None` so callers can show
/// "no translation available" instead of failing.
pub async fn summarize_and_translate<P: LlmProvider + ?Sized>(
    provider: &P,
    decoder: &dyn ResponseDecoder,
    article: &Article,
    language: TargetLanguage,
) -> Option<TranslationResult> {
    let request = LlmRequest::prompt(build_prompt(article, language));

    match provider.generate(request).await {
        Ok(response) => {
            let result = decoder.decode(&response.content);
            if result.is_empty() {
                warn!(
                    language = language.code(),
                    "completion did not follow the requested layout; nothing decoded"
                );
            }
            info!(
                language = language.code(),
                bullets = result.summary_bullets.len(),
                total_tokens = response.usage.total_tokens,
                "article translated"
            );
            Some(result)
        }
        Err(e) => {
            warn!(language = language.code(), error = %e, "translation request failed");
            None
        }
    }
}
