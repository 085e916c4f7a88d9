use once_cell::sync::Lazy;
use regex::Regex;

static BOLD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*(.*?)\*\*|__(.*?)__").unwrap()
});

static ITALIC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*(.*?)\*|_(.*?)_").unwrap()
});

/// Remove bold/italic emphasis markers, keeping the emphasized text.
///
/// Bold spans (`**x**`, `__x__`) are replaced first, then italic spans
/// (`*x*`, `_x_`). Each family gets a single pass, so nested or overlapping
/// markers may survive. In particular `*` nested in `_` (or the reverse)
/// loses only the outer pair, and stripping the result again removes the
/// inner one. Matching never crosses a line break.
pub fn strip(text: &str) -> String {
    let unbolded = BOLD_REGEX.replace_all(text, inner_text);
    let plain = ITALIC_REGEX.replace_all(&unbolded, inner_text);
    plain.trim().to_string()
}

fn inner_text(caps: &regex::Captures<'_>) -> String {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
