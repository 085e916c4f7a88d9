//! Decoder for the line-oriented summary/translation completion.
//!
//! The prompt asks the model to answer in this layout:
//!
//! ```text
//! Summary in <LANG>:
//! - bullet
//! - bullet
//! Translated Title: <title>
//! Translated Content: <body>
//! ```
//!
//! Models drift from the layout, so decoding is best effort and never fails:
//! whatever was recognized is returned, everything else defaults to empty.

use serde::{Deserialize, Serialize};

use crate::markdown;

pub const SUMMARY_MARKER: &str = "Summary in";
pub const TITLE_MARKER: &str = "Translated Title:";
pub const CONTENT_MARKER: &str = "Translated Content:";

/// Summary bullets plus translated title and body, all from one completion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub summary_bullets: Vec<String>,
    pub translated_title: String,
    pub translated_body: String,
}

impl TranslationResult {
    pub fn is_empty(&self) -> bool {
        self.summary_bullets.is_empty()
            && self.translated_title.is_empty()
            && self.translated_body.is_empty()
    }
}

/// Turns a completion into a TranslationResult. Implementations must be total.
pub trait ResponseDecoder: Send + Sync {
    fn decode(&self, completion: &str) -> TranslationResult;
}

/// Prefix-matching decoder for the layout above.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineProtocolDecoder;

impl ResponseDecoder for LineProtocolDecoder {
    fn decode(&self, completion: &str) -> TranslationResult {
        decode(completion)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    Scanning,
    Bullets,
}

/// Decode a completion. Bullets are kept as the model wrote them (minus the
/// leading dash); title and body have emphasis markers stripped.
pub fn decode(completion: &str) -> TranslationResult {
    let mut bullets = Vec::new();
    let mut title = String::new();
    let mut body = String::new();
    let mut mode = Mode::Scanning;

    for line in completion.lines() {
        let line = line.trim();

        if line.starts_with(SUMMARY_MARKER) {
            mode = Mode::Bullets;
        } else if let Some(rest) = line.strip_prefix(TITLE_MARKER) {
            mode = Mode::Scanning;
            title = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix(CONTENT_MARKER) {
            mode = Mode::Scanning;
            body = rest.trim().to_string();
        } else if mode == Mode::Bullets {
            match line.strip_prefix('-') {
                Some(bullet) => bullets.push(bullet.trim().to_string()),
                None => mode = Mode::Scanning,
            }
        }
    }

    TranslationResult {
        summary_bullets: bullets,
        translated_title: markdown::strip(&title),
        translated_body: markdown::strip(&body),
    }
}

/// Decode a completion delivered as several chunks, joined with newlines.
pub fn decode_parts<I, S>(parts: I) -> TranslationResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = parts
        .into_iter()
        .map(|p| p.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    decode(&joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRENCH: &str = "Summary in French:\n- Point one\n- Point two\nTranslated Title: Le Titre\nTranslated Content: Le Corps";

    #[test]
    fn decodes_exact_layout() {
        let result = decode(FRENCH);
        assert_eq!(result.summary_bullets, vec!["Point one", "Point two"]);
        assert_eq!(result.translated_title, "Le Titre");
        assert_eq!(result.translated_body, "Le Corps");
    }

    #[test]
    fn empty_and_marker_free_inputs_default() {
        for input in ["", "\n\n\n", "The model refused to follow the format.", "   "] {
            let result = decode(input);
            assert!(result.is_empty(), "input: {input:?}");
        }
    }

    #[test]
    fn ignores_preamble_and_postamble() {
        let text = "Sure! Here is what you asked for.\n\n\
                    Summary in Japanese:\n- 一つ目\n- 二つ目\n\
                    Translated Title: 見出し\n\
                    Translated Content: 本文\n\
                    Let me know if you need anything else.";
        let result = decode(text);
        assert_eq!(result.summary_bullets, vec!["一つ目", "二つ目"]);
        assert_eq!(result.translated_title, "見出し");
        assert_eq!(result.translated_body, "本文");
    }

    #[test]
    fn bullets_stop_at_first_non_dash_line() {
        let text = "Summary in Thai:\n- first\nsome prose\n- not a bullet anymore\nTranslated Title: T";
        let result = decode(text);
        assert_eq!(result.summary_bullets, vec!["first"]);
        assert_eq!(result.translated_title, "T");
    }

    #[test]
    fn dash_lines_outside_summary_are_ignored() {
        let result = decode("- stray\nTranslated Title: T\n- after title");
        assert!(result.summary_bullets.is_empty());
        assert_eq!(result.translated_title, "T");
    }

    #[test]
    fn partial_output_yields_empty_fields() {
        let result = decode("Summary in Korean:\n- only bullets");
        assert_eq!(result.summary_bullets, vec!["only bullets"]);
        assert_eq!(result.translated_title, "");
        assert_eq!(result.translated_body, "");

        let result = decode("Translated Content: just the body");
        assert!(result.summary_bullets.is_empty());
        assert_eq!(result.translated_title, "");
        assert_eq!(result.translated_body, "just the body");
    }

    #[test]
    fn title_and_body_are_stripped_but_bullets_are_not() {
        let text = "Summary in Hindi:\n- **key** point\nTranslated Title: **Bold title**\nTranslated Content:   _body_  ";
        let result = decode(text);
        assert_eq!(result.summary_bullets, vec!["**key** point"]);
        assert_eq!(result.translated_title, "Bold title");
        assert_eq!(result.translated_body, "body");
    }

    #[test]
    fn tolerates_indentation_and_crlf() {
        let text = "  Summary in Malay:\r\n   - satu\r\n\t-dua\r\n  Translated Title:  Tajuk \r\n";
        let result = decode(text);
        assert_eq!(result.summary_bullets, vec!["satu", "dua"]);
        assert_eq!(result.translated_title, "Tajuk");
    }

    #[test]
    fn later_markers_overwrite_earlier_ones() {
        let result = decode("Translated Title: first\nTranslated Title: second");
        assert_eq!(result.translated_title, "second");
    }

    #[test]
    fn chunked_completion_is_joined_with_newlines() {
        let parts = vec![
            "Summary in French:",
            "- Point one",
            "- Point two",
            "Translated Title: Le Titre",
            "Translated Content: Le Corps",
        ];
        assert_eq!(decode_parts(parts), decode(FRENCH));
    }

    #[test]
    fn decoder_trait_delegates() {
        let decoder: &dyn ResponseDecoder = &LineProtocolDecoder;
        assert_eq!(decoder.decode(FRENCH).translated_title, "Le Titre");
    }
}
