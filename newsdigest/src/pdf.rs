//! One-page PDF report for a translated article.
//!
//! Layout is intentionally plain: original title (linked to the source),
//! translated title, summary bullets, sentiment. Glyph coverage depends on the
//! font picked for the target language; without a font file on disk the
//! built-in Helvetica is used.

use anyhow::{anyhow, Context, Result};
use printpdf::{
    Actions, BuiltinFont, IndirectFontRef, LinkAnnotation, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rect,
};
use serde::Serialize;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

use crate::languages::TargetLanguage;
use crate::llm::decoder::TranslationResult;
use crate::llm::sentiment::SentimentLabel;
use crate::news::Article;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const DEFAULT_FONT_FILE: &str = "NotoSans-Regular.ttf";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 13.0;
const TEXT_SIZE: f32 = 11.0;

/// Per-script font defaults; languages written in Latin script use the default font.
const SCRIPT_FONTS: &[(&str, &str)] = &[
    ("zh", "NotoSansSC-Regular.ttf"),
    ("ja", "NotoSansJP-Regular.ttf"),
    ("ko", "NotoSansKR-Regular.ttf"),
    ("th", "NotoSansThai-Regular.ttf"),
    ("hi", "NotoSansDevanagari-Regular.ttf"),
];

/// Language code -> font file lookup rooted at a font directory
#[derive(Debug, Clone)]
pub struct FontTable {
    font_dir: PathBuf,
    fonts: HashMap<String, String>,
}

impl Default for FontTable {
    fn default() -> Self {
        Self::new("fonts")
    }
}

impl FontTable {
    pub fn new(font_dir: impl Into<PathBuf>) -> Self {
        let fonts = SCRIPT_FONTS
            .iter()
            .map(|(code, file)| (code.to_string(), file.to_string()))
            .collect();
        Self {
            font_dir: font_dir.into(),
            fonts,
        }
    }

    /// Apply configured overrides on top of the defaults
    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        for (code, file) in overrides {
            self.fonts.insert(code.clone(), file.clone());
        }
        self
    }

    /// Font file name for the language, falling back to the default font.
    pub fn file_for(&self, language: TargetLanguage) -> &str {
        self.fonts
            .get(language.code())
            .map(String::as_str)
            .unwrap_or(DEFAULT_FONT_FILE)
    }

    /// Path of a font file that actually exists, if any.
    pub fn resolve(&self, language: TargetLanguage) -> Option<PathBuf> {
        [self.file_for(language), DEFAULT_FONT_FILE]
            .into_iter()
            .map(|file| self.font_dir.join(file))
            .find(|path| path.is_file())
    }
}

/// Rendered report ready to be offered as a download
#[derive(Debug, Clone, Serialize)]
pub struct PdfArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Renders article reports
#[derive(Debug, Clone, Default)]
pub struct PdfExporter {
    fonts: FontTable,
}

impl PdfExporter {
    pub fn new(fonts: FontTable) -> Self {
        Self { fonts }
    }

    pub fn render(
        &self,
        article: &Article,
        translation: &TranslationResult,
        sentiment: SentimentLabel,
        language: TargetLanguage,
    ) -> Result<Vec<u8>> {
        let (doc, page, layer) =
            PdfDocument::new(article.title.as_str(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Report");
        let font = self.load_font(&doc, language)?;
        let mut writer = PageWriter {
            layer: doc.get_page(page).get_layer(layer),
            font,
            y: PAGE_HEIGHT - MARGIN,
        };

        let (title_top, title_bottom) = writer.paragraph(&article.title, TITLE_SIZE);
        if let Ok(url) = Url::parse(&article.url) {
            writer.link(title_top, title_bottom, url.as_str());
        }
        writer.gap(4.0);

        writer.paragraph(&format!("{} title:", language.name()), HEADING_SIZE);
        writer.paragraph(&translation.translated_title, TEXT_SIZE);
        writer.gap(4.0);

        writer.paragraph("Summary:", HEADING_SIZE);
        for bullet in &translation.summary_bullets {
            writer.paragraph(&format!("- {}", bullet), TEXT_SIZE);
        }
        writer.gap(4.0);

        writer.paragraph(&format!("Sentiment: {}", sentiment), HEADING_SIZE);
        drop(writer);

        doc.save_to_bytes()
            .map_err(|e| anyhow!("Failed to serialize PDF: {}", e))
    }

    /// Render and wrap the bytes with a file name derived from the article title.
    pub fn artifact(
        &self,
        article: &Article,
        translation: &TranslationResult,
        sentiment: SentimentLabel,
        language: TargetLanguage,
    ) -> Result<PdfArtifact> {
        let bytes = self.render(article, translation, sentiment, language)?;
        Ok(PdfArtifact {
            file_name: file_name_for(&article.title),
            mime_type: PDF_MIME_TYPE,
            bytes,
        })
    }

    fn load_font(&self, doc: &PdfDocumentReference, language: TargetLanguage) -> Result<IndirectFontRef> {
        if let Some(path) = self.fonts.resolve(language) {
            match load_external_font(doc, &path) {
                Ok(font) => {
                    debug!(font = %path.display(), language = language.code(), "using external font");
                    return Ok(font);
                }
                Err(e) => warn!(font = %path.display(), error = %e, "font unusable, falling back to Helvetica"),
            }
        }
        doc.add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("Failed to add built-in font: {}", e))
    }
}

fn load_external_font(doc: &PdfDocumentReference, path: &Path) -> Result<IndirectFontRef> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read font {}", path.display()))?;
    doc.add_external_font(Cursor::new(data))
        .map_err(|e| anyhow!("Failed to embed font {}: {}", path.display(), e))
}

/// Tracks the write position on the single page.
struct PageWriter {
    layer: PdfLayerReference,
    font: IndirectFontRef,
    y: f32,
}

impl PageWriter {
    /// Write wrapped text, returning the (top, bottom) y of the block. Text
    /// that would run past the bottom margin is dropped.
    fn paragraph(&mut self, text: &str, size: f32) -> (f32, f32) {
        let top = self.y;
        let line_height = size * 0.3528 * 1.4; // pt -> mm, with leading
        for line in wrap_text(text, chars_per_line(size)) {
            if self.y - line_height < MARGIN {
                break;
            }
            self.y -= line_height;
            self.layer
                .use_text(line, size, Mm(MARGIN), Mm(self.y), &self.font);
        }
        (top, self.y)
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn link(&self, top: f32, bottom: f32, url: &str) {
        self.layer.add_link_annotation(LinkAnnotation::new(
            Rect::new(Mm(MARGIN), Mm(bottom - 1.0), Mm(PAGE_WIDTH - MARGIN), Mm(top)),
            None,
            None,
            Actions::uri(url.to_string()),
            None,
        ));
    }
}

fn chars_per_line(size: f32) -> usize {
    // average glyph ~0.5em wide
    let usable_pt = (PAGE_WIDTH - 2.0 * MARGIN) / 0.3528;
    (usable_pt / (size * 0.5)) as usize
}

/// Greedy word wrap by character count; words longer than a line are split.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for raw_line in text.lines() {
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let needed = current.chars().count() + usize::from(!current.is_empty()) + word.len();
            if needed > max_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.extend(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// Derive a download file name from an article title.
pub fn file_name_for(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .take(80)
        .collect();
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "article.pdf".to_string()
    } else {
        format!("{}.pdf", stem)
    }
}
