use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Languages an article can be summarized and translated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    Chinese,
    Japanese,
    Korean,
    Indonesian,
    Thai,
    Vietnamese,
    Malay,
    Filipino,
    Hindi,
}

impl TargetLanguage {
    pub const ALL: [TargetLanguage; 9] = [
        TargetLanguage::Chinese,
        TargetLanguage::Japanese,
        TargetLanguage::Korean,
        TargetLanguage::Indonesian,
        TargetLanguage::Thai,
        TargetLanguage::Vietnamese,
        TargetLanguage::Malay,
        TargetLanguage::Filipino,
        TargetLanguage::Hindi,
    ];

    /// ISO 639-1 code
    pub fn code(self) -> &'static str {
        match self {
            TargetLanguage::Chinese => "zh",
            TargetLanguage::Japanese => "ja",
            TargetLanguage::Korean => "ko",
            TargetLanguage::Indonesian => "id",
            TargetLanguage::Thai => "th",
            TargetLanguage::Vietnamese => "vi",
            TargetLanguage::Malay => "ms",
            TargetLanguage::Filipino => "tl",
            TargetLanguage::Hindi => "hi",
        }
    }

    /// English display name, also used inside prompts.
    pub fn name(self) -> &'static str {
        match self {
            TargetLanguage::Chinese => "Chinese",
            TargetLanguage::Japanese => "Japanese",
            TargetLanguage::Korean => "Korean",
            TargetLanguage::Indonesian => "Indonesian",
            TargetLanguage::Thai => "Thai",
            TargetLanguage::Vietnamese => "Vietnamese",
            TargetLanguage::Malay => "Malay",
            TargetLanguage::Filipino => "Filipino (Tagalog)",
            TargetLanguage::Hindi => "Hindi",
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetLanguage {
    type Err = anyhow::Error;

    /// Accepts a language code ("ja") or an English name ("Japanese", "tagalog").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        TargetLanguage::ALL
            .into_iter()
            .find(|lang| {
                lang.code() == wanted
                    || lang.name().to_lowercase() == wanted
                    || format!("{:?}", lang).to_lowercase() == wanted
                    || (*lang == TargetLanguage::Filipino && wanted == "tagalog")
            })
            .ok_or_else(|| anyhow::anyhow!("Unsupported target language: {}", s))
    }
}
