/*!
common/src/lib.rs

Shared configuration types and secret helpers for News Digest.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader for a TOML config file, with default/override merging
- Secret resolution from a secrets file or the process environment
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Which news search API to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsProviderKind {
    /// Keyword query string against a top-headlines endpoint
    Headlines,
    /// Boolean query tree POSTed to an Event Registry style search endpoint
    EventRegistry,
}

/// News fetch configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    pub provider: NewsProviderKind,
    /// Endpoint override; each provider has its own default
    pub api_url: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    /// Key name inside the secrets file
    pub secret_key: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub page_size: Option<u32>,
    pub days_back: Option<u32>,
    /// Language tag kept after fetching (e.g. "eng")
    pub source_language: Option<String>,
}

/// Remote LLM config (used if `llm.adapter = "remote"`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLlmConfig {
    pub api_url: Option<String>,
    pub api_key_env: Option<String>,
    pub secret_key: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
}

/// LLM top-level config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub adapter: Option<String>, // "remote", "none"
    pub remote: Option<RemoteLlmConfig>,
}

/// PDF export configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Directory containing the TTF files named in `fonts`
    pub font_dir: Option<String>,
    /// Language code -> font file overrides
    #[serde(default)]
    pub fonts: HashMap<String, String>,
}

/// Location of the secrets file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsConfig {
    pub path: Option<String>,
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub news: NewsConfig,
    pub llm: Option<LlmConfig>,
    pub pdf: Option<PdfConfig>,
    pub secrets: Option<SecretsConfig>,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        for path in [default_path, override_path].into_iter().flatten() {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .with_context(|| format!("Failed to parse configuration: {}", path.display()))?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

/// Where API keys come from for this run.
///
/// When a secrets file is present (hosted deployments) its string entries are
/// used; otherwise keys are read from environment variables.
#[derive(Debug, Clone)]
pub enum SecretStore {
    File(HashMap<String, String>),
    Environment,
}

impl SecretStore {
    /// Pick the store for the current runtime environment.
    pub async fn detect(config: &Config) -> Result<Self> {
        let path = config.secrets.as_ref().and_then(|s| s.path.as_deref());
        match path {
            Some(p) if Path::new(p).exists() => {
                let data = tokio::fs::read_to_string(p)
                    .await
                    .with_context(|| format!("Failed to read secrets file: {}", p))?;
                Self::from_toml(&data)
            }
            _ => Ok(SecretStore::Environment),
        }
    }

    /// Parse a flat `key = "value"` secrets file. Non-string values are ignored.
    pub fn from_toml(data: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(data).context("Failed to parse secrets file")?;
        let secrets = table
            .into_iter()
            .filter_map(|(k, v)| match v {
                toml::Value::String(s) => Some((k, s)),
                _ => None,
            })
            .collect();
        Ok(SecretStore::File(secrets))
    }

    /// Look up a secret by its key in the secrets file, or by environment variable.
    pub fn resolve(&self, secret_key: Option<&str>, env_var: Option<&str>) -> Result<String> {
        match self {
            SecretStore::File(secrets) => {
                let key = secret_key.context("No secret_key configured for secrets file lookup")?;
                secrets
                    .get(key)
                    .cloned()
                    .with_context(|| format!("Secret '{}' missing from secrets file", key))
            }
            SecretStore::Environment => {
                let var = env_var.context("No api_key_env configured for environment lookup")?;
                std::env::var(var).with_context(|| format!("API key env var '{}' not set", var))
            }
        }
    }
}
