/*
newsdigest - command-line front end.
Fetches articles for a keyword, then summarizes/translates, classifies and
exports the selected ones, one request at a time.
*/

use anyhow::{Context, Result};
use clap::Parser;
use common::{Config, NewsProviderKind, SecretStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use newsdigest::controller::Digest;
use newsdigest::languages::TargetLanguage;
use newsdigest::llm::remote::{RemoteLlmProvider, DEFAULT_CHAT_URL};
use newsdigest::llm::LlmProvider;
use newsdigest::news::event_registry::{EventRegistryClient, DEFAULT_EVENT_REGISTRY_URL};
use newsdigest::news::headlines::{HeadlinesClient, DEFAULT_HEADLINES_URL};
use newsdigest::news::{NewsQuery, NewsSource, DEFAULT_SOURCE_LANGUAGE, DEFAULT_TIMEOUT_SECS};
use newsdigest::pdf::{FontTable, PdfExporter};
use newsdigest::sessions::Session;

#[derive(Parser, Debug)]
#[command(name = "newsdigest", about = "Search news, then summarize, translate and export articles")]
struct Args {
    /// Keyword to search for
    #[arg(long, short)]
    query: String,

    /// Target language (code or name, e.g. "ja" or "Japanese")
    #[arg(long, short)]
    language: Option<TargetLanguage>,

    /// Article positions to translate (0-based, repeatable)
    #[arg(long = "article", short = 'a')]
    articles: Vec<usize>,

    /// Translate every fetched article
    #[arg(long, conflicts_with = "articles")]
    all: bool,

    /// Classify sentiment of each translated article
    #[arg(long)]
    sentiment: bool,

    /// Write a PDF report per translated article into this directory
    #[arg(long, value_name = "DIR")]
    pdf_dir: Option<PathBuf>,

    /// Lookback window in days (overrides config)
    #[arg(long)]
    days_back: Option<u32>,

    /// Number of articles to request (overrides config)
    #[arg(long)]
    page_size: Option<u32>,

    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Resolve config paths
    let default_path = PathBuf::from("config.default.toml");
    let override_path = if let Some(p) = args.config.clone() {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() { Some(p) } else { None }
    };

    let config = Config::load_with_defaults(
        if default_path.exists() { Some(&default_path) } else { None },
        override_path.as_deref(),
    )
    .await
    .context("failed to load configuration")?;
    info!(default = ?default_path, override = ?override_path, "configuration loaded");

    let secrets = SecretStore::detect(&config).await?;
    info!(file_backed = matches!(secrets, SecretStore::File(_)), "secret store selected");

    let news = create_news_source(&config, &secrets)?;
    let llm = create_llm_provider(&config, &secrets)?;
    let exporter = create_exporter(&config);
    let digest = Digest::new(news, llm, exporter);

    let mut session = Session::new();
    let query = NewsQuery {
        keyword: args.query.clone(),
        days_back: args.days_back.or(config.news.days_back).unwrap_or(7),
        page_size: args.page_size.or(config.news.page_size).unwrap_or(10),
    };

    if let Err(e) = digest.fetch(&mut session, &query).await {
        eprintln!("Error fetching news: {}", e);
        return Err(e.into());
    }

    if session.articles().is_empty() {
        println!("No articles found for '{}'.", query.keyword);
        return Ok(());
    }

    println!("Original articles");
    for (i, article) in session.articles().iter().enumerate() {
        println!("[{}] {}", i, article.title);
        println!("    {}", article.url);
    }

    let Some(language) = args.language else {
        return Ok(());
    };

    let indices: Vec<usize> = if args.all {
        (0..session.articles().len()).collect()
    } else {
        args.articles.clone()
    };
    if indices.is_empty() {
        warn!("no articles selected; use --article N or --all");
        return Ok(());
    }

    if let Some(dir) = &args.pdf_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create PDF directory: {}", dir.display()))?;
    }

    for index in indices {
        let Some(result) = digest.translate(&mut session, index, language).await else {
            println!("\n[{}] No translation available.", index);
            continue;
        };

        println!("\n[{}] {}", index, result.translated_title);
        println!("Summary in {}:", language.name());
        for bullet in &result.summary_bullets {
            println!("  - {}", bullet);
        }
        if !result.translated_body.is_empty() {
            println!("{}", result.translated_body);
        }

        if args.sentiment {
            println!("Sentiment: {}", digest.sentiment(&session, index).await);
        }

        if let Some(dir) = &args.pdf_dir {
            match digest.download(&session, index, language).await {
                Ok(artifact) => {
                    let path = dir.join(&artifact.file_name);
                    match tokio::fs::write(&path, &artifact.bytes).await {
                        Ok(()) => println!("Saved {}", path.display()),
                        Err(e) => error!(path = %path.display(), error = %e, "failed to write PDF"),
                    }
                }
                Err(e) => error!(index, error = %e, "failed to build PDF"),
            }
        }
    }

    Ok(())
}

/// Create the configured news search client
fn create_news_source(config: &Config, secrets: &SecretStore) -> Result<Box<dyn NewsSource>> {
    let news = &config.news;
    let api_key = secrets
        .resolve(news.secret_key.as_deref(), news.api_key_env.as_deref())
        .context("News API key unavailable")?;
    let timeout = news.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS);
    let language = news
        .source_language
        .clone()
        .unwrap_or_else(|| DEFAULT_SOURCE_LANGUAGE.to_string());

    let source: Box<dyn NewsSource> = match news.provider {
        NewsProviderKind::Headlines => {
            let url = news.api_url.clone().unwrap_or_else(|| DEFAULT_HEADLINES_URL.to_string());
            Box::new(HeadlinesClient::with_timeout(url, api_key, timeout)?.with_source_language(language))
        }
        NewsProviderKind::EventRegistry => {
            let url = news.api_url.clone().unwrap_or_else(|| DEFAULT_EVENT_REGISTRY_URL.to_string());
            Box::new(EventRegistryClient::with_timeout(url, api_key, timeout)?.with_source_language(language))
        }
    };
    info!(provider = source.name(), timeout_secs = timeout, "news source initialized");
    Ok(source)
}

/// Create an LLM provider based on configuration
fn create_llm_provider(config: &Config, secrets: &SecretStore) -> Result<Arc<dyn LlmProvider>> {
    let llm_config = config
        .llm
        .as_ref()
        .context("Missing [llm] section in configuration")?;
    let adapter = llm_config.adapter.as_deref().unwrap_or("remote");
    match adapter {
        "remote" => {
            let remote = llm_config
                .remote
                .as_ref()
                .context("Remote adapter selected but no [llm.remote] config found")?;
            let api_key = secrets
                .resolve(remote.secret_key.as_deref(), remote.api_key_env.as_deref())
                .context("LLM API key unavailable")?;
            let model = remote.model.clone().unwrap_or_else(|| "gpt-4".to_string());
            let api_url = remote.api_url.clone().unwrap_or_else(|| DEFAULT_CHAT_URL.to_string());

            let provider = RemoteLlmProvider::new(api_url, api_key, model).with_defaults(
                remote.timeout_seconds.unwrap_or(60),
                remote.max_tokens,
                remote.temperature,
            );
            info!(model = provider.model(), "LLM provider initialized");
            Ok(Arc::new(provider))
        }
        _ => anyhow::bail!("Unknown LLM adapter type: {}", adapter),
    }
}

fn create_exporter(config: &Config) -> PdfExporter {
    let pdf = config.pdf.clone().unwrap_or_default();
    let fonts = FontTable::new(pdf.font_dir.unwrap_or_else(|| "fonts".to_string()))
        .with_overrides(&pdf.fonts);
    PdfExporter::new(fonts)
}
