use mockito::Matcher;
use newsdigest::controller::Digest;
use newsdigest::languages::TargetLanguage;
use newsdigest::llm::decoder::TranslationResult;
use newsdigest::llm::remote::RemoteLlmProvider;
use newsdigest::llm::sentiment::SentimentLabel;
use newsdigest::news::headlines::HeadlinesClient;
use newsdigest::news::{Article, FetchError, NewsQuery};
use newsdigest::pdf::{FontTable, PdfExporter};
use newsdigest::sessions::Session;
use std::sync::Arc;

const HEADLINES: &str = r#"{
    "status": "ok",
    "totalResults": 2,
    "articles": [
        { "title": "Rates held", "content": "The bank kept rates unchanged.", "url": "https://news.example/rates" },
        { "title": "Storm warning", "content": "Heavy rain expected.", "url": "https://news.example/storm" }
    ]
}"#;

const TRANSLATION: &str = "Summary in Indonesian:\n- Suku bunga tetap\n- Inflasi stabil\nTranslated Title: Suku bunga ditahan\nTranslated Content: Bank menahan suku bunga.";

fn completion(content: &str) -> String {
    serde_json::json!({
        "model": "gpt-4",
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
    .to_string()
}

fn digest(news_url: String, llm_url: String) -> Digest {
    let news = HeadlinesClient::new(news_url, "news-key").unwrap();
    let llm = RemoteLlmProvider::new(llm_url, "llm-key", "gpt-4");
    let fonts_dir = std::env::temp_dir().join("newsdigest-no-fonts");
    Digest::new(Box::new(news), Arc::new(llm), PdfExporter::new(FontTable::new(fonts_dir)))
}

fn seeded_session() -> Session {
    let mut session = Session::new();
    session.replace_articles(vec![Article {
        title: "Old".to_string(),
        body: "Old body".to_string(),
        url: "#".to_string(),
        language: "eng".to_string(),
    }]);
    session.set_translation(0, TranslationResult::default());
    session
}

#[tokio::test]
async fn fetch_translate_classify_download() {
    let mut news = mockito::Server::new_async().await;
    let mut llm = mockito::Server::new_async().await;

    let _news_mock = news
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(HEADLINES)
        .create_async()
        .await;

    let translate_mock = llm
        .mock("POST", "/")
        .match_body(Matcher::Regex("Summarize the following news article".to_string()))
        .with_status(200)
        .with_body(completion(TRANSLATION))
        .create_async()
        .await;

    let _sentiment_mock = llm
        .mock("POST", "/")
        .match_body(Matcher::Regex("Classify the sentiment".to_string()))
        .with_status(200)
        .with_body(completion("Neutral"))
        .create_async()
        .await;

    let digest = digest(news.url(), llm.url());
    let mut session = Session::new();

    let count = digest
        .fetch(&mut session, &NewsQuery::new("rates"))
        .await
        .expect("fetch");
    assert_eq!(count, 2);
    assert_eq!(session.articles()[1].title, "Storm warning");

    let result = digest
        .translate(&mut session, 0, TargetLanguage::Indonesian)
        .await
        .expect("translation")
        .clone();
    assert_eq!(result.summary_bullets, vec!["Suku bunga tetap", "Inflasi stabil"]);
    assert_eq!(result.translated_title, "Suku bunga ditahan");
    assert_eq!(session.get_translation(0), Some(&result));
    assert!(session.get_translation(1).is_none());

    assert_eq!(digest.sentiment(&session, 0).await, SentimentLabel::Neutral);

    let artifact = digest
        .download(&session, 0, TargetLanguage::Indonesian)
        .await
        .expect("pdf");
    assert_eq!(artifact.file_name, "Rates_held.pdf");
    assert_eq!(artifact.mime_type, "application/pdf");
    assert!(artifact.bytes.starts_with(b"%PDF"));

    translate_mock.assert_async().await;
}

#[tokio::test]
async fn translate_all_and_refetch_clears_cache() {
    let mut news = mockito::Server::new_async().await;
    let mut llm = mockito::Server::new_async().await;

    let _news_mock = news
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(HEADLINES)
        .expect(2)
        .create_async()
        .await;

    let translate_mock = llm
        .mock("POST", "/")
        .with_status(200)
        .with_body(completion(TRANSLATION))
        .expect(2)
        .create_async()
        .await;

    let digest = digest(news.url(), llm.url());
    let mut session = Session::new();
    digest.fetch(&mut session, &NewsQuery::new("rates")).await.unwrap();

    let translated = digest.translate_all(&mut session, TargetLanguage::Indonesian).await;
    assert_eq!(translated, 2);
    assert_eq!(session.translation_count(), 2);
    translate_mock.assert_async().await;

    digest.fetch(&mut session, &NewsQuery::new("rates")).await.unwrap();
    assert_eq!(session.articles().len(), 2);
    assert_eq!(session.translation_count(), 0);
}

#[tokio::test]
async fn decode_failure_empties_session() {
    let mut news = mockito::Server::new_async().await;
    let llm = mockito::Server::new_async().await;

    let _news_mock = news
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status": "ok"}"#)
        .create_async()
        .await;

    let digest = digest(news.url(), llm.url());
    let mut session = seeded_session();

    let result = digest.fetch(&mut session, &NewsQuery::new("rates")).await;

    assert!(matches!(result, Err(FetchError::Decode(_))));
    assert!(session.articles().is_empty());
    assert!(session.get_translation(0).is_none());
}

#[tokio::test]
async fn http_failure_leaves_session_unchanged() {
    let mut news = mockito::Server::new_async().await;
    let llm = mockito::Server::new_async().await;

    let _news_mock = news
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("upstream down")
        .create_async()
        .await;

    let digest = digest(news.url(), llm.url());
    let mut session = seeded_session();

    let result = digest.fetch(&mut session, &NewsQuery::new("rates")).await;

    assert!(matches!(result, Err(FetchError::Http { status: 500, .. })));
    assert_eq!(session.articles().len(), 1);
    assert!(session.get_translation(0).is_some());
}

#[tokio::test]
async fn llm_failure_yields_no_translation_and_unknown_sentiment() {
    let news = mockito::Server::new_async().await;
    let mut llm = mockito::Server::new_async().await;

    let _llm_mock = llm
        .mock("POST", "/")
        .with_status(503)
        .with_body("overloaded")
        .create_async()
        .await;

    let digest = digest(news.url(), llm.url());
    let mut session = Session::new();
    session.replace_articles(vec![Article {
        title: "Quiet day".to_string(),
        body: "Nothing happened.".to_string(),
        url: "#".to_string(),
        language: "eng".to_string(),
    }]);

    assert!(digest.translate(&mut session, 0, TargetLanguage::Thai).await.is_none());
    assert!(session.get_translation(0).is_none());
    assert_eq!(digest.sentiment(&session, 0).await, SentimentLabel::Unknown);
    assert!(digest.download(&session, 0, TargetLanguage::Thai).await.is_err());
}

#[tokio::test]
async fn out_of_range_index_is_handled() {
    let news = mockito::Server::new_async().await;
    let llm = mockito::Server::new_async().await;
    let digest = digest(news.url(), llm.url());
    let mut session = Session::new();

    assert!(digest.translate(&mut session, 3, TargetLanguage::Hindi).await.is_none());
    assert_eq!(digest.sentiment(&session, 3).await, SentimentLabel::Unknown);
    assert!(digest.download(&session, 3, TargetLanguage::Hindi).await.is_err());
}
