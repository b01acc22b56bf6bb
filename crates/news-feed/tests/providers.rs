//! 뉴스 공급자 HTTP 통합 테스트
//!
//! mockito 서버로 News API / Alpha Vantage 응답을 흉내 내어
//! 정규화, 한도 초과 매핑, 다중 공급자 병합을 검증합니다.

use std::sync::Arc;
use std::time::Duration;

use mockito::Matcher;
use news_core::{NewsCategory, Sentiment};
use news_feed::provider::http_client;
use news_feed::{
    AlphaVantageProvider, FeedError, Fetcher, NewsApiProvider, NewsProvider, ProviderOutcome,
};

fn client() -> reqwest::Client {
    http_client(Duration::from_secs(5)).unwrap()
}

const NEWS_API_BODY: &str = r#"{
    "status": "ok",
    "totalResults": 3,
    "articles": [
        {
            "source": {"id": null, "name": "CNBC"},
            "title": "Stocks rally as Fed signals rate cuts",
            "description": "Wall Street gains broadly",
            "url": "https://cnbc.com/1",
            "urlToImage": null,
            "publishedAt": "2024-05-01T10:00:00Z"
        },
        {
            "source": {"id": null, "name": "Reuters"},
            "title": "Bitcoin slides below $60,000",
            "description": null,
            "url": "https://reuters.com/2",
            "urlToImage": "https://reuters.com/2.jpg",
            "publishedAt": "2024-05-01T12:00:00Z"
        },
        {
            "source": {"id": null, "name": "[Removed]"},
            "title": "[Removed]",
            "description": "[Removed]",
            "url": "https://removed.com",
            "publishedAt": "1970-01-01T00:00:00Z"
        }
    ]
}"#;

const ALPHA_VANTAGE_BODY: &str = r#"{
    "items": "2",
    "feed": [
        {
            "title": "Stocks Rally As Fed Signals Rate Cuts",
            "url": "https://benzinga.com/dup",
            "time_published": "20240501T110000",
            "summary": "duplicate of the CNBC story",
            "source": "Benzinga",
            "overall_sentiment_label": "Bullish",
            "topics": [{"topic": "Financial Markets", "relevance_score": "0.7"}]
        },
        {
            "title": "Gold steadies ahead of jobs data",
            "url": "https://benzinga.com/gold",
            "time_published": "20240501T130000",
            "summary": "",
            "source": "Benzinga",
            "overall_sentiment_label": "Somewhat-Bearish",
            "topics": []
        }
    ]
}"#;

#[tokio::test]
async fn test_news_api_fetch_and_normalize() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v2/everything")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("apiKey".into(), "key-1".into()),
            Matcher::UrlEncoded("language".into(), "en".into()),
            Matcher::UrlEncoded("sortBy".into(), "publishedAt".into()),
            Matcher::UrlEncoded("pageSize".into(), "50".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(NEWS_API_BODY)
        .create_async()
        .await;

    let provider = NewsApiProvider::new(client(), "key-1").with_base_url(&server.url());
    let items = provider.fetch().await.unwrap();

    mock.assert_async().await;
    assert_eq!(items.len(), 2);

    let stocks = &items[0];
    assert_eq!(stocks.source, "CNBC");
    assert_eq!(stocks.category, NewsCategory::Markets);
    assert_eq!(stocks.sentiment, Sentiment::Positive);
    assert!(stocks.is_breaking);

    let bitcoin = &items[1];
    assert_eq!(bitcoin.category, NewsCategory::Crypto);
    assert_eq!(bitcoin.description, "");
    assert_eq!(bitcoin.url_to_image.as_deref(), Some("https://reuters.com/2.jpg"));
}

#[tokio::test]
async fn test_news_api_rate_limited() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v2/everything")
        .match_query(Matcher::Any)
        .with_status(429)
        .with_body(r#"{"status":"error","code":"rateLimited"}"#)
        .create_async()
        .await;

    let provider = NewsApiProvider::new(client(), "key-1").with_base_url(&server.url());
    let err = provider.fetch().await.unwrap_err();

    assert!(matches!(err, FeedError::RateLimited(ref p) if p == "news_api"));
}

#[tokio::test]
async fn test_news_api_error_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v2/everything")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"status":"error","code":"apiKeyInvalid"}"#)
        .create_async()
        .await;

    let provider = NewsApiProvider::new(client(), "bad").with_base_url(&server.url());
    let err = provider.fetch().await.unwrap_err();

    assert!(matches!(err, FeedError::Api { status: 401, .. }));
}

#[tokio::test]
async fn test_alpha_vantage_fetch() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/query")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("function".into(), "NEWS_SENTIMENT".into()),
            Matcher::UrlEncoded("apikey".into(), "av-key".into()),
            Matcher::UrlEncoded("topics".into(), "technology,earnings,forex,ipo".into()),
        ]))
        .with_status(200)
        .with_body(ALPHA_VANTAGE_BODY)
        .create_async()
        .await;

    let provider = AlphaVantageProvider::new(client(), "av-key").with_base_url(&server.url());
    let items = provider.fetch().await.unwrap();

    mock.assert_async().await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].published_at, "2024-05-01T11:00:00+00:00");
    assert_eq!(items[0].sentiment, Sentiment::Positive);
    assert!((items[0].relevance_score - 0.7).abs() < 1e-9);
    assert_eq!(items[1].sentiment, Sentiment::Negative);
    assert_eq!(items[1].category, NewsCategory::Commodities);
}

#[tokio::test]
async fn test_alpha_vantage_information_is_rate_limit() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/query")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"Information": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."}"#)
        .create_async()
        .await;

    let provider = AlphaVantageProvider::new(client(), "av-key").with_base_url(&server.url());
    let err = provider.fetch().await.unwrap_err();

    assert!(matches!(err, FeedError::RateLimited(ref p) if p == "alpha_vantage"));
}

#[tokio::test]
async fn test_fetcher_merges_providers() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v2/everything")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(NEWS_API_BODY)
        .create_async()
        .await;
    server
        .mock("GET", "/query")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(ALPHA_VANTAGE_BODY)
        .create_async()
        .await;

    let providers: Vec<Arc<dyn NewsProvider>> = vec![
        Arc::new(NewsApiProvider::new(client(), "k").with_base_url(&server.url())),
        Arc::new(AlphaVantageProvider::new(client(), "k").with_base_url(&server.url())),
    ];
    let fetcher = Fetcher::new(providers, 50);

    let report = fetcher.fetch_report().await;
    let titles: Vec<_> = report.items.iter().map(|i| i.title.as_str()).collect();

    // 중복 기사는 첫 공급자(News API) 버전이 남고, 최신순 정렬
    assert_eq!(
        titles,
        vec![
            "Gold steadies ahead of jobs data",
            "Bitcoin slides below $60,000",
            "Stocks rally as Fed signals rate cuts",
        ]
    );
    assert_eq!(report.items[2].source, "CNBC");
    assert!(report.failed_providers().is_empty());
}

#[tokio::test]
async fn test_fetcher_keeps_partial_results_on_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v2/everything")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;
    server
        .mock("GET", "/query")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(ALPHA_VANTAGE_BODY)
        .create_async()
        .await;

    let providers: Vec<Arc<dyn NewsProvider>> = vec![
        Arc::new(NewsApiProvider::new(client(), "k").with_base_url(&server.url())),
        Arc::new(AlphaVantageProvider::new(client(), "k").with_base_url(&server.url())),
    ];
    let report = Fetcher::new(providers, 50).fetch_report().await;

    assert_eq!(report.items.len(), 2);
    assert!(matches!(
        report.outcomes[0],
        ProviderOutcome::Failed { ref provider, .. } if provider == "news_api"
    ));
    assert_eq!(report.outcomes[1].item_count(), 2);
}
