//! Alpha Vantage `NEWS_SENTIMENT` 클라이언트.
//!
//! Alpha Vantage는 한도 초과 시에도 HTTP 200과 함께 `Information` 또는
//! `Note` 필드만 담긴 본문을 반환하므로, `feed`가 없는 응답을 별도로 판별합니다.
//!
//! 감성은 공급자 라벨을 사용하고 (Bullish → positive, Bearish → negative),
//! 관련도는 토픽 관련도 중 최댓값을 사용합니다. 둘 다 없으면 분류기 결과로 대체합니다.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use news_core::{normalize_timestamp, NewsItem, ProvidersConfig, Sentiment};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{http_client, truncate_body, NewsProvider};
use crate::classifier::{ArticleClassifier, ArticleText, KeywordClassifier};
use crate::error::{FeedError, Result};

const PROVIDER_NAME: &str = "alpha_vantage";

#[derive(Debug, Deserialize)]
struct NewsSentimentResponse {
    #[serde(default)]
    feed: Option<Vec<RawFeedItem>>,
    #[serde(rename = "Information", default)]
    information: Option<String>,
    #[serde(rename = "Note", default)]
    note: Option<String>,
    #[serde(rename = "Error Message", default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFeedItem {
    title: Option<String>,
    summary: Option<String>,
    url: Option<String>,
    source: Option<String>,
    time_published: Option<String>,
    banner_image: Option<String>,
    overall_sentiment_label: Option<String>,
    #[serde(default)]
    topics: Vec<RawTopic>,
}

#[derive(Debug, Deserialize)]
struct RawTopic {
    relevance_score: Option<String>,
}

/// Alpha Vantage 뉴스 공급자.
#[derive(Clone)]
pub struct AlphaVantageProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    topics: String,
    limit: u32,
    lookback: Duration,
    classifier: Arc<dyn ArticleClassifier>,
}

impl AlphaVantageProvider {
    /// 기본 설정으로 공급자를 생성합니다.
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        let defaults = ProvidersConfig::default();
        Self {
            client,
            api_key: api_key.into(),
            base_url: defaults.alpha_vantage_base_url,
            topics: defaults.alpha_vantage_topics,
            limit: defaults.page_size,
            lookback: Duration::hours(defaults.lookback_hours),
            classifier: Arc::new(KeywordClassifier::default()),
        }
    }

    /// 설정에서 공급자를 생성합니다. API 키가 없으면 `None`.
    pub fn from_config(config: &ProvidersConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.alpha_vantage_api_key.clone() else {
            return Ok(None);
        };

        let client = http_client(config.request_timeout())?;
        Ok(Some(
            Self::new(client, api_key)
                .with_base_url(&config.alpha_vantage_base_url)
                .with_topics(&config.alpha_vantage_topics)
                .with_limit(config.page_size)
                .with_lookback(Duration::hours(config.lookback_hours)),
        ))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_topics(mut self, topics: &str) -> Self {
        self.topics = topics.to_string();
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_lookback(mut self, lookback: Duration) -> Self {
        self.lookback = lookback;
        self
    }

    /// 분류기를 교체합니다.
    pub fn with_classifier(mut self, classifier: Arc<dyn ArticleClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    fn normalize(&self, raw: RawFeedItem) -> Option<NewsItem> {
        let title = raw.title.map(|t| t.trim().to_string())?;
        if title.is_empty() {
            return None;
        }

        let description = raw.summary.unwrap_or_default();
        let source = raw.source.unwrap_or_default();
        let query = self.topics.replace(',', " ");
        let classification = self.classifier.classify(&ArticleText {
            title: &title,
            description: &description,
            source: &source,
            query: &query,
        });

        let sentiment = raw
            .overall_sentiment_label
            .as_deref()
            .map(Sentiment::from_label)
            .unwrap_or(classification.sentiment);

        let relevance_score = raw
            .topics
            .iter()
            .filter_map(|t| t.relevance_score.as_deref()?.trim().parse::<f64>().ok())
            .filter(|score| score.is_finite())
            .fold(None, |max: Option<f64>, score| Some(max.map_or(score, |m| m.max(score))))
            .map(|score| score.clamp(0.0, 1.0))
            .unwrap_or(classification.relevance_score);

        Some(NewsItem {
            published_at: normalize_timestamp(raw.time_published.as_deref().unwrap_or_default()),
            url: raw.url.unwrap_or_default(),
            url_to_image: raw.banner_image.filter(|u| !u.is_empty()),
            category: classification.category,
            sentiment,
            relevance_score,
            is_breaking: classification.is_breaking,
            priority: classification.priority,
            title,
            description,
            source,
        })
    }
}

#[async_trait]
impl NewsProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn fetch(&self) -> Result<Vec<NewsItem>> {
        let time_from = (Utc::now() - self.lookback).format("%Y%m%dT%H%M").to_string();
        let limit = self.limit.to_string();
        let url = format!("{}/query", self.base_url);

        debug!(topics = %self.topics, time_from = %time_from, "Requesting Alpha Vantage");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("function", "NEWS_SENTIMENT"),
                ("topics", self.topics.as_str()),
                ("time_from", time_from.as_str()),
                ("limit", limit.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Alpha Vantage rate limited");
            return Err(FeedError::RateLimited(PROVIDER_NAME.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: truncate_body(&body),
            });
        }

        let body: NewsSentimentResponse = response.json().await?;
        let Some(feed) = body.feed else {
            if let Some(note) = body.information.or(body.note) {
                warn!(note = %truncate_body(&note), "Alpha Vantage rate limited");
                return Err(FeedError::RateLimited(PROVIDER_NAME.to_string()));
            }
            if let Some(message) = body.error_message {
                return Err(FeedError::Api {
                    status: status.as_u16(),
                    message,
                });
            }
            return Ok(Vec::new());
        };

        let received = feed.len();
        let items: Vec<NewsItem> = feed
            .into_iter()
            .filter_map(|raw| self.normalize(raw))
            .collect();

        info!(received, normalized = items.len(), "Alpha Vantage articles fetched");
        Ok(items)
    }
}
