//! News API 클라이언트.
//!
//! `GET {base}/v2/everything`로 최근 금융 기사를 조회합니다.
//!
//! # 요청 파라미터
//!
//! - `q`: 검색어 (기본 `stock market OR trading OR finance OR economy`)
//! - `language=en`, `sortBy=publishedAt`
//! - `pageSize`: 요청당 기사 수
//! - `from`: 조회 시작일 (`YYYY-MM-DD`, 현재 - lookback)
//! - `apiKey`
//!
//! 429 응답은 [`FeedError::RateLimited`]로 매핑됩니다.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use news_core::{normalize_timestamp, NewsItem, ProvidersConfig};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{http_client, truncate_body, NewsProvider};
use crate::classifier::{ArticleClassifier, ArticleText, KeywordClassifier};
use crate::error::{FeedError, Result};

const PROVIDER_NAME: &str = "news_api";

/// News API가 삭제된 기사 자리에 넣는 제목.
const REMOVED_TITLE: &str = "[Removed]";

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    source: Option<RawSource>,
    published_at: Option<String>,
    url_to_image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
    name: Option<String>,
}

/// News API 공급자.
#[derive(Clone)]
pub struct NewsApiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    query: String,
    page_size: u32,
    lookback: Duration,
    classifier: Arc<dyn ArticleClassifier>,
}

impl NewsApiProvider {
    /// 기본 설정으로 공급자를 생성합니다.
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        let defaults = ProvidersConfig::default();
        Self {
            client,
            api_key: api_key.into(),
            base_url: defaults.news_api_base_url,
            query: defaults.news_api_query,
            page_size: defaults.page_size,
            lookback: Duration::hours(defaults.lookback_hours),
            classifier: Arc::new(KeywordClassifier::default()),
        }
    }

    /// 설정에서 공급자를 생성합니다. API 키가 없으면 `None`.
    pub fn from_config(config: &ProvidersConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.news_api_key.clone() else {
            return Ok(None);
        };

        let client = http_client(config.request_timeout())?;
        Ok(Some(
            Self::new(client, api_key)
                .with_base_url(&config.news_api_base_url)
                .with_query(&config.news_api_query)
                .with_page_size(config.page_size)
                .with_lookback(Duration::hours(config.lookback_hours)),
        ))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = query.to_string();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
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

    /// 원본 기사를 정규화합니다. 제목이 없거나 삭제된 기사는 버립니다.
    fn normalize(&self, raw: RawArticle) -> Option<NewsItem> {
        let title = raw.title.map(|t| t.trim().to_string())?;
        if title.is_empty() || title == REMOVED_TITLE {
            return None;
        }

        let description = raw.description.unwrap_or_default();
        let source = raw.source.and_then(|s| s.name).unwrap_or_default();
        let classification = self.classifier.classify(&ArticleText {
            title: &title,
            description: &description,
            source: &source,
            query: &self.query,
        });

        Some(NewsItem {
            published_at: normalize_timestamp(raw.published_at.as_deref().unwrap_or_default()),
            url: raw.url.unwrap_or_default(),
            url_to_image: raw.url_to_image,
            category: classification.category,
            sentiment: classification.sentiment,
            relevance_score: classification.relevance_score,
            is_breaking: classification.is_breaking,
            priority: classification.priority,
            title,
            description,
            source,
        })
    }
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn fetch(&self) -> Result<Vec<NewsItem>> {
        let from = (Utc::now() - self.lookback).format("%Y-%m-%d").to_string();
        let page_size = self.page_size.to_string();
        let url = format!("{}/v2/everything", self.base_url);

        debug!(query = %self.query, from = %from, "Requesting News API");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", self.query.as_str()),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("from", from.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("News API rate limited");
            return Err(FeedError::RateLimited(PROVIDER_NAME.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: truncate_body(&body),
            });
        }

        let body: EverythingResponse = response.json().await?;
        if body.status.as_deref() == Some("error") {
            return Err(FeedError::Api {
                status: status.as_u16(),
                message: body.message.unwrap_or_default(),
            });
        }

        let received = body.articles.len();
        let items: Vec<NewsItem> = body
            .articles
            .into_iter()
            .filter_map(|raw| self.normalize(raw))
            .collect();

        info!(received, normalized = items.len(), "News API articles fetched");
        Ok(items)
    }
}
