//! 클라이언트 명령 처리.
//!
//! 소켓과 무관하게 텍스트 프레임 하나를 응답 메시지 하나로 바꿉니다.
//! 잘못된 입력도 `error` 응답으로 끝나며 연결은 유지됩니다.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use super::messages::{ClientMessage, ServerMessage};
use crate::service::LiveNewsService;

/// 명령 디스패처.
#[derive(Clone)]
pub struct CommandDispatcher {
    service: Arc<LiveNewsService>,
}

impl CommandDispatcher {
    pub fn new(service: Arc<LiveNewsService>) -> Self {
        Self { service }
    }

    /// 텍스트 프레임을 파싱해 처리하고 응답을 반환합니다.
    pub async fn dispatch(&self, text: &str) -> ServerMessage {
        match ClientMessage::parse(text) {
            Ok(message) => self.handle(message).await,
            Err(e) => {
                warn!(error = %e, "Invalid client message");
                ServerMessage::error(e.to_string())
            }
        }
    }

    /// 파싱된 명령을 처리합니다.
    pub async fn handle(&self, message: ClientMessage) -> ServerMessage {
        debug!(command = message.type_name(), "Dispatching client command");

        match message {
            ClientMessage::Ping => ServerMessage::pong(),

            ClientMessage::RequestNews => ServerMessage::NewsResponse {
                news: self.service.latest().await.items.clone(),
                timestamp: Utc::now(),
            },

            // 갱신 결과는 다른 연결에도 news_update로 브로드캐스트됨
            ClientMessage::RefreshNews => match self.service.refresh().await {
                Ok(snapshot) => ServerMessage::NewsRefreshed {
                    news: snapshot.items.clone(),
                    timestamp: Utc::now(),
                },
                Err(e) => {
                    warn!(error = %e, "Manual news refresh failed");
                    ServerMessage::error("Failed to refresh news")
                }
            },

            ClientMessage::RequestBreakingNews => ServerMessage::BreakingNewsResponse {
                news: self.service.breaking().await,
                timestamp: Utc::now(),
            },

            ClientMessage::RequestCategoryNews { category } => {
                let news = self.service.by_category(&category).await;
                ServerMessage::CategoryNewsResponse {
                    category,
                    news,
                    timestamp: Utc::now(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use news_core::{CacheSnapshot, LiveNewsConfig, NewsCategory, NewsItem, Sentiment};
    use news_feed::Fetcher;

    use crate::service::NewsCache;

    fn item(title: &str, category: NewsCategory, is_breaking: bool) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            description: String::new(),
            url: String::new(),
            source: "test".to_string(),
            published_at: "2024-05-01T10:00:00+00:00".to_string(),
            url_to_image: None,
            category,
            sentiment: Sentiment::Neutral,
            relevance_score: 0.5,
            is_breaking,
            priority: 1,
        }
    }

    fn dispatcher(items: Vec<NewsItem>) -> CommandDispatcher {
        let cache = NewsCache::new(CacheSnapshot::new(items, Utc::now()));
        let service = LiveNewsService::with_cache(
            LiveNewsConfig::default(),
            Fetcher::new(Vec::new(), 50),
            cache,
        );
        CommandDispatcher::new(Arc::new(service))
    }

    #[tokio::test]
    async fn test_ping() {
        let d = dispatcher(Vec::new());
        assert!(matches!(d.dispatch(r#"{"type":"ping"}"#).await, ServerMessage::Pong { .. }));
    }

    #[tokio::test]
    async fn test_breaking_filter() {
        let d = dispatcher(vec![
            item("a", NewsCategory::Markets, true),
            item("b", NewsCategory::Markets, false),
        ]);

        match d.dispatch(r#"{"type":"request_breaking_news"}"#).await {
            ServerMessage::BreakingNewsResponse { news, .. } => {
                assert_eq!(news.len(), 1);
                assert_eq!(news[0].title, "a");
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_category_is_empty() {
        let d = dispatcher(vec![item("a", NewsCategory::Markets, false)]);

        match d.dispatch(r#"{"type":"request_category_news","category":"sports"}"#).await {
            ServerMessage::CategoryNewsResponse { category, news, .. } => {
                assert_eq!(category, "sports");
                assert!(news.is_empty());
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_frames() {
        let d = dispatcher(Vec::new());

        assert_eq!(
            d.dispatch("not json").await,
            ServerMessage::error("Invalid JSON format")
        );
        assert_eq!(
            d.dispatch(r#"{"type":"explode"}"#).await,
            ServerMessage::error("Unknown message type: explode")
        );
    }

    #[tokio::test]
    async fn test_refresh_without_providers_returns_cache() {
        let d = dispatcher(vec![item("kept", NewsCategory::Economy, false)]);

        match d.dispatch(r#"{"type":"refresh_news"}"#).await {
            ServerMessage::NewsRefreshed { news, .. } => {
                assert_eq!(news.len(), 1);
                assert_eq!(news[0].title, "kept");
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }
}
