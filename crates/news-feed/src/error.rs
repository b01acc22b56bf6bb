//! 피드 모듈 오류 타입.

use news_core::NewsError;
use thiserror::Error;

/// 뉴스 수집/저장 관련 오류.
#[derive(Debug, Error)]
pub enum FeedError {
    /// 네트워크 오류 (연결 실패, 타임아웃)
    #[error("Network error: {0}")]
    Network(String),

    /// 공급자 요청 한도 초과
    #[error("Rate limited by {0}")]
    RateLimited(String),

    /// 공급자가 오류 상태를 반환
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// 응답 파싱 오류
    #[error("Parse error: {0}")]
    Parse(String),

    /// 설정 누락 (API 키 등)
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// 캐시 저장소 오류
    #[error("Cache error: {0}")]
    Cache(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FeedError::Parse(err.to_string())
        } else {
            FeedError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Parse(err.to_string())
    }
}

impl From<redis::RedisError> for FeedError {
    fn from(err: redis::RedisError) -> Self {
        FeedError::Cache(err.to_string())
    }
}

impl From<FeedError> for NewsError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::Network(msg) => NewsError::Network(msg),
            FeedError::RateLimited(provider) => NewsError::RateLimited(provider),
            FeedError::Api { .. } => NewsError::Provider(err.to_string()),
            FeedError::Parse(msg) => NewsError::Serialization(msg),
            FeedError::NotConfigured(msg) => NewsError::Config(msg),
            FeedError::Cache(msg) => NewsError::Store(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
