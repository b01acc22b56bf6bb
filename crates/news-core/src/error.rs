//! 뉴스 서비스의 에러 타입.
//!
//! 이 모듈은 서비스 전반에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 뉴스 서비스 에러.
#[derive(Debug, Error)]
pub enum NewsError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 뉴스 공급자 에러
    #[error("공급자 에러: {0}")]
    Provider(String),

    /// 요청 한도 초과
    #[error("요청 한도 초과: {0}")]
    RateLimited(String),

    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 스냅샷 저장소 에러
    #[error("저장소 에러: {0}")]
    Store(String),

    /// 인증 에러
    #[error("인증 에러: {0}")]
    Auth(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 뉴스 서비스 작업을 위한 Result 타입.
pub type NewsResult<T> = Result<T, NewsError>;

impl NewsError {
    /// 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NewsError::Network(_) | NewsError::RateLimited(_) | NewsError::Store(_)
        )
    }
}

impl From<serde_json::Error> for NewsError {
    fn from(err: serde_json::Error) -> Self {
        NewsError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for NewsError {
    fn from(err: config::ConfigError) -> Self {
        NewsError::Config(err.to_string())
    }
}
