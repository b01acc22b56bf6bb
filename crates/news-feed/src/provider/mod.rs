//! 외부 뉴스 공급자.
//!
//! 각 공급자는 자체 원본 응답 형식을 모듈 내부 DTO로 파싱한 뒤
//! [`NewsItem`]으로 정규화해서 반환합니다. 원본 DTO는 모듈 밖으로 노출되지 않습니다.
//!
//! # 지원 공급자
//!
//! - [`NewsApiProvider`]: `newsapi.org` `/v2/everything`
//! - [`AlphaVantageProvider`]: Alpha Vantage `NEWS_SENTIMENT`

pub mod alpha_vantage;
pub mod news_api;

use async_trait::async_trait;
use news_core::NewsItem;
use std::time::Duration;

use crate::error::Result;

pub use alpha_vantage::AlphaVantageProvider;
pub use news_api::NewsApiProvider;

/// 뉴스 공급자.
///
/// 한 번의 호출로 최근 기사 목록을 가져옵니다. 실패는 공급자 단위로
/// 격리되어, 다른 공급자의 결과에 영향을 주지 않습니다.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// 로그/메트릭 라벨로 사용할 공급자 이름.
    fn name(&self) -> &str;

    /// 최근 기사를 수집합니다.
    async fn fetch(&self) -> Result<Vec<NewsItem>>;
}

/// 공급자 공용 HTTP 클라이언트를 생성합니다.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("news-feed/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// 에러 로그에 넣을 응답 본문을 적당한 길이로 자릅니다.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
