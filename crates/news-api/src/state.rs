//! 애플리케이션 공유 상태.
//!
//! 모든 핸들러가 `Arc<AppState>`로 공유합니다. 전역 싱글턴 없이 `main`에서
//! 한 번 조립되며, 테스트는 각자 독립된 상태를 만듭니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use news_feed::SnapshotStore;
use tokio_util::sync::CancellationToken;

use crate::auth::IdentityResolver;
use crate::service::LiveNewsService;

/// 애플리케이션 상태.
#[derive(Clone)]
pub struct AppState {
    /// 실시간 뉴스 서비스
    pub live_news: Arc<LiveNewsService>,

    /// WebSocket 인증 토큰 검증기
    pub identity: Arc<dyn IdentityResolver>,

    /// 스냅샷 저장소 (Redis, 선택적)
    pub store: Option<Arc<dyn SnapshotStore>>,

    /// 서버 종료 토큰. 취소되면 열린 WebSocket 세션이 정리됩니다
    pub shutdown: CancellationToken,

    /// 서버 시작 시간
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    pub fn new(live_news: Arc<LiveNewsService>, identity: Arc<dyn IdentityResolver>) -> Self {
        Self {
            live_news,
            identity,
            store: None,
            shutdown: CancellationToken::new(),
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 스냅샷 저장소 설정 (헬스 체크용).
    pub fn with_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// 외부에서 만든 종료 토큰을 사용합니다.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    /// 저장소 연결 상태. 저장소가 없으면 `None`.
    pub async fn is_store_healthy(&self) -> Option<bool> {
        let store = self.store.as_ref()?;
        Some(store.health_check().await.unwrap_or(false))
    }
}

/// 테스트용 상태.
///
/// 공급자 없는 수집기, 시드 기사 캐시, 개발용 JWT 시크릿을 사용합니다.
#[cfg(test)]
pub fn create_test_state() -> AppState {
    use news_core::{LiveNewsConfig, DEV_JWT_SECRET};
    use news_feed::Fetcher;

    use crate::auth::JwtIdentityResolver;

    let service = LiveNewsService::new(LiveNewsConfig::default(), Fetcher::new(Vec::new(), 50));
    AppState::new(Arc::new(service), Arc::new(JwtIdentityResolver::new(DEV_JWT_SECRET)))
}
