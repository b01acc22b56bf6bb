//! REST API 라우트.
//!
//! # 사용 가능한 엔드포인트
//!
//! ## 헬스 체크
//! - `GET /health` - 간단한 헬스 체크 (liveness)
//! - `GET /health/ready` - 상세 헬스 체크 (readiness)
//!
//! ## 실시간 뉴스
//! - `/api/v1/live-news/*` - 상태, 시작/중지, 조회, 즉시 갱신

pub mod health;
pub mod live_news;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub use health::{
    health_router, ComponentHealth, ComponentState, ComponentStatus, HealthResponse, OverallStatus,
};
pub use live_news::{
    live_news_router, BreakingNewsResponse, CategoryNewsResponse, ControlResponse,
    NewsListResponse,
};

/// REST API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api/v1/live-news", live_news_router())
}
