//! 헬스 체크 endpoint.
//!
//! - `GET /health`: liveness. 프로세스가 응답하면 200
//! - `GET /health/ready`: readiness. 갱신 루프와 스냅샷 저장소 상태 포함

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// 전체 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Healthy,
    /// 선택 컴포넌트 장애. 뉴스 제공은 계속됨
    Degraded,
}

/// 컴포넌트 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComponentState {
    Up,
    Down,
    NotConfigured,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    pub state: ComponentState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ComponentStatus {
    fn new(state: ComponentState, detail: Option<String>) -> Self {
        Self { state, detail }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    /// 갱신 루프와 캐시
    pub live_news: ComponentStatus,
    /// 스냅샷 저장소 (Redis)
    pub snapshot_store: ComponentStatus,
}

/// readiness 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: OverallStatus,
    pub version: String,
    pub uptime_secs: i64,
    pub timestamp: DateTime<Utc>,
    pub components: ComponentHealth,
}

/// Liveness 체크.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "서버 응답 가능", body = String))
)]
pub async fn health_check() -> &'static str {
    "OK"
}

/// Readiness 체크.
///
/// 저장소가 없어도 메모리 캐시로 동작하므로 저장소 장애는 `degraded`이고
/// 상태 코드는 항상 200입니다.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses((status = 200, description = "컴포넌트 상태", body = HealthResponse))
)]
pub async fn health_ready(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let live = state.live_news.status().await;
    let live_news = ComponentStatus::new(
        ComponentState::Up,
        Some(format!(
            "loop {}, {} connections, {} items cached",
            live.status, live.active_connections, live.news_count
        )),
    );

    let snapshot_store = match state.is_store_healthy().await {
        Some(true) => ComponentStatus::new(ComponentState::Up, None),
        Some(false) => ComponentStatus::new(ComponentState::Down, Some("unreachable".to_string())),
        None => ComponentStatus::new(ComponentState::NotConfigured, None),
    };

    let status = if snapshot_store.state == ComponentState::Down {
        OverallStatus::Degraded
    } else {
        OverallStatus::Healthy
    };

    Json(HealthResponse {
        status,
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: Utc::now(),
        components: ComponentHealth {
            live_news,
            snapshot_store,
        },
    })
}

pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}
