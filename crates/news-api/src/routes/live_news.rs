//! 실시간 뉴스 REST endpoint.
//!
//! WebSocket을 쓰지 않는 클라이언트를 위한 조회/제어 API입니다.
//!
//! # 엔드포인트
//!
//! - `GET /api/v1/live-news/status` - 서비스 상태
//! - `POST /api/v1/live-news/start` - 갱신 루프 시작
//! - `POST /api/v1/live-news/stop` - 갱신 루프 중지
//! - `GET /api/v1/live-news/latest` - 현재 캐시
//! - `GET /api/v1/live-news/breaking` - 속보
//! - `GET /api/v1/live-news/category/{category}` - 카테고리별 기사
//! - `POST /api/v1/live-news/refresh` - 즉시 수집

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, State},
    http::{Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use news_core::{NewsCategory, NewsItem};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::error::{news_error_response, ApiErrorResponse, ApiResult};
use crate::service::LiveNewsStatus;
use crate::state::AppState;

// ==================== 응답 타입 ====================

/// 시작/중지 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ControlResponse {
    pub message: String,
    /// "running" | "stopped"
    pub status: String,
}

/// 기사 목록 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewsListResponse {
    pub news: Vec<NewsItem>,
    pub count: usize,
    pub last_update: DateTime<Utc>,
}

/// 속보 목록 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BreakingNewsResponse {
    pub breaking_news: Vec<NewsItem>,
    pub count: usize,
    pub last_update: DateTime<Utc>,
}

/// 카테고리별 기사 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryNewsResponse {
    pub category: String,
    pub news: Vec<NewsItem>,
    pub count: usize,
    pub last_update: DateTime<Utc>,
}

// ==================== 핸들러 ====================

/// 서비스 상태 조회.
#[utoipa::path(
    get,
    path = "/api/v1/live-news/status",
    tag = "live-news",
    responses(
        (status = 200, description = "서비스 상태", body = LiveNewsStatus)
    )
)]
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<LiveNewsStatus> {
    Json(state.live_news.status().await)
}

/// 갱신 루프 시작 (이미 실행 중이면 무시).
#[utoipa::path(
    post,
    path = "/api/v1/live-news/start",
    tag = "live-news",
    responses(
        (status = 200, description = "루프 실행 중", body = ControlResponse)
    )
)]
pub async fn start_service(State(state): State<Arc<AppState>>) -> Json<ControlResponse> {
    let started = state.live_news.start().await;
    info!(started, "Live news start requested");

    Json(ControlResponse {
        message: "Live news service started".to_string(),
        status: "running".to_string(),
    })
}

/// 갱신 루프 중지.
#[utoipa::path(
    post,
    path = "/api/v1/live-news/stop",
    tag = "live-news",
    responses(
        (status = 200, description = "루프 중지됨", body = ControlResponse)
    )
)]
pub async fn stop_service(State(state): State<Arc<AppState>>) -> Json<ControlResponse> {
    let stopped = state.live_news.stop().await;
    info!(stopped, "Live news stop requested");

    Json(ControlResponse {
        message: "Live news service stopped".to_string(),
        status: "stopped".to_string(),
    })
}

/// 현재 캐시 조회.
#[utoipa::path(
    get,
    path = "/api/v1/live-news/latest",
    tag = "live-news",
    responses(
        (status = 200, description = "캐시된 기사", body = NewsListResponse)
    )
)]
pub async fn get_latest(State(state): State<Arc<AppState>>) -> Json<NewsListResponse> {
    let snapshot = state.live_news.latest().await;

    Json(NewsListResponse {
        count: snapshot.len(),
        news: snapshot.items.clone(),
        last_update: snapshot.last_update,
    })
}

/// 속보 조회.
#[utoipa::path(
    get,
    path = "/api/v1/live-news/breaking",
    tag = "live-news",
    responses(
        (status = 200, description = "속보 기사", body = BreakingNewsResponse)
    )
)]
pub async fn get_breaking(State(state): State<Arc<AppState>>) -> Json<BreakingNewsResponse> {
    let snapshot = state.live_news.latest().await;
    let breaking_news = snapshot.breaking();

    Json(BreakingNewsResponse {
        count: breaking_news.len(),
        breaking_news,
        last_update: snapshot.last_update,
    })
}

/// 카테고리별 기사 조회.
#[utoipa::path(
    get,
    path = "/api/v1/live-news/category/{category}",
    tag = "live-news",
    params(
        ("category" = String, Path, description = "카테고리 (markets, economy, business, technology, crypto, commodities, general)")
    ),
    responses(
        (status = 200, description = "카테고리 기사", body = CategoryNewsResponse),
        (status = 400, description = "알 수 없는 카테고리", body = ApiErrorResponse)
    )
)]
pub async fn get_by_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<CategoryNewsResponse>> {
    let category = NewsCategory::from_str(&category).map_err(|message| {
        let allowed: Vec<&str> = NewsCategory::ALL.iter().map(|c| c.as_str()).collect();
        ApiErrorResponse::new("INVALID_CATEGORY", message)
            .with_details(serde_json::json!({ "allowed": allowed }))
            .with_request_info(&method, &uri)
            .into_error(StatusCode::BAD_REQUEST)
    })?;

    let snapshot = state.live_news.latest().await;
    let news = snapshot.by_category(category.as_str());

    Ok(Json(CategoryNewsResponse {
        category: category.as_str().to_string(),
        count: news.len(),
        news,
        last_update: snapshot.last_update,
    }))
}

/// 즉시 수집.
///
/// 결과가 있으면 캐시를 교체하고 WebSocket 클라이언트에 브로드캐스트합니다.
/// 수집 결과가 비어 있으면 기존 캐시를 그대로 반환합니다.
#[utoipa::path(
    post,
    path = "/api/v1/live-news/refresh",
    tag = "live-news",
    responses(
        (status = 200, description = "갱신 후 캐시", body = NewsListResponse),
        (status = 500, description = "갱신 실패", body = ApiErrorResponse)
    )
)]
pub async fn refresh(State(state): State<Arc<AppState>>) -> ApiResult<Json<NewsListResponse>> {
    let snapshot = state
        .live_news
        .refresh()
        .await
        .map_err(|e| news_error_response(&e))?;

    Ok(Json(NewsListResponse {
        count: snapshot.len(),
        news: snapshot.items.clone(),
        last_update: snapshot.last_update,
    }))
}

/// 실시간 뉴스 라우터 생성.
pub fn live_news_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", get(get_status))
        .route("/start", post(start_service))
        .route("/stop", post(stop_service))
        .route("/latest", get(get_latest))
        .route("/breaking", get(get_breaking))
        .route("/category/{category}", get(get_by_category))
        .route("/refresh", post(refresh))
}
