//! OpenAPI 문서화 설정.
//!
//! utoipa로 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! WebSocket 프로토콜은 OpenAPI로 표현하지 않습니다. [`crate::websocket`] 모듈 문서를 참고하세요.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use news_core::{NewsCategory, NewsItem, Sentiment};

use crate::error::ApiErrorResponse;
use crate::routes::{
    BreakingNewsResponse, CategoryNewsResponse, ComponentHealth, ComponentState, ComponentStatus,
    ControlResponse, HealthResponse, NewsListResponse, OverallStatus,
};
use crate::service::LiveNewsStatus;

/// Live News API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Live News API",
        version = "0.1.0",
        description = r#"
# 실시간 시장 뉴스 API

외부 공급자(News API, Alpha Vantage)에서 주기적으로 수집한 금융 뉴스를
REST와 WebSocket으로 제공합니다.

## WebSocket

- `ws://{host}/ws/live-news` - 익명 접속
- `ws://{host}/ws/live-news/{token}` - JWT 인증 접속
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "live-news", description = "실시간 뉴스 - 조회 및 갱신 루프 제어")
    ),
    components(
        schemas(
            // ===== Health =====
            HealthResponse,
            OverallStatus,
            ComponentHealth,
            ComponentStatus,
            ComponentState,

            // ===== Common =====
            ApiErrorResponse,

            // ===== Live News =====
            NewsItem,
            NewsCategory,
            Sentiment,
            LiveNewsStatus,
            ControlResponse,
            NewsListResponse,
            BreakingNewsResponse,
            CategoryNewsResponse,
        )
    ),
    paths(
        // ===== Health =====
        crate::routes::health::health_check,
        crate::routes::health::health_ready,

        // ===== Live News =====
        crate::routes::live_news::get_status,
        crate::routes::live_news::start_service,
        crate::routes::live_news::stop_service,
        crate::routes::live_news::get_latest,
        crate::routes::live_news::get_breaking,
        crate::routes::live_news::get_by_category,
        crate::routes::live_news::refresh,
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터 생성.
///
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
