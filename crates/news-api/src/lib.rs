//! 실시간 뉴스 REST API 및 WebSocket 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 정기 갱신 루프와 스냅샷 캐시 ([`service`])
//! - 실시간 브로드캐스트용 WebSocket 서버
//! - 조회/제어용 REST API
//! - JWT 기반 WebSocket 인증
//! - Prometheus 메트릭
//!
//! 바이너리(`src/main.rs`)는 이 크레이트의 라우터와 [`LiveNewsService`]를 조립만 합니다.
//! 통합 테스트도 같은 공개 API로 서비스와 라우터를 구성합니다.

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod service;
pub mod state;
pub mod websocket;

pub use auth::{IdentityResolver, JwtIdentityResolver, UserIdentity};
pub use error::{ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use routes::create_api_router;
pub use service::{ClientHandle, ConnectionRegistry, LiveNewsService, NewsCache};
pub use state::AppState;
pub use websocket::{websocket_router, ClientMessage, CommandDispatcher, ServerMessage, WsError};
