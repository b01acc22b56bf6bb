//! 실시간 뉴스 API 서버.
//!
//! 설정을 로드하고 수집기, 캐시, 갱신 루프를 조립한 뒤
//! REST API와 WebSocket 엔드포인트를 제공합니다.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use news_api::metrics::setup_metrics_recorder;
use news_api::middleware::metrics_layer;
use news_api::openapi::swagger_ui_router;
use news_api::routes::create_api_router;
use news_api::state::AppState;
use news_api::websocket::websocket_router;
use news_api::{JwtIdentityResolver, LiveNewsService};
use news_core::{init_logging, AppConfig, LogConfig};
use news_feed::{Fetcher, RedisSnapshotStore, SnapshotStore};

/// 쉼표로 구분된 origin 목록을 파싱합니다. 잘못된 항목은 건너뜁니다.
fn parse_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect()
}

/// `CORS_ORIGINS` 기반 CORS 레이어. 목록이 비어 있으면 모든 origin을 허용합니다.
fn cors_layer() -> CorsLayer {
    let origins = parse_origins(&std::env::var("CORS_ORIGINS").unwrap_or_default());

    // 와일드카드 origin은 credentials와 함께 쓸 수 없음
    let layer = if origins.is_empty() {
        warn!("CORS_ORIGINS is empty, any origin is allowed");
        CorsLayer::new().allow_origin(AllowOrigin::any())
    } else {
        info!(origins = origins.len(), "CORS origins restricted");
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    };

    layer
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(60 * 60))
}

/// Prometheus 텍스트 포맷 출력.
async fn render_metrics(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics = Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(metrics_handle);

    let api_router = create_api_router().with_state(Arc::clone(&state));

    // WebSocket 세션은 오래 유지되므로 타임아웃 레이어 밖에 둠
    let ws_router = Router::new()
        .nest("/ws", websocket_router())
        .with_state(state);

    let http_router = Router::new()
        .merge(metrics)
        .merge(api_router)
        .merge(swagger_ui_router())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ));

    Router::new()
        .merge(http_router)
        .merge(ws_router)
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

/// 스냅샷 저장소 연결. URL이 없거나 연결에 실패하면 저장소 없이 동작합니다.
async fn connect_store(config: &AppConfig) -> Option<Arc<dyn SnapshotStore>> {
    config.redis.url.as_ref()?;

    match RedisSnapshotStore::from_config(&config.redis).await {
        Ok(store) => {
            info!(ttl_secs = store.ttl_secs(), "Snapshot store connected");
            Some(Arc::new(store))
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect snapshot store, continuing without persistence");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    let config = AppConfig::load()?;

    init_logging(LogConfig::from_settings(&config.logging))?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting live news server");

    let metrics_handle = setup_metrics_recorder();

    if config.uses_dev_jwt_secret() {
        warn!("auth.jwt_secret is the development default, authenticated sockets are not secure");
    }

    let fetcher = Fetcher::from_config(&config.providers, config.live_news.max_items)?;
    let provider_names = fetcher.provider_names();
    if provider_names.is_empty() {
        warn!("No news providers configured, serving seed articles only");
    }

    let store = connect_store(&config).await;

    let mut service = LiveNewsService::new(config.live_news.clone(), fetcher);
    if let Some(store) = &store {
        service = service.with_store(Arc::clone(store));
    }
    service.restore_from_store().await;
    let service = Arc::new(service);

    let shutdown_token = CancellationToken::new();

    let mut state = AppState::new(
        Arc::clone(&service),
        Arc::new(JwtIdentityResolver::new(config.auth.jwt_secret.clone())),
    )
    .with_shutdown(shutdown_token.clone());
    if let Some(store) = store {
        state = state.with_store(store);
    }
    let state = Arc::new(state);

    info!(
        version = %state.version,
        providers = ?provider_names,
        has_store = state.store.is_some(),
        interval_secs = config.live_news.update_interval_secs,
        "Application state initialized"
    );

    let app = create_router(state, metrics_handle);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        error!(addr = %addr, error = %e, "소켓 바인딩 실패. API_HOST, API_PORT 환경변수를 확인하세요.");
        e
    })?;

    info!(
        %addr,
        docs = "/swagger-ui",
        metrics = "/metrics",
        websocket = "/ws/live-news",
        "Listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    info!("HTTP server drained, stopping live news loop");
    shutdown_token.cancel();

    // 갱신 루프 종료 대기 (최대 10초)
    if tokio::time::timeout(Duration::from_secs(10), service.stop()).await.is_err() {
        warn!("Live news loop did not stop in time, forcing shutdown");
    }

    info!("Shutdown complete");
    Ok(())
}

/// Ctrl+C 또는 SIGTERM을 기다린 뒤 종료 토큰을 취소합니다.
///
/// 토큰 취소로 열린 WebSocket 세션의 reader가 끝나므로 graceful shutdown이 막히지 않습니다.
async fn shutdown_signal(shutdown: CancellationToken) {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation failed");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    };

    warn!(signal, "Shutdown requested");
    shutdown.cancel();
}
