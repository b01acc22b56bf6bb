//! HTTP 요청 metrics middleware.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

use crate::metrics::{normalize_path, HttpObservation};

/// 요청 수, 응답 상태, 처리 시간을 기록합니다.
///
/// 경로 라벨은 매칭된 라우트 템플릿을 우선 사용합니다.
/// WebSocket 업그레이드는 101 응답까지만 측정됩니다.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().as_str().to_owned();
    let path = match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => normalize_path(request.uri().path()),
    };

    let response = next.run(request).await;

    HttpObservation {
        method,
        path,
        status: response.status().as_u16(),
        elapsed_secs: started.elapsed().as_secs_f64(),
    }
    .record();

    response
}
