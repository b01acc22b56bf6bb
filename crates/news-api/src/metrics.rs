//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 뉴스 브로드캐스트 메트릭을 수집하고
//! `/metrics` 엔드포인트로 노출합니다. 수집 관련 카운터
//! (`news_fetch_total`, `news_provider_errors_total`)는 `news-feed`에서 기록합니다.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

/// HTTP 지연 히스토그램 버킷 (초).
const LATENCY_BUCKETS: &[f64] = &[0.001, 0.005, 0.025, 0.1, 0.25, 1.0, 5.0, 30.0];

/// 전역 Prometheus 레코더를 설치합니다. 프로세스당 한 번만 호출해야 하며,
/// 두 번째 호출은 패닉합니다.
pub fn setup_metrics_recorder() -> PrometheusHandle {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )
        .expect("invalid latency buckets")
        .install_recorder()
        .expect("metrics recorder already installed")
}

/// 요청 하나의 관측 결과.
#[derive(Debug, Clone)]
pub struct HttpObservation {
    pub method: String,
    /// 정규화된 경로 (라벨용)
    pub path: String,
    pub status: u16,
    pub elapsed_secs: f64,
}

impl HttpObservation {
    /// 요청/응답 카운터와 지연 히스토그램에 기록합니다.
    pub fn record(&self) {
        let method = self.method.clone();
        let path = self.path.clone();

        counter!("http_requests_total", "method" => method.clone(), "path" => path.clone())
            .increment(1);
        counter!(
            "http_responses_total",
            "method" => method.clone(),
            "path" => path.clone(),
            "status" => self.status.to_string()
        )
        .increment(1);
        histogram!("http_request_duration_seconds", "method" => method, "path" => path)
            .record(self.elapsed_secs);
    }
}

/// 활성 WebSocket 연결 수 설정.
pub fn set_websocket_connections(count: usize) {
    gauge!("websocket_connections_active").set(count as f64);
}

/// 송신 실패로 제거된 연결 수 증가.
pub fn record_evictions(count: usize) {
    if count > 0 {
        counter!("websocket_evictions_total").increment(count as u64);
    }
}

/// 브로드캐스트 카운터 증가.
pub fn record_broadcast(message_type: &str) {
    counter!("news_broadcast_total", "type" => message_type.to_string()).increment(1);
}

/// 캐시된 기사 수 설정.
pub fn set_cache_items(count: usize) {
    gauge!("news_cache_items").set(count as f64);
}

/// 라우트 매칭 정보가 없을 때 쓰는 경로 라벨.
///
/// 카테고리 값, WebSocket 토큰, 숫자 세그먼트를 자리표시자로 바꿉니다.
/// `/ws/live-news/eyJhbGciOi...` → `/ws/live-news/{token}`
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    let normalized: Vec<String> = segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let previous = i.checked_sub(1).map(|p| segments[p]);
            let is_numeric = !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit());

            match previous {
                Some("category") if !segment.is_empty() => "{category}".to_string(),
                Some("live-news") if i == 3 && segments.get(1) == Some(&"ws") => {
                    "{token}".to_string()
                }
                _ if is_numeric => ":id".to_string(),
                _ => (*segment).to_string(),
            }
        })
        .collect();
    normalized.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_category() {
        assert_eq!(
            normalize_path("/api/v1/live-news/category/crypto"),
            "/api/v1/live-news/category/{category}"
        );
    }

    #[test]
    fn test_normalize_path_ws_token() {
        assert_eq!(normalize_path("/ws/live-news/abc.def.ghi"), "/ws/live-news/{token}");
        assert_eq!(normalize_path("/ws/live-news"), "/ws/live-news");
    }

    #[test]
    fn test_normalize_path_no_params() {
        assert_eq!(normalize_path("/api/v1/live-news/status"), "/api/v1/live-news/status");
    }

    #[test]
    fn test_normalize_path_numeric() {
        assert_eq!(normalize_path("/api/v1/items/12345"), "/api/v1/items/:id");
    }
}
