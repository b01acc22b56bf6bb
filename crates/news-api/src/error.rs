//! REST API 에러 응답 타입.
//!
//! 모든 REST 엔드포인트는 실패 시 같은 형식의 JSON 본문을 반환합니다.
//!
//! ```json
//! {
//!   "code": "INVALID_CATEGORY",
//!   "message": "Unknown news category: sports",
//!   "details": {"allowed": ["markets", "economy", ...]},
//!   "timestamp": 1738300800,
//!   "method": "GET",
//!   "path": "/api/v1/live-news/category/sports"
//! }
//! ```

use std::fmt;

use axum::http::{Method, StatusCode, Uri};
use axum::Json;
use chrono::Utc;
use news_core::NewsError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// API 에러 본문.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 기계가 읽는 에러 코드 (예: "INVALID_CATEGORY")
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Unix timestamp (초)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(Utc::now().timestamp()),
            method: None,
            path: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// 요청 메서드와 경로를 붙입니다.
    #[must_use]
    pub fn with_request_info(mut self, method: &Method, uri: &Uri) -> Self {
        self.method = Some(method.as_str().to_owned());
        self.path = Some(uri.path().to_owned());
        self
    }

    /// 상태 코드와 함께 핸들러 에러로 변환합니다.
    pub fn into_error(self, status: StatusCode) -> (StatusCode, Json<ApiErrorResponse>) {
        (status, Json(self))
    }
}

impl fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// 핸들러 반환 타입.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 서비스 에러의 HTTP 상태 코드와 에러 코드.
fn classify(error: &NewsError) -> (StatusCode, &'static str) {
    match error {
        NewsError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        NewsError::Auth(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        NewsError::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
        NewsError::Provider(_) | NewsError::Network(_) => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
        NewsError::Store(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORE_ERROR"),
        NewsError::Config(_) | NewsError::Serialization(_) | NewsError::Internal(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    }
}

/// 서비스 에러를 핸들러 에러로 변환합니다.
pub fn news_error_response(error: &NewsError) -> (StatusCode, Json<ApiErrorResponse>) {
    let (status, code) = classify(error);
    ApiErrorResponse::new(code, error.to_string()).into_error(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_are_omitted() {
        let mut error = ApiErrorResponse::new("NOT_FOUND", "missing");
        error.timestamp = None;
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json, serde_json::json!({"code": "NOT_FOUND", "message": "missing"}));
        assert_eq!(error.to_string(), "NOT_FOUND: missing");
    }

    #[test]
    fn test_details_and_request_info() {
        let uri: Uri = "/api/v1/live-news/category/sports?x=1".parse().unwrap();
        let error = ApiErrorResponse::new("INVALID_CATEGORY", "Unknown news category: sports")
            .with_details(serde_json::json!({"allowed": ["markets"]}))
            .with_request_info(&Method::GET, &uri);

        assert_eq!(error.method.as_deref(), Some("GET"));
        assert_eq!(error.path.as_deref(), Some("/api/v1/live-news/category/sports"));
        assert_eq!(error.details.unwrap()["allowed"][0], "markets");
        assert!(error.timestamp.is_some());
    }

    #[test]
    fn test_news_error_mapping() {
        let cases = [
            (NewsError::InvalidInput("x".into()), StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            (NewsError::RateLimited("news_api".into()), StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
            (NewsError::Store("redis".into()), StatusCode::SERVICE_UNAVAILABLE, "STORE_ERROR"),
            (NewsError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ];

        for (error, expected_status, expected_code) in cases {
            let (status, Json(body)) = news_error_response(&error);
            assert_eq!(status, expected_status);
            assert_eq!(body.code, expected_code);
        }
    }
}
