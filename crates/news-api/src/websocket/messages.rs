//! WebSocket 메시지 타입.
//!
//! 클라이언트-서버 간 교환되는 JSON 텍스트 프레임 정의.
//! 모든 메시지는 `type` 필드로 구분됩니다.

use chrono::{DateTime, Utc};
use news_core::NewsItem;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::UserIdentity;

/// 카테고리 요청에 `category`가 없을 때 사용하는 기본값.
pub const DEFAULT_CATEGORY: &str = "business";

/// 클라이언트가 보낼 수 있는 메시지 타입.
const CLIENT_MESSAGE_TYPES: [&str; 5] = [
    "ping",
    "request_news",
    "refresh_news",
    "request_breaking_news",
    "request_category_news",
];

/// WebSocket 에러.
///
/// `InvalidMessage`와 `UnknownMessageType`의 메시지는 그대로 `error` 프레임에 실립니다.
#[derive(Debug, thiserror::Error)]
pub enum WsError {
    #[error("{0}")]
    InvalidMessage(String),
    #[error("Unknown message type: {0}")]
    UnknownMessageType(String),
    #[error("직렬화 실패: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ==================== 클라이언트 → 서버 메시지 ====================

/// 클라이언트에서 서버로 보내는 메시지.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// 핑 (연결 유지)
    Ping,
    /// 현재 캐시 요청
    RequestNews,
    /// 즉시 수집 요청
    RefreshNews,
    /// 속보 요청
    RequestBreakingNews,
    /// 카테고리별 기사 요청
    RequestCategoryNews {
        #[serde(default = "default_category")]
        category: String,
    },
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl ClientMessage {
    /// JSON 텍스트 프레임을 파싱합니다.
    ///
    /// - JSON이 아니면 `InvalidMessage("Invalid JSON format")`
    /// - `type`이 알려지지 않은 값이면 `UnknownMessageType`
    pub fn parse(text: &str) -> Result<Self, WsError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|_| WsError::InvalidMessage("Invalid JSON format".to_string()))?;

        let message_type = match value.get("type") {
            Some(Value::String(t)) => t.clone(),
            Some(other) => return Err(WsError::UnknownMessageType(other.to_string())),
            None => return Err(WsError::InvalidMessage("Missing message type".to_string())),
        };

        if !CLIENT_MESSAGE_TYPES.contains(&message_type.as_str()) {
            return Err(WsError::UnknownMessageType(message_type));
        }

        serde_json::from_value(value).map_err(|e| WsError::InvalidMessage(e.to_string()))
    }

    /// 메시지 타입 이름 (로그용).
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::RequestNews => "request_news",
            Self::RefreshNews => "refresh_news",
            Self::RequestBreakingNews => "request_breaking_news",
            Self::RequestCategoryNews { .. } => "request_category_news",
        }
    }
}

// ==================== 서버 → 클라이언트 메시지 ====================

/// 서버에서 클라이언트로 보내는 메시지.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// 접속 확인
    ConnectionStatus {
        status: String,
        message: String,
        /// 인증 엔드포인트에서만 포함
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user: Option<UserIdentity>,
    },
    /// 접속 직후 캐시 스냅샷
    InitialNews {
        timestamp: DateTime<Utc>,
        news: Vec<NewsItem>,
        last_update: DateTime<Utc>,
    },
    /// 정기/수동 갱신 브로드캐스트
    NewsUpdate {
        timestamp: DateTime<Utc>,
        /// 갱신된 전체 기사 수
        count: usize,
        breaking_news: Vec<NewsItem>,
        latest_news: Vec<NewsItem>,
    },
    NewsResponse {
        news: Vec<NewsItem>,
        timestamp: DateTime<Utc>,
    },
    NewsRefreshed {
        news: Vec<NewsItem>,
        timestamp: DateTime<Utc>,
    },
    BreakingNewsResponse {
        news: Vec<NewsItem>,
        timestamp: DateTime<Utc>,
    },
    CategoryNewsResponse {
        category: String,
        news: Vec<NewsItem>,
        timestamp: DateTime<Utc>,
    },
    Error {
        message: String,
    },
    Pong {
        timestamp: DateTime<Utc>,
    },
}

impl ServerMessage {
    /// 익명 접속 확인 메시지.
    pub fn connected() -> Self {
        Self::ConnectionStatus {
            status: "connected".to_string(),
            message: "Connected to live news service".to_string(),
            user: None,
        }
    }

    /// 인증 접속 확인 메시지.
    pub fn connected_as(user: UserIdentity) -> Self {
        Self::ConnectionStatus {
            status: "connected".to_string(),
            message: format!("Connected as {}", user.username),
            user: Some(user),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn pong() -> Self {
        Self::Pong {
            timestamp: Utc::now(),
        }
    }

    /// 메시지 타입 이름 (메트릭 라벨용).
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::ConnectionStatus { .. } => "connection_status",
            Self::InitialNews { .. } => "initial_news",
            Self::NewsUpdate { .. } => "news_update",
            Self::NewsResponse { .. } => "news_response",
            Self::NewsRefreshed { .. } => "news_refreshed",
            Self::BreakingNewsResponse { .. } => "breaking_news_response",
            Self::CategoryNewsResponse { .. } => "category_news_response",
            Self::Error { .. } => "error",
            Self::Pong { .. } => "pong",
        }
    }

    /// JSON 문자열로 직렬화.
    pub fn to_json(&self) -> Result<String, WsError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_messages() {
        assert_eq!(ClientMessage::parse(r#"{"type":"ping"}"#).unwrap(), ClientMessage::Ping);
        assert_eq!(
            ClientMessage::parse(r#"{"type":"refresh_news","extra":1}"#).unwrap(),
            ClientMessage::RefreshNews
        );
        assert_eq!(
            ClientMessage::parse(r#"{"type":"request_category_news","category":"crypto"}"#)
                .unwrap(),
            ClientMessage::RequestCategoryNews {
                category: "crypto".to_string()
            }
        );
    }

    #[test]
    fn test_category_defaults_to_business() {
        let msg = ClientMessage::parse(r#"{"type":"request_category_news"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::RequestCategoryNews {
                category: "business".to_string()
            }
        );
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = ClientMessage::parse("{not json").unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON format");
    }

    #[test]
    fn test_parse_unknown_type() {
        let err = ClientMessage::parse(r#"{"type":"subscribe"}"#).unwrap_err();
        assert!(matches!(err, WsError::UnknownMessageType(ref t) if t == "subscribe"));
        assert_eq!(err.to_string(), "Unknown message type: subscribe");
    }

    #[test]
    fn test_parse_missing_type() {
        let err = ClientMessage::parse(r#"{"category":"crypto"}"#).unwrap_err();
        assert!(matches!(err, WsError::InvalidMessage(_)));
    }

    #[test]
    fn test_server_message_wire_format() {
        let json = ServerMessage::error("boom").to_json().unwrap();
        assert_eq!(json, r#"{"type":"error","message":"boom"}"#);

        let json = ServerMessage::connected().to_json().unwrap();
        assert!(json.contains(r#""type":"connection_status""#));
        assert!(!json.contains("user"));

        let value: Value = serde_json::from_str(&ServerMessage::pong().to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "pong");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_connected_as_includes_user() {
        let msg = ServerMessage::connected_as(UserIdentity {
            id: Some("7".to_string()),
            username: "jane".to_string(),
            email: "jane@example.com".to_string(),
        });
        let value: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();

        assert_eq!(value["message"], "Connected as jane");
        assert_eq!(value["user"]["email"], "jane@example.com");
        assert_eq!(value["user"]["id"], "7");
    }
}
