//! 실시간 뉴스 WebSocket 서버.
//!
//! # 메시지 형식
//!
//! 모든 메시지는 `type` 필드를 가진 JSON 텍스트 프레임입니다.
//!
//! ## 클라이언트 → 서버
//!
//! ```json
//! {"type": "ping"}
//! {"type": "request_news"}
//! {"type": "refresh_news"}
//! {"type": "request_breaking_news"}
//! {"type": "request_category_news", "category": "crypto"}
//! ```
//!
//! ## 서버 → 클라이언트
//!
//! ```json
//! {"type": "connection_status", "status": "connected", "message": "..."}
//! {"type": "initial_news", "timestamp": "...", "news": [...], "last_update": "..."}
//! {"type": "news_update", "timestamp": "...", "count": 50, "breaking_news": [...], "latest_news": [...]}
//! {"type": "pong", "timestamp": "..."}
//! ```

pub mod dispatcher;
pub mod handler;
pub mod messages;

pub use dispatcher::CommandDispatcher;
pub use handler::{live_news_ws, live_news_ws_authenticated, websocket_router, CLOSE_INVALID_TOKEN};
pub use messages::{ClientMessage, ServerMessage, WsError, DEFAULT_CATEGORY};
