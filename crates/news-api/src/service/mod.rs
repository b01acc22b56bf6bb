//! 실시간 뉴스 서비스 계층.
//!
//! - [`cache`]: 스냅샷 캐시 (원자적 교체)
//! - [`registry`]: WebSocket 연결 레지스트리와 브로드캐스트
//! - [`live`]: 정기 갱신 루프와 조회 API

pub mod cache;
pub mod live;
pub mod registry;

pub use cache::NewsCache;
pub use live::{LiveNewsService, LiveNewsStatus};
pub use registry::{BroadcastReport, ClientHandle, ConnectionRegistry};
