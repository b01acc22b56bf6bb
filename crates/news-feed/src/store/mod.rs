//! 스냅샷 영속화.
//!
//! 최신 캐시 스냅샷을 외부 저장소에 미러링해 두면, 프로세스 재시작 시
//! 시드 기사 대신 마지막 수집 결과로 시작할 수 있습니다.

mod redis;

use async_trait::async_trait;
use news_core::CacheSnapshot;

use crate::error::Result;

pub use self::redis::{RedisSnapshotStore, SNAPSHOT_KEY};

/// 스냅샷 저장소.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// 스냅샷을 저장합니다 (기존 값 덮어쓰기).
    async fn save(&self, snapshot: &CacheSnapshot) -> Result<()>;

    /// 저장된 스냅샷을 읽습니다. 없거나 만료되었으면 `None`.
    async fn load(&self) -> Result<Option<CacheSnapshot>>;

    /// 저장소 연결 상태를 확인합니다.
    async fn health_check(&self) -> Result<bool>;
}
