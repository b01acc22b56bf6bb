//! Redis 스냅샷 저장소.
//!
//! 스냅샷을 JSON으로 직렬화해 `news:live:snapshot` 키에 `SET EX`로 저장합니다.

use async_trait::async_trait;
use news_core::{CacheSnapshot, RedisConfig};
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tracing::{debug, info};

use super::SnapshotStore;
use crate::error::{FeedError, Result};

/// 스냅샷 캐시 키.
pub const SNAPSHOT_KEY: &str = "news:live:snapshot";

/// Redis 기반 스냅샷 저장소.
#[derive(Clone)]
pub struct RedisSnapshotStore {
    connection: ConnectionManager,
    ttl_secs: u64,
}

impl RedisSnapshotStore {
    /// Redis에 연결합니다.
    pub async fn connect(url: &str, ttl_secs: u64) -> Result<Self> {
        info!("Connecting to Redis...");

        let client = Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;

        info!("Redis connection established");

        Ok(Self {
            connection,
            ttl_secs,
        })
    }

    /// 설정에서 연결합니다. URL이 없으면 `NotConfigured`.
    pub async fn from_config(config: &RedisConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| FeedError::NotConfigured("redis.url".to_string()))?;
        Self::connect(url, config.snapshot_ttl_secs).await
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }
}

#[async_trait]
impl SnapshotStore for RedisSnapshotStore {
    async fn save(&self, snapshot: &CacheSnapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;
        let mut conn = self.connection.clone();
        let _: () = conn.set_ex(SNAPSHOT_KEY, json, self.ttl_secs).await?;

        debug!(items = snapshot.len(), ttl = self.ttl_secs, "Snapshot saved to Redis");
        Ok(())
    }

    async fn load(&self) -> Result<Option<CacheSnapshot>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(SNAPSHOT_KEY).await?;

        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        let mut conn = self.connection.clone();
        let result: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(result == "PONG")
    }
}
