//! 실시간 뉴스 서비스.
//!
//! 캐시, 연결 레지스트리, 정기 갱신 루프를 하나로 묶습니다.
//!
//! # 갱신 루프
//!
//! ```text
//! stopped ──start()──▶ running ──stop()──▶ stopped
//! ```
//!
//! - `start()`는 첫 수집/브로드캐스트를 기다린 뒤 루프 태스크를 띄웁니다.
//!   이미 실행 중이면 아무것도 하지 않습니다
//! - 루프는 `update_interval`만큼 쉬고 수집합니다. 결과가 비어 있지 않으면
//!   캐시를 교체하고 `news_update`를 브로드캐스트합니다
//! - 한 회차가 실패(에러 또는 패닉)하면 `error_backoff`만큼 쉬고 다시 수집합니다
//! - 대기와 수집 모두 취소 토큰과 `select!`로 묶여 있어 `stop()`이 바로 반영됩니다

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use news_core::{CacheSnapshot, LiveNewsConfig, NewsError, NewsItem};
use news_feed::{Fetcher, SnapshotStore};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use utoipa::ToSchema;

use super::cache::NewsCache;
use super::registry::{BroadcastReport, ClientHandle, ConnectionRegistry};
use crate::metrics::{record_broadcast, set_cache_items};
use crate::websocket::ServerMessage;

/// 실행 중인 루프의 핸들.
struct LoopHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// 서비스 상태 요약.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LiveNewsStatus {
    /// "running" | "stopped"
    pub status: String,
    pub active_connections: usize,
    pub last_update: DateTime<Utc>,
    pub news_count: usize,
    pub breaking_news_count: usize,
}

/// 실시간 뉴스 서비스.
pub struct LiveNewsService {
    config: LiveNewsConfig,
    fetcher: Fetcher,
    cache: NewsCache,
    registry: ConnectionRegistry,
    store: Option<Arc<dyn SnapshotStore>>,
    running: AtomicBool,
    lifecycle: Mutex<Option<LoopHandle>>,
}

impl LiveNewsService {
    /// 시드 기사로 채운 캐시와 함께 서비스를 생성합니다.
    pub fn new(config: LiveNewsConfig, fetcher: Fetcher) -> Self {
        Self::with_cache(config, fetcher, NewsCache::seeded())
    }

    pub fn with_cache(config: LiveNewsConfig, fetcher: Fetcher, cache: NewsCache) -> Self {
        Self {
            config,
            fetcher,
            cache,
            registry: ConnectionRegistry::new(),
            store: None,
            running: AtomicBool::new(false),
            lifecycle: Mutex::new(None),
        }
    }

    /// 스냅샷 저장소를 연결합니다.
    pub fn with_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &LiveNewsConfig {
        &self.config
    }

    pub fn cache(&self) -> &NewsCache {
        &self.cache
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// 저장소에 남아 있는 스냅샷으로 캐시를 복원합니다.
    ///
    /// 저장소가 없거나, 비어 있거나, 읽기에 실패하면 시드 기사를 유지합니다.
    pub async fn restore_from_store(&self) -> bool {
        let Some(store) = &self.store else {
            return false;
        };

        match store.load().await {
            Ok(Some(snapshot)) => {
                let count = snapshot.len();
                let restored = self.cache.restore(snapshot).await;
                if restored {
                    set_cache_items(count);
                    info!(items = count, "Cache restored from snapshot store");
                }
                restored
            }
            Ok(None) => {
                debug!("No persisted snapshot found");
                false
            }
            Err(e) => {
                warn!(error = %e, "Failed to load persisted snapshot");
                false
            }
        }
    }

    // ==================== 생명주기 ====================

    /// 락 없이 실행 상태를 확인합니다.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// 갱신 루프를 시작합니다. 이 호출로 시작되었으면 `true`.
    pub async fn start(self: &Arc<Self>) -> bool {
        let mut lifecycle = self.lifecycle.lock().await;
        if lifecycle.is_some() {
            return false;
        }

        info!(
            interval_secs = self.config.update_interval_secs,
            providers = self.fetcher.provider_count(),
            "Starting live news updates"
        );

        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Initial news refresh failed");
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(Arc::clone(self).run_loop(cancel.clone()));
        *lifecycle = Some(LoopHandle { cancel, task });
        self.running.store(true, Ordering::SeqCst);

        true
    }

    /// 갱신 루프를 멈추고 종료를 기다립니다. 이 호출로 멈췄으면 `true`.
    pub async fn stop(&self) -> bool {
        let Some(handle) = self.lifecycle.lock().await.take() else {
            return false;
        };

        self.running.store(false, Ordering::SeqCst);
        handle.cancel.cancel();
        if let Err(e) = handle.task.await {
            error!(error = %e, "Live news loop terminated abnormally");
        }

        info!("Live news updates stopped");
        true
    }

    async fn run_loop(self: Arc<Self>, cancel: CancellationToken) {
        let mut delay = self.config.update_interval();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                result = AssertUnwindSafe(self.refresh()).catch_unwind() => result,
            };

            delay = match result {
                Ok(Ok(snapshot)) => {
                    debug!(items = snapshot.len(), "Live news iteration completed");
                    self.config.update_interval()
                }
                Ok(Err(e)) => {
                    error!(error = %e, "Live news iteration failed");
                    self.error_backoff()
                }
                Err(_) => {
                    error!("Live news iteration panicked");
                    self.error_backoff()
                }
            };
        }

        debug!("Live news loop exited");
    }

    fn error_backoff(&self) -> Duration {
        self.config.error_backoff()
    }

    // ==================== 갱신 ====================

    /// 즉시 수집하고, 결과가 있으면 캐시 교체 후 브로드캐스트합니다.
    ///
    /// 수집 결과가 비어 있으면 기존 캐시를 그대로 반환하고 브로드캐스트하지 않습니다.
    pub async fn refresh(&self) -> Result<Arc<CacheSnapshot>, NewsError> {
        let items = self.fetcher.fetch_all().await;
        if items.is_empty() {
            info!("Fetch returned no items, keeping current cache");
            return Ok(self.cache.read().await);
        }

        let snapshot = self.cache.update(items).await;
        set_cache_items(snapshot.len());

        let report = self.broadcast_update(&snapshot).await?;
        info!(
            items = snapshot.len(),
            breaking = snapshot.breaking_count(),
            delivered = report.delivered,
            evicted = report.evicted,
            "News cache refreshed"
        );

        self.persist(&snapshot).await;
        Ok(snapshot)
    }

    async fn broadcast_update(&self, snapshot: &CacheSnapshot) -> Result<BroadcastReport, NewsError> {
        let message = self.update_message(snapshot);
        let report = self
            .registry
            .broadcast(&message)
            .await
            .map_err(|e| NewsError::Serialization(e.to_string()))?;
        record_broadcast(message.type_name());
        Ok(report)
    }

    /// 속보 전체와 최신 `latest_count`건을 담은 `news_update`.
    fn update_message(&self, snapshot: &CacheSnapshot) -> ServerMessage {
        ServerMessage::NewsUpdate {
            timestamp: Utc::now(),
            count: snapshot.len(),
            breaking_news: snapshot.breaking(),
            latest_news: snapshot.latest(self.config.latest_count),
        }
    }

    async fn persist(&self, snapshot: &CacheSnapshot) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(snapshot).await {
                warn!(error = %e, "Failed to persist news snapshot");
            }
        }
    }

    // ==================== 연결 ====================

    /// 연결에 `initial_news`를 보내고 레지스트리에 등록합니다.
    ///
    /// 연결이 이미 닫혔으면 등록하지 않고 `false`.
    pub async fn connect(&self, handle: ClientHandle) -> bool {
        let snapshot = self.cache.read().await;
        let initial = ServerMessage::InitialNews {
            timestamp: Utc::now(),
            news: snapshot.latest(self.config.initial_count),
            last_update: snapshot.last_update,
        };

        if !handle.send(&initial).await {
            debug!(session_id = %handle.id, "Client closed before initial news");
            return false;
        }

        self.registry.add(handle).await;
        true
    }

    pub async fn disconnect(&self, id: &str) -> bool {
        self.registry.remove(id).await
    }

    pub async fn connection_count(&self) -> usize {
        self.registry.connection_count().await
    }

    // ==================== 조회 ====================

    pub async fn status(&self) -> LiveNewsStatus {
        let snapshot = self.cache.read().await;
        LiveNewsStatus {
            status: if self.is_running() { "running" } else { "stopped" }.to_string(),
            active_connections: self.registry.connection_count().await,
            last_update: snapshot.last_update,
            news_count: snapshot.len(),
            breaking_news_count: snapshot.breaking_count(),
        }
    }

    /// 현재 캐시 스냅샷.
    pub async fn latest(&self) -> Arc<CacheSnapshot> {
        self.cache.read().await
    }

    pub async fn breaking(&self) -> Vec<NewsItem> {
        self.cache.filter_by(|item| item.is_breaking).await
    }

    /// 카테고리 태그가 일치하는 기사 (대소문자 무시).
    pub async fn by_category(&self, category: &str) -> Vec<NewsItem> {
        self.cache.filter_by(|item| item.in_category(category)).await
    }
}
