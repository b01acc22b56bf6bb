//! 뉴스 캐시.
//!
//! 마지막으로 성공한 수집 결과를 `Arc<CacheSnapshot>`으로 보관합니다.
//! 갱신은 새 스냅샷을 락 밖에서 만든 뒤 포인터만 교체하므로,
//! 읽는 쪽은 항상 이전 스냅샷 전체 또는 새 스냅샷 전체를 봅니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use news_core::{CacheSnapshot, NewsItem};
use news_feed::seed_snapshot;
use tokio::sync::RwLock;

/// 스냅샷 캐시.
#[derive(Debug)]
pub struct NewsCache {
    snapshot: RwLock<Arc<CacheSnapshot>>,
}

impl NewsCache {
    pub fn new(initial: CacheSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(initial)),
        }
    }

    /// 시드 기사 5건으로 채운 캐시.
    pub fn seeded() -> Self {
        Self::new(seed_snapshot(Utc::now()))
    }

    /// 현재 스냅샷. 락은 `Arc` 복제 동안만 잡습니다.
    pub async fn read(&self) -> Arc<CacheSnapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// 기사와 갱신 시각을 한 번에 교체합니다.
    pub async fn update(&self, items: Vec<NewsItem>) -> Arc<CacheSnapshot> {
        self.update_at(items, Utc::now()).await
    }

    pub async fn update_at(&self, items: Vec<NewsItem>, at: DateTime<Utc>) -> Arc<CacheSnapshot> {
        let next = Arc::new(CacheSnapshot::new(items, at));
        *self.snapshot.write().await = Arc::clone(&next);
        next
    }

    /// 저장소에서 복원한 스냅샷으로 교체합니다. 빈 스냅샷은 무시합니다.
    pub async fn restore(&self, snapshot: CacheSnapshot) -> bool {
        if snapshot.is_empty() {
            return false;
        }
        *self.snapshot.write().await = Arc::new(snapshot);
        true
    }

    /// 현재 스냅샷에서 조건에 맞는 기사만 골라냅니다.
    pub async fn filter_by<F>(&self, predicate: F) -> Vec<NewsItem>
    where
        F: Fn(&NewsItem) -> bool,
    {
        self.read().await.filter_by(predicate)
    }
}

impl Default for NewsCache {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use news_core::{NewsCategory, Sentiment};

    fn item(title: &str, category: NewsCategory) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            description: String::new(),
            url: String::new(),
            source: "test".to_string(),
            published_at: "2024-05-01T10:00:00+00:00".to_string(),
            url_to_image: None,
            category,
            sentiment: Sentiment::Neutral,
            relevance_score: 0.5,
            is_breaking: false,
            priority: 1,
        }
    }

    #[tokio::test]
    async fn test_seeded_is_never_empty() {
        let cache = NewsCache::seeded();
        assert_eq!(cache.read().await.len(), 5);
    }

    #[tokio::test]
    async fn test_update_replaces_whole_snapshot() {
        let cache = NewsCache::seeded();
        let before = cache.read().await;

        let at = Utc::now();
        cache
            .update_at(vec![item("Bitcoin rallies", NewsCategory::Crypto)], at)
            .await;

        let after = cache.read().await;
        assert_eq!(after.len(), 1);
        assert_eq!(after.last_update, at);
        // 이전 스냅샷을 들고 있던 쪽은 영향 없음
        assert_eq!(before.len(), 5);
    }

    #[tokio::test]
    async fn test_restore_ignores_empty() {
        let cache = NewsCache::seeded();
        assert!(!cache.restore(CacheSnapshot::new(Vec::new(), Utc::now())).await);
        assert_eq!(cache.read().await.len(), 5);

        let restored = CacheSnapshot::new(vec![item("Gold climbs", NewsCategory::Commodities)], Utc::now());
        assert!(cache.restore(restored.clone()).await);
        assert_eq!(*cache.read().await, restored);
    }

    #[tokio::test]
    async fn test_filter_by() {
        let cache = NewsCache::new(CacheSnapshot::new(
            vec![
                item("a", NewsCategory::Crypto),
                item("b", NewsCategory::Markets),
                item("c", NewsCategory::Crypto),
            ],
            Utc::now(),
        ));

        let crypto = cache.filter_by(|i| i.in_category("CRYPTO")).await;
        assert_eq!(crypto.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reads_see_whole_snapshots() {
        let cache = Arc::new(NewsCache::seeded());
        let new_items: Vec<_> = (0..10)
            .map(|i| item(&format!("fresh {}", i), NewsCategory::Markets))
            .collect();

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move {
                    for _ in 0..200 {
                        let snapshot = cache.read().await;
                        let fresh = snapshot.items.iter().filter(|i| i.title.starts_with("fresh")).count();
                        // 섞인 스냅샷은 없어야 함
                        assert!(
                            (snapshot.len() == 5 && fresh == 0) || (snapshot.len() == 10 && fresh == 10)
                        );
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        cache.update(new_items).await;

        for reader in readers {
            reader.await.unwrap();
        }
        assert_eq!(cache.read().await.len(), 10);
    }
}
