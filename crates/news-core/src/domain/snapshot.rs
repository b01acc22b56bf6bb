//! 캐시 스냅샷.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::news::NewsItem;

/// 마지막으로 성공한 수집 결과와 그 시각.
///
/// 캐시가 단독으로 소유하며, 갱신 시 통째로 교체됩니다.
/// 기사는 최신순으로 정렬되어 있습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct CacheSnapshot {
    pub items: Vec<NewsItem>,
    pub last_update: DateTime<Utc>,
}

impl CacheSnapshot {
    /// 새 스냅샷을 생성합니다.
    pub fn new(items: Vec<NewsItem>, last_update: DateTime<Utc>) -> Self {
        Self { items, last_update }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 조건에 맞는 기사를 순서를 유지한 채 복사합니다.
    pub fn filter_by<F>(&self, predicate: F) -> Vec<NewsItem>
    where
        F: Fn(&NewsItem) -> bool,
    {
        self.items.iter().filter(|item| predicate(item)).cloned().collect()
    }

    /// 속보 기사.
    pub fn breaking(&self) -> Vec<NewsItem> {
        self.filter_by(|item| item.is_breaking)
    }

    /// 속보 기사 수.
    pub fn breaking_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_breaking).count()
    }

    /// 카테고리 태그로 필터링합니다 (대소문자 무시).
    pub fn by_category(&self, tag: &str) -> Vec<NewsItem> {
        self.filter_by(|item| item.in_category(tag))
    }

    /// 최신 `n`개 기사.
    pub fn latest(&self, n: usize) -> Vec<NewsItem> {
        self.items.iter().take(n).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewsCategory, Sentiment};

    fn item(title: &str, category: NewsCategory, is_breaking: bool) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            description: String::new(),
            url: format!("https://example.com/{}", title),
            source: "Bloomberg".to_string(),
            published_at: "2024-05-01T12:30:00Z".to_string(),
            url_to_image: None,
            category,
            sentiment: Sentiment::Neutral,
            relevance_score: 0.5,
            is_breaking,
            priority: 1,
        }
    }

    #[test]
    fn test_filters_preserve_order() {
        let snapshot = CacheSnapshot::new(
            vec![
                item("a", NewsCategory::Crypto, true),
                item("b", NewsCategory::Markets, false),
                item("c", NewsCategory::Crypto, false),
                item("d", NewsCategory::Markets, true),
            ],
            Utc::now(),
        );

        let crypto: Vec<_> = snapshot.by_category("CRYPTO").into_iter().map(|i| i.title).collect();
        assert_eq!(crypto, vec!["a", "c"]);

        let breaking: Vec<_> = snapshot.breaking().into_iter().map(|i| i.title).collect();
        assert_eq!(breaking, vec!["a", "d"]);
        assert_eq!(snapshot.breaking_count(), 2);

        assert_eq!(snapshot.latest(3).len(), 3);
        assert_eq!(snapshot.latest(10).len(), 4);
        assert!(snapshot.by_category("sports").is_empty());
    }
}
