//! 시드 기사.
//!
//! 프로세스 시작 직후 첫 수집이 끝나기 전, 또는 공급자가 하나도 설정되지 않았을 때
//! 캐시가 비어 있지 않도록 채워 두는 고정 기사 5건입니다.

use chrono::{DateTime, Duration, Utc};
use news_core::{CacheSnapshot, NewsCategory, NewsItem, Sentiment};

struct Seed {
    title: &'static str,
    description: &'static str,
    url: &'static str,
    source: &'static str,
    category: NewsCategory,
    sentiment: Sentiment,
    relevance_score: f64,
    priority: u32,
}

const SEEDS: [Seed; 5] = [
    Seed {
        title: "Global Markets Update: Major indices show mixed performance",
        description: "Global stock markets displayed mixed performance as investors weigh economic data and central bank policies.",
        url: "https://example.com/markets-update",
        source: "Financial Times",
        category: NewsCategory::Markets,
        sentiment: Sentiment::Neutral,
        relevance_score: 0.85,
        priority: 1,
    },
    Seed {
        title: "NIFTY 50 and SENSEX: Indian markets show resilience",
        description: "Banking and IT sectors lead the gains as investors remain optimistic about domestic growth prospects.",
        url: "https://example.com/indian-markets",
        source: "Economic Times",
        category: NewsCategory::Markets,
        sentiment: Sentiment::Positive,
        relevance_score: 0.90,
        priority: 1,
    },
    Seed {
        title: "Tech Sector Earnings: Major companies report strong Q4 results",
        description: "Cloud services and AI-driven products remain key growth drivers for the sector.",
        url: "https://example.com/tech-earnings",
        source: "Reuters",
        category: NewsCategory::Technology,
        sentiment: Sentiment::Positive,
        relevance_score: 0.92,
        priority: 1,
    },
    Seed {
        title: "RBI Policy Decision: Interest rates remain unchanged",
        description: "The Reserve Bank of India keeps the repo rate at 6.5% and signals continued focus on inflation control.",
        url: "https://example.com/rbi-policy",
        source: "Business Standard",
        category: NewsCategory::Economy,
        sentiment: Sentiment::Neutral,
        relevance_score: 0.88,
        priority: 2,
    },
    Seed {
        title: "Oil Prices: Crude oil futures show volatility",
        description: "Brent and WTI futures show divergent movements amid geopolitical tensions.",
        url: "https://example.com/oil-prices",
        source: "Bloomberg",
        category: NewsCategory::Commodities,
        sentiment: Sentiment::Neutral,
        relevance_score: 0.75,
        priority: 1,
    },
];

/// 시드 기사 5건을 생성합니다. `now`부터 한 시간 간격으로 과거 시각이 매겨집니다.
pub fn seed_items(now: DateTime<Utc>) -> Vec<NewsItem> {
    SEEDS
        .iter()
        .enumerate()
        .map(|(i, seed)| NewsItem {
            title: seed.title.to_string(),
            description: seed.description.to_string(),
            url: seed.url.to_string(),
            source: seed.source.to_string(),
            published_at: (now - Duration::hours(i as i64)).to_rfc3339(),
            url_to_image: None,
            category: seed.category,
            sentiment: seed.sentiment,
            relevance_score: seed.relevance_score,
            is_breaking: false,
            priority: seed.priority,
        })
        .collect()
}

/// 시드 기사로 채운 스냅샷. `last_update`는 `now`입니다.
pub fn seed_snapshot(now: DateTime<Utc>) -> CacheSnapshot {
    CacheSnapshot::new(seed_items(now), now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_snapshot() {
        let now = Utc::now();
        let snapshot = seed_snapshot(now);

        assert_eq!(snapshot.len(), 5);
        assert_eq!(snapshot.last_update, now);
        assert_eq!(snapshot.breaking_count(), 0);

        // 최신순
        for pair in snapshot.items.windows(2) {
            assert!(pair[0].published_time() > pair[1].published_time());
        }
    }
}
