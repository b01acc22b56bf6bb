//! # News Feed
//!
//! 외부 뉴스 공급자에서 기사를 수집해 [`NewsItem`](news_core::NewsItem)으로
//! 정규화하는 계층입니다.
//!
//! - [`provider`]: 공급자 trait 및 News API / Alpha Vantage 클라이언트
//! - [`classifier`]: 카테고리/감성/속보 분류기
//! - [`fetcher`]: 다중 공급자 병합, 중복 제거, 정렬
//! - [`fallback`]: 첫 수집 전 사용하는 시드 기사
//! - [`store`]: 스냅샷 영속화 (Redis)

pub mod classifier;
pub mod error;
pub mod fallback;
pub mod fetcher;
pub mod provider;
pub mod store;

pub use classifier::{ArticleClassifier, ArticleText, Classification, KeywordClassifier};
pub use error::{FeedError, Result};
pub use fallback::{seed_items, seed_snapshot};
pub use fetcher::{merge_items, FetchReport, Fetcher, ProviderOutcome};
pub use provider::{AlphaVantageProvider, NewsApiProvider, NewsProvider};
pub use store::{RedisSnapshotStore, SnapshotStore};
