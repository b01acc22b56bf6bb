//! 다중 공급자 수집기.
//!
//! 설정된 모든 공급자를 동시에 호출하고, 결과를 설정 순서대로 병합합니다.
//!
//! # 병합 규칙
//!
//! 1. 정규화된 제목이 같은 기사는 먼저 나온 것만 남깁니다 (공급자 순서 기준)
//! 2. 게시 시각 내림차순으로 안정 정렬합니다. 시각을 파싱할 수 없는 기사는 맨 뒤로 갑니다
//! 3. 최대 개수로 자릅니다
//!
//! 공급자 실패는 해당 공급자의 기여분이 0이 될 뿐, 수집 전체를 실패시키지 않습니다.

use futures::future::join_all;
use metrics::{counter, gauge};
use news_core::{NewsItem, ProvidersConfig};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::Result;
use crate::provider::{AlphaVantageProvider, NewsApiProvider, NewsProvider};

/// 기본 최대 기사 수.
pub const DEFAULT_MAX_ITEMS: usize = 50;

/// 공급자별 수집 결과.
///
/// "기사가 없었음"과 "실패함"을 구분해 로그에 남기기 위한 타입입니다.
/// 병합 시에는 둘 다 기여분 0으로 취급됩니다.
#[derive(Debug, Clone)]
pub enum ProviderOutcome {
    Fetched { provider: String, items: Vec<NewsItem> },
    Failed { provider: String, reason: String },
}

impl ProviderOutcome {
    pub fn provider(&self) -> &str {
        match self {
            Self::Fetched { provider, .. } | Self::Failed { provider, .. } => provider,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// 이 공급자가 기여한 기사 수.
    pub fn item_count(&self) -> usize {
        match self {
            Self::Fetched { items, .. } => items.len(),
            Self::Failed { .. } => 0,
        }
    }
}

/// 한 번의 수집 결과.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    /// 병합/정렬/절단된 기사
    pub items: Vec<NewsItem>,
    /// 공급자별 결과 (설정 순서)
    pub outcomes: Vec<ProviderOutcome>,
}

impl FetchReport {
    pub fn failed_providers(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_failure())
            .map(|o| o.provider())
            .collect()
    }
}

/// 뉴스 수집기.
#[derive(Clone)]
pub struct Fetcher {
    providers: Vec<Arc<dyn NewsProvider>>,
    max_items: usize,
}

impl Fetcher {
    /// 공급자 목록으로 수집기를 생성합니다. 목록 순서가 중복 제거 우선순위입니다.
    pub fn new(providers: Vec<Arc<dyn NewsProvider>>, max_items: usize) -> Self {
        Self {
            providers,
            max_items,
        }
    }

    /// 설정에서 API 키가 있는 공급자만 골라 수집기를 생성합니다.
    pub fn from_config(config: &ProvidersConfig, max_items: usize) -> Result<Self> {
        let mut providers: Vec<Arc<dyn NewsProvider>> = Vec::new();

        match NewsApiProvider::from_config(config)? {
            Some(provider) => providers.push(Arc::new(provider)),
            None => warn!("No News API key configured"),
        }
        match AlphaVantageProvider::from_config(config)? {
            Some(provider) => providers.push(Arc::new(provider)),
            None => warn!("No Alpha Vantage API key configured"),
        }

        info!(providers = providers.len(), max_items, "News fetcher configured");
        Ok(Self::new(providers, max_items))
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// 모든 공급자에서 수집하고 공급자별 결과를 함께 반환합니다.
    pub async fn fetch_report(&self) -> FetchReport {
        if self.providers.is_empty() {
            return FetchReport::default();
        }

        counter!("news_fetch_total").increment(1);

        let results = join_all(self.providers.iter().map(|p| p.fetch())).await;

        let outcomes: Vec<ProviderOutcome> = self
            .providers
            .iter()
            .zip(results)
            .map(|(provider, result)| {
                let name = provider.name().to_string();
                match result {
                    Ok(items) => ProviderOutcome::Fetched { provider: name, items },
                    Err(e) => {
                        warn!(provider = %name, error = %e, "News provider failed");
                        counter!("news_provider_errors_total", "provider" => name.clone())
                            .increment(1);
                        ProviderOutcome::Failed {
                            provider: name,
                            reason: e.to_string(),
                        }
                    }
                }
            })
            .collect();

        let batches = outcomes.iter().filter_map(|o| match o {
            ProviderOutcome::Fetched { items, .. } => Some(items.clone()),
            ProviderOutcome::Failed { .. } => None,
        });
        let items = merge_items(batches, self.max_items);

        gauge!("news_fetch_items").set(items.len() as f64);
        info!(
            total = items.len(),
            failed = outcomes.iter().filter(|o| o.is_failure()).count(),
            "News fetch completed"
        );

        FetchReport { items, outcomes }
    }

    /// 모든 공급자에서 수집한 기사를 반환합니다. 실패하지 않습니다.
    pub async fn fetch_all(&self) -> Vec<NewsItem> {
        self.fetch_report().await.items
    }
}

/// 공급자 결과를 병합합니다.
///
/// 중복 제거 → 게시 시각 내림차순 안정 정렬 → `max_items`로 절단.
/// 정규화된 제목이 빈 기사는 버립니다.
pub fn merge_items<I>(batches: I, max_items: usize) -> Vec<NewsItem>
where
    I: IntoIterator<Item = Vec<NewsItem>>,
{
    let mut seen = HashSet::new();
    let mut merged: Vec<NewsItem> = batches
        .into_iter()
        .flatten()
        .filter(|item| {
            let key = item.dedup_key();
            !key.is_empty() && seen.insert(key)
        })
        .collect();

    // Reverse(None)이 Reverse(Some(_))보다 크므로 시각 없는 기사가 맨 뒤로 감
    merged.sort_by_cached_key(|item| Reverse(item.published_time()));
    merged.truncate(max_items);
    merged
}
