//! 정규화된 뉴스 기사 타입.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::time::parse_published_at;

/// 기사 감성.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Sentiment {
    /// 외부 공급자의 감성 라벨을 변환합니다.
    ///
    /// Alpha Vantage의 `Bullish`/`Somewhat-Bullish`는 positive,
    /// `Bearish`/`Somewhat-Bearish`는 negative로 매핑되며
    /// 그 외 라벨은 neutral입니다.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if label.contains("bullish") || label == "positive" {
            Self::Positive
        } else if label.contains("bearish") || label == "negative" {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    /// 문자열 표현.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 기사 카테고리 태그.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    /// 주식/지수
    Markets,
    /// 거시경제, 중앙은행
    Economy,
    /// 기업 실적
    Business,
    Technology,
    Crypto,
    /// 원자재 (유가, 금)
    Commodities,
    #[default]
    General,
}

impl NewsCategory {
    /// 모든 카테고리.
    pub const ALL: [NewsCategory; 7] = [
        Self::Markets,
        Self::Economy,
        Self::Business,
        Self::Technology,
        Self::Crypto,
        Self::Commodities,
        Self::General,
    ];

    /// 문자열 표현 (직렬화 태그와 동일).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markets => "markets",
            Self::Economy => "economy",
            Self::Business => "business",
            Self::Technology => "technology",
            Self::Crypto => "crypto",
            Self::Commodities => "commodities",
            Self::General => "general",
        }
    }

    /// 태그가 이 카테고리와 같은지 대소문자 무시하고 비교합니다.
    pub fn matches(&self, tag: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(tag.trim())
    }
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewsCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.matches(s))
            .ok_or_else(|| format!("Unknown news category: {}", s))
    }
}

/// 정규화된 뉴스 기사.
///
/// 공급자 경계에서 한 번 생성되고 이후 변경되지 않습니다.
/// 캐시는 개별 기사를 수정하지 않고 컬렉션 전체를 교체합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    /// 요약 (비어 있을 수 있음)
    #[serde(default)]
    pub description: String,
    pub url: String,
    /// 언론사 이름
    pub source: String,
    /// 게시 시각 (파싱 가능하면 RFC 3339, 아니면 원문)
    pub published_at: String,
    #[serde(default)]
    pub url_to_image: Option<String>,
    pub category: NewsCategory,
    pub sentiment: Sentiment,
    /// 관련도 (0.0 ~ 1.0)
    pub relevance_score: f64,
    pub is_breaking: bool,
    /// 우선순위 (1 이상)
    pub priority: u32,
}

impl NewsItem {
    /// 중복 제거 식별자 (정규화된 제목).
    pub fn dedup_key(&self) -> String {
        normalize_title(&self.title)
    }

    /// 파싱된 게시 시각. 파싱할 수 없으면 `None`.
    pub fn published_time(&self) -> Option<DateTime<Utc>> {
        parse_published_at(&self.published_at)
    }

    /// 카테고리 태그 일치 여부 (대소문자 무시).
    pub fn in_category(&self, tag: &str) -> bool {
        self.category.matches(tag)
    }
}

/// 제목을 중복 판별용으로 정규화합니다.
///
/// 소문자로 바꾸고 연속 공백을 한 칸으로 줄인 뒤 앞뒤 공백을 제거합니다.
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(title: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            description: String::new(),
            url: "https://example.com".to_string(),
            source: "Reuters".to_string(),
            published_at: "2024-05-01T12:30:00Z".to_string(),
            url_to_image: None,
            category: NewsCategory::Markets,
            sentiment: Sentiment::Neutral,
            relevance_score: 0.5,
            is_breaking: false,
            priority: 1,
        }
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Fed  Holds\tRates \n"), "fed holds rates");
        assert_eq!(normalize_title("   "), "");
    }

    #[test]
    fn test_dedup_key_ignores_case_and_spacing() {
        let a = item("Markets Rally  On Earnings");
        let b = item("markets rally on earnings ");
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_sentiment_from_label() {
        assert_eq!(Sentiment::from_label("Bullish"), Sentiment::Positive);
        assert_eq!(Sentiment::from_label("Somewhat-Bullish"), Sentiment::Positive);
        assert_eq!(Sentiment::from_label("Bearish"), Sentiment::Negative);
        assert_eq!(Sentiment::from_label("Somewhat-Bearish"), Sentiment::Negative);
        assert_eq!(Sentiment::from_label("Neutral"), Sentiment::Neutral);
        assert_eq!(Sentiment::from_label(""), Sentiment::Neutral);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("crypto".parse::<NewsCategory>().unwrap(), NewsCategory::Crypto);
        assert_eq!("MARKETS".parse::<NewsCategory>().unwrap(), NewsCategory::Markets);
        assert!("sports".parse::<NewsCategory>().is_err());
    }

    #[test]
    fn test_news_item_json_field_names() {
        let json = serde_json::to_value(item("Title")).unwrap();
        assert!(json.get("publishedAt").is_some());
        assert!(json.get("relevanceScore").is_some());
        assert!(json.get("isBreaking").is_some());
        assert!(json.get("urlToImage").is_some());
        assert_eq!(json["category"], "markets");
        assert_eq!(json["sentiment"], "neutral");
    }

    #[test]
    fn test_published_time_unparseable() {
        let mut news = item("Title");
        news.published_at = "unknown".to_string();
        assert!(news.published_time().is_none());
    }

    proptest! {
        #[test]
        fn prop_normalize_title_is_idempotent(title in "[A-Za-z0-9 \t\n.,:'-]{0,60}") {
            let once = normalize_title(&title);
            prop_assert_eq!(normalize_title(&once), once.clone());
            prop_assert!(!once.starts_with(' ') && !once.ends_with(' '));
            prop_assert!(!once.contains("  "));
        }

        #[test]
        fn prop_dedup_key_ignores_spacing_and_case(words in prop::collection::vec("[A-Za-z]{1,8}", 1..6)) {
            let spaced = item(&format!("  {}  ", words.join("   ")));
            let upper = item(&words.join(" ").to_uppercase());
            prop_assert_eq!(spaced.dedup_key(), upper.dedup_key());
        }
    }
}
