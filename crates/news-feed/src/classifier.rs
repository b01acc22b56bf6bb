//! 기사 분류기.
//!
//! 카테고리, 감성, 관련도, 속보 여부, 우선순위를 추정합니다.
//! 정확도에 대한 계약은 없으므로 [`ArticleClassifier`] 구현을 공급자별로
//! 교체할 수 있습니다. 기본 구현은 키워드 기반 [`KeywordClassifier`]입니다.

use news_core::{NewsCategory, Sentiment};

/// 분류 대상 기사 텍스트.
#[derive(Debug, Clone, Copy)]
pub struct ArticleText<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub source: &'a str,
    /// 수집에 사용한 검색어 (없으면 빈 문자열)
    pub query: &'a str,
}

/// 분류 결과.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: NewsCategory,
    pub sentiment: Sentiment,
    pub relevance_score: f64,
    pub is_breaking: bool,
    pub priority: u32,
}

/// 기사 분류기.
pub trait ArticleClassifier: Send + Sync {
    fn category(&self, article: &ArticleText<'_>) -> NewsCategory;

    fn sentiment(&self, article: &ArticleText<'_>) -> Sentiment;

    /// 검색어 대비 관련도 (0.0 ~ 1.0).
    fn relevance(&self, article: &ArticleText<'_>) -> f64;

    fn is_breaking(&self, article: &ArticleText<'_>) -> bool;

    /// 우선순위 (1 이상).
    fn priority(&self, article: &ArticleText<'_>) -> u32;

    /// 모든 항목을 한 번에 분류합니다.
    fn classify(&self, article: &ArticleText<'_>) -> Classification {
        Classification {
            category: self.category(article),
            sentiment: self.sentiment(article),
            relevance_score: self.relevance(article).clamp(0.0, 1.0),
            is_breaking: self.is_breaking(article),
            priority: self.priority(article).max(1),
        }
    }
}

/// 단어 단위로 매칭하기 위해 텍스트를 `" w1 w2 ... "` 형태로 만듭니다.
///
/// 구두점은 공백으로 바뀌므로 `"just in"` 같은 구절도 매칭됩니다.
fn word_haystack(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect();
    format!(" {} ", cleaned.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn contains_word(haystack: &str, keyword: &str) -> bool {
    haystack.contains(&format!(" {} ", keyword))
}

fn count_words(haystack: &str, keywords: &[String]) -> usize {
    keywords.iter().filter(|kw| contains_word(haystack, kw)).count()
}

fn to_owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// 키워드 목록 기반 분류기.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    /// 카테고리별 키워드 (앞쪽 항목이 우선)
    pub category_keywords: Vec<(NewsCategory, Vec<String>)>,
    pub positive_words: Vec<String>,
    pub negative_words: Vec<String>,
    pub breaking_keywords: Vec<String>,
    /// 신뢰 언론사 (이름의 일부로 매칭)
    pub trusted_sources: Vec<String>,
    pub market_keywords: Vec<String>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self {
            category_keywords: vec![
                (
                    NewsCategory::Markets,
                    to_owned(&["nifty", "sensex", "nse", "bse", "stock", "stocks", "market", "markets", "nasdaq", "dow"]),
                ),
                (
                    NewsCategory::Economy,
                    to_owned(&["rbi", "fed", "ecb", "economy", "gdp", "inflation", "rates"]),
                ),
                (
                    NewsCategory::Business,
                    to_owned(&["earnings", "profit", "revenue", "business", "merger", "acquisition"]),
                ),
                (
                    NewsCategory::Crypto,
                    to_owned(&["crypto", "bitcoin", "ethereum", "blockchain"]),
                ),
                (
                    NewsCategory::Commodities,
                    to_owned(&["oil", "gold", "silver", "crude", "commodities"]),
                ),
                (
                    NewsCategory::Technology,
                    to_owned(&["ai", "tech", "technology", "software", "semiconductor", "chip"]),
                ),
            ],
            positive_words: to_owned(&["surge", "surges", "rally", "rallies", "gain", "gains", "profit", "growth", "positive", "bullish", "record", "up"]),
            negative_words: to_owned(&["crash", "fall", "falls", "decline", "loss", "drop", "drops", "negative", "bearish", "slump", "down"]),
            breaking_keywords: to_owned(&[
                "breaking", "urgent", "just in", "flash", "alert", "crash", "rally",
                "announcement", "emergency", "crisis",
            ]),
            trusted_sources: to_owned(&["reuters", "bloomberg", "cnbc", "wsj", "wall street journal", "financial times"]),
            market_keywords: to_owned(&["nifty", "sensex", "stock", "stocks", "market", "markets", "trading"]),
        }
    }
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArticleClassifier for KeywordClassifier {
    fn category(&self, article: &ArticleText<'_>) -> NewsCategory {
        let title = word_haystack(article.title);
        self.category_keywords
            .iter()
            .find(|(_, words)| words.iter().any(|w| contains_word(&title, w)))
            .map(|(category, _)| *category)
            .unwrap_or(NewsCategory::General)
    }

    fn sentiment(&self, article: &ArticleText<'_>) -> Sentiment {
        let text = word_haystack(&format!("{} {}", article.title, article.description));
        let positive = count_words(&text, &self.positive_words);
        let negative = count_words(&text, &self.negative_words);

        match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        }
    }

    fn relevance(&self, article: &ArticleText<'_>) -> f64 {
        // 검색 연산자(OR/AND/NOT)는 관련도 계산에서 제외
        let terms: Vec<String> = article
            .query
            .split_whitespace()
            .filter(|w| !matches!(*w, "OR" | "AND" | "NOT"))
            .map(|w| w.to_lowercase())
            .collect();
        if terms.is_empty() {
            return 0.0;
        }

        let title = word_haystack(article.title);
        let matches = count_words(&title, &terms);
        (matches as f64 / terms.len() as f64).min(1.0)
    }

    fn is_breaking(&self, article: &ArticleText<'_>) -> bool {
        let title = word_haystack(article.title);
        self.breaking_keywords.iter().any(|kw| contains_word(&title, kw))
    }

    fn priority(&self, article: &ArticleText<'_>) -> u32 {
        let mut priority = 1;

        if self.is_breaking(article) {
            priority += 3;
        }

        let source = article.source.to_lowercase();
        if self.trusted_sources.iter().any(|s| source.contains(s.as_str())) {
            priority += 2;
        }

        let title = word_haystack(article.title);
        if self.market_keywords.iter().any(|kw| contains_word(&title, kw)) {
            priority += 1;
        }

        priority
    }
}
