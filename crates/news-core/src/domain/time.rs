//! 게시 시각 파싱 유틸리티.
//!
//! 공급자마다 시각 표기가 다릅니다:
//! - News API: RFC 3339 (`2024-05-01T12:30:00Z`)
//! - Alpha Vantage: `YYYYMMDDTHHMMSS` (`20240501T123000`)
//! - 내부 시드 데이터: 타임존 없는 ISO-8601 (`2024-05-01T12:30:00.123456`)
//!
//! 타임존이 없는 값은 UTC로 간주합니다.

use chrono::{DateTime, NaiveDateTime, Utc};

/// 타임존 없는 ISO-8601 / Alpha Vantage 형식 목록.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y%m%dT%H%M%S",
    "%Y%m%dT%H%M",
];

/// 게시 시각 문자열을 UTC 시각으로 파싱합니다.
///
/// 지원하지 않는 형식이거나 빈 문자열이면 `None`을 반환합니다.
pub fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// 게시 시각을 RFC 3339 문자열로 정규화합니다.
///
/// 파싱할 수 없는 값은 원문 그대로 유지합니다. 정렬 시에는 "시각 없음"으로 취급됩니다.
pub fn normalize_timestamp(raw: &str) -> String {
    match parse_published_at(raw) {
        Some(dt) => dt.to_rfc3339(),
        None => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_published_at("2024-05-01T12:30:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap());

        let offset = parse_published_at("2024-05-01T21:30:00+09:00").unwrap();
        assert_eq!(offset, dt);
    }

    #[test]
    fn test_parse_alpha_vantage_format() {
        let dt = parse_published_at("20240501T123000").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_iso_with_fraction() {
        let dt = parse_published_at("2024-05-01T12:30:00.123456").unwrap();
        assert_eq!(dt.timestamp(), 1714566600);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_published_at("").is_none());
        assert!(parse_published_at("   ").is_none());
        assert!(parse_published_at("yesterday").is_none());
    }

    #[test]
    fn test_normalize_timestamp() {
        assert_eq!(
            normalize_timestamp("20240501T123000"),
            "2024-05-01T12:30:00+00:00"
        );
        assert_eq!(normalize_timestamp(" not a date "), "not a date");
    }
}
