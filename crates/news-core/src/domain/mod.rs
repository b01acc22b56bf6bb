//! 뉴스 도메인 모델.
//!
//! 공급자 경계에서 한 번 정규화된 [`NewsItem`]과, 캐시가 원자적으로
//! 교체하는 [`CacheSnapshot`]을 정의합니다.

pub mod news;
pub mod snapshot;
pub mod time;

pub use news::*;
pub use snapshot::*;
pub use time::*;
