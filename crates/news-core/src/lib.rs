//! # News Core
//!
//! 실시간 뉴스 브로드캐스트 서비스의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 서비스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 정규화된 뉴스 아이템 및 캐시 스냅샷
//! - 설정 관리
//! - 에러 타입
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
