//! 설정 관리.
//!
//! 설정은 다음 순서로 겹쳐 적용됩니다 (뒤가 우선):
//!
//! 1. 내장 기본값
//! 2. 설정 파일 (`NEWS_CONFIG` 경로 또는 `config/default.toml`, 없으면 생략)
//! 3. `NEWS__SECTION__KEY` 형식의 환경 변수
//! 4. 기존 배포 호환용 단일 환경 변수 (`NEWS_API_KEY`, `REDIS_URL`, `JWT_SECRET` 등)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::NewsError;

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 개발용 JWT 시크릿. 운영 환경에서는 반드시 교체해야 합니다.
pub const DEV_JWT_SECRET: &str = "dev-secret-key-change-in-production";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 실시간 뉴스 루프 설정
    pub live_news: LiveNewsConfig,
    /// 외부 뉴스 공급자 설정
    pub providers: ProvidersConfig,
    /// Redis 설정
    pub redis: RedisConfig,
    /// 인증 설정
    pub auth: AuthConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    /// `host:port` 바인딩 주소.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "news_api=info,news_feed=info,tower_http=info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 실시간 뉴스 브로드캐스트 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LiveNewsConfig {
    /// 정기 갱신 주기 (초)
    pub update_interval_secs: u64,
    /// 반복 실패 시 대기 시간 (초)
    pub error_backoff_secs: u64,
    /// 수집 결과 최대 보관 수
    pub max_items: usize,
    /// `news_update`에 포함할 최신 기사 수
    pub latest_count: usize,
    /// 접속 직후 `initial_news`에 포함할 기사 수
    pub initial_count: usize,
    /// 클라이언트별 송신 버퍼 크기
    pub client_buffer: usize,
}

impl Default for LiveNewsConfig {
    fn default() -> Self {
        Self {
            update_interval_secs: 30,
            error_backoff_secs: 60,
            max_items: 50,
            latest_count: 10,
            initial_count: 20,
            client_buffer: 256,
        }
    }
}

impl LiveNewsConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }
}

/// 외부 뉴스 공급자 설정.
///
/// API 키가 없는 공급자는 수집 대상에서 제외됩니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// News API 키
    pub news_api_key: Option<String>,
    /// Alpha Vantage API 키
    pub alpha_vantage_api_key: Option<String>,
    pub news_api_base_url: String,
    pub alpha_vantage_base_url: String,
    /// News API 검색어
    pub news_api_query: String,
    /// Alpha Vantage 토픽 (쉼표 구분)
    pub alpha_vantage_topics: String,
    /// 요청당 기사 수
    pub page_size: u32,
    /// 조회 기간 (시간)
    pub lookback_hours: i64,
    /// HTTP 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            news_api_key: None,
            alpha_vantage_api_key: None,
            news_api_base_url: "https://newsapi.org".to_string(),
            alpha_vantage_base_url: "https://www.alphavantage.co".to_string(),
            news_api_query: "stock market OR trading OR finance OR economy".to_string(),
            alpha_vantage_topics: "technology,earnings,forex,ipo".to_string(),
            page_size: 50,
            lookback_hours: 24,
            request_timeout_secs: 30,
        }
    }
}

impl ProvidersConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Redis 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Redis URL. 없으면 스냅샷 미러링을 사용하지 않습니다.
    pub url: Option<String>,
    /// 스냅샷 TTL (초)
    pub snapshot_ttl_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: None,
            snapshot_ttl_secs: 300,
        }
    }
}

/// 인증 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT HS256 시크릿
    pub jwt_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
        }
    }
}

impl AppConfig {
    /// 기본 위치에서 설정을 로드합니다.
    ///
    /// `NEWS_CONFIG` 환경 변수가 있으면 그 경로를, 없으면 [`DEFAULT_CONFIG_PATH`]를
    /// 사용합니다. 파일이 없어도 에러가 아닙니다.
    pub fn load() -> Result<Self, NewsError> {
        let path = std::env::var("NEWS_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        Self::load_from(Some(&path))
    }

    /// 지정한 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load_from(path: Option<&Path>) -> Result<Self, NewsError> {
        let mut config = Self::build(path, Self::env_source())?;
        config.apply_legacy_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// `NEWS__SECTION__KEY` 환경 변수 소스.
    fn env_source() -> config::Environment {
        config::Environment::with_prefix("NEWS")
            .separator("__")
            .try_parsing(true)
    }

    fn build(path: Option<&Path>, env: config::Environment) -> Result<Self, NewsError> {
        let mut builder = config::Config::builder()
            // 기본값으로 시작
            .add_source(config::Config::try_from(&AppConfig::default())?);

        // 파일에서 로드 (선택)
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        // 환경 변수로 오버라이드
        let config = builder.add_source(env).build()?;
        Ok(config.try_deserialize()?)
    }

    /// 기존 배포에서 쓰던 단일 환경 변수를 적용합니다.
    ///
    /// 빈 문자열은 무시합니다.
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("NEWS_API_KEY") {
            self.providers.news_api_key = Some(key);
        }
        if let Some(key) = get("ALPHA_VANTAGE_API_KEY") {
            self.providers.alpha_vantage_api_key = Some(key);
        }
        if let Some(url) = get("REDIS_URL") {
            self.redis.url = Some(url);
        }
        if let Some(secret) = get("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(host) = get("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("API_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// 개발용 JWT 시크릿을 그대로 쓰고 있는지 확인합니다.
    pub fn uses_dev_jwt_secret(&self) -> bool {
        self.auth.jwt_secret == DEV_JWT_SECRET
    }
}
