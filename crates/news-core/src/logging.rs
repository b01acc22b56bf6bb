//! tracing 기반 로깅 초기화.
//!
//! 출력 형식은 `pretty`(개발), `json`(로그 수집기), `compact`(한 줄) 세 가지입니다.
//! 필터는 `RUST_LOG` → `[logging].level` 순으로 결정됩니다.

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

use crate::config::LoggingConfig;

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
            Self::Compact => "compact",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(format!("Unknown log format: {}", other)),
        }
    }
}

/// 로깅 초기화 옵션.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `EnvFilter` 지시어 (예: "news_api=debug,tower_http=info")
    pub level: String,
    pub format: LogFormat,
    /// span 생성/종료 이벤트 출력
    pub span_events: bool,
    /// 소스 파일과 줄 번호 출력
    pub source_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            span_events: false,
            source_location: false,
        }
    }
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// `[logging]` 설정 섹션에서 생성합니다.
    ///
    /// `LOG_FORMAT` 환경 변수가 설정 파일보다 우선하며, 읽을 수 없는 값은 pretty가 됩니다.
    pub fn from_settings(settings: &LoggingConfig) -> Self {
        Self::resolve(settings, std::env::var("LOG_FORMAT").ok())
    }

    fn resolve(settings: &LoggingConfig, format_override: Option<String>) -> Self {
        let format = format_override
            .and_then(|s| s.parse().ok())
            .or_else(|| settings.format.parse().ok())
            .unwrap_or_default();

        Self::new(settings.level.clone()).with_format(format)
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let spans = if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let base = tracing_subscriber::fmt::layer()
            .with_file(self.source_location)
            .with_line_number(self.source_location)
            .with_span_events(spans);

        match self.format {
            LogFormat::Pretty => base.pretty().boxed(),
            LogFormat::Json => base.json().boxed(),
            LogFormat::Compact => base.compact().boxed(),
        }
    }
}

/// 전역 subscriber를 설치합니다. 두 번째 호출은 에러입니다.
///
/// ```no_run
/// use news_core::logging::{init_logging, LogConfig, LogFormat};
///
/// init_logging(LogConfig::new("news_api=debug,info").with_format(LogFormat::Json)).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    tracing_subscriber::registry()
        .with(config.fmt_layer())
        .with(filter)
        .try_init()?;

    tracing::info!(format = %config.format, level = %config.level, "Logging initialized");
    Ok(())
}
