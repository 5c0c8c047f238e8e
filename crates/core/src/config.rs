//! 설정 관리 — weblens.toml 파싱 및 런타임 설정
//!
//! [`WeblensConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`WEBLENS_ANALYTICS_TOP_PAGES=5` 형식)
//! 3. 설정 파일 (`weblens.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), weblens_core::error::WeblensError> {
//! use weblens_core::config::WeblensConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = WeblensConfig::load("weblens.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = WeblensConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, WeblensError};

/// Weblens 통합 설정
///
/// `weblens.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeblensConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 분석 엔진 설정
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

impl WeblensConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, WeblensError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, WeblensError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WeblensError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                WeblensError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, WeblensError> {
        toml::from_str(toml_str).map_err(|e| {
            WeblensError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `WEBLENS_{SECTION}_{FIELD}`
    /// 예: `WEBLENS_ANALYTICS_TOP_PAGES=5`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "WEBLENS_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "WEBLENS_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.output_dir, "WEBLENS_GENERAL_OUTPUT_DIR");

        // Analytics
        override_string(&mut self.analytics.delimiter, "WEBLENS_ANALYTICS_DELIMITER");
        override_bool(
            &mut self.analytics.skip_header,
            "WEBLENS_ANALYTICS_SKIP_HEADER",
        );
        override_usize(&mut self.analytics.top_pages, "WEBLENS_ANALYTICS_TOP_PAGES");
        override_u16_csv(
            &mut self.analytics.failure_statuses,
            "WEBLENS_ANALYTICS_FAILURE_STATUSES",
        );
        override_u64(
            &mut self.analytics.min_failure_count,
            "WEBLENS_ANALYTICS_MIN_FAILURE_COUNT",
        );
        override_usize(
            &mut self.analytics.max_line_length,
            "WEBLENS_ANALYTICS_MAX_LINE_LENGTH",
        );
        override_bool(&mut self.analytics.parallel, "WEBLENS_ANALYTICS_PARALLEL");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), WeblensError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.general.output_dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "general.output_dir".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        // 구분자는 단일 바이트여야 함 (필드 분할 기준)
        if self.analytics.delimiter.len() != 1 {
            return Err(ConfigError::InvalidValue {
                field: "analytics.delimiter".to_owned(),
                reason: format!(
                    "must be exactly one byte, got '{}'",
                    self.analytics.delimiter
                ),
            }
            .into());
        }

        const MAX_TOP_PAGES: usize = 1000;
        if self.analytics.top_pages == 0 || self.analytics.top_pages > MAX_TOP_PAGES {
            return Err(ConfigError::InvalidValue {
                field: "analytics.top_pages".to_owned(),
                reason: format!("must be 1-{}", MAX_TOP_PAGES),
            }
            .into());
        }

        if self.analytics.failure_statuses.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "analytics.failure_statuses".to_owned(),
                reason: "at least one failure status must be configured".to_owned(),
            }
            .into());
        }

        for status in &self.analytics.failure_statuses {
            if !(100..=599).contains(status) {
                return Err(ConfigError::InvalidValue {
                    field: "analytics.failure_statuses".to_owned(),
                    reason: format!("status {} is outside the HTTP range 100-599", status),
                }
                .into());
            }
        }

        const MAX_LINE_LENGTH_LIMIT: usize = 1024 * 1024; // 1MB
        if self.analytics.max_line_length == 0
            || self.analytics.max_line_length > MAX_LINE_LENGTH_LIMIT
        {
            return Err(ConfigError::InvalidValue {
                field: "analytics.max_line_length".to_owned(),
                reason: format!("must be 1-{}", MAX_LINE_LENGTH_LIMIT),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 결과 집합 출력 디렉토리
    pub output_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            output_dir: "./weblens-out".to_owned(),
        }
    }
}

/// 분석 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// 필드 구분자 (단일 바이트, 기본 ",")
    pub delimiter: String,
    /// 첫 줄을 헤더로 간주하고 건너뛸지 여부
    pub skip_header: bool,
    /// 방문 페이지 순위의 상위 N
    pub top_pages: usize,
    /// 의심 IP 탐지에 사용하는 실패 상태 집합
    pub failure_statuses: Vec<u16>,
    /// 의심 IP 판정 최소 실패 수 (이 값을 초과해야 함)
    pub min_failure_count: u64,
    /// 한 줄 최대 길이 (바이트, 초과분은 절단)
    pub max_line_length: usize,
    /// 뷰를 병렬 태스크로 계산할지 여부
    pub parallel: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            delimiter: ",".to_owned(),
            skip_header: true,
            top_pages: 3,
            failure_statuses: vec![404, 500],
            min_failure_count: 3,
            max_line_length: 64 * 1024, // 64KB
            parallel: true,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_u16_csv(target: &mut Vec<u16>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        let parsed: Result<Vec<u16>, _> = val
            .split(',')
            .map(|s| s.trim().parse::<u16>())
            .collect();
        match parsed {
            Ok(list) => *target = list,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 list from env var, ignoring"
            ),
        }
    }
}
