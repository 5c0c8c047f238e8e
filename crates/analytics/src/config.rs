//! 분석 엔진 설정
//!
//! [`EngineConfig`]는 core의 [`AnalyticsConfig`](weblens_core::config::AnalyticsConfig)를
//! 기반으로 엔진 전용 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use weblens_core::config::WeblensConfig;
//! use weblens_analytics::config::EngineConfig;
//!
//! let core_config = WeblensConfig::default();
//! let config = EngineConfig::from_core(&core_config.analytics);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// 분석 엔진 설정
///
/// core의 `AnalyticsConfig`에서 파생되며, 엔진 내부에서
/// 사용하는 형태(단일 바이트 구분자, 정렬된 실패 상태 집합)로 정규화합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 필드 구분자 (단일 바이트)
    pub delimiter: u8,
    /// 첫 줄을 헤더로 간주하고 건너뛸지 여부
    pub skip_header: bool,
    /// 방문 페이지 순위의 상위 N
    pub top_pages: usize,
    /// 의심 IP 탐지에 사용하는 실패 상태 집합
    pub failure_statuses: Vec<u16>,
    /// 의심 IP 판정 최소 실패 수 (이 값을 초과해야 탐지)
    pub min_failure_count: u64,
    /// 한 줄 최대 길이 (바이트, 초과분은 절단)
    pub max_line_length: usize,
    /// 뷰를 병렬 태스크로 계산할지 여부
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            skip_header: true,
            top_pages: 3,
            failure_statuses: vec![404, 500],
            min_failure_count: 3,
            max_line_length: 64 * 1024, // 64KB
            parallel: true,
        }
    }
}

impl EngineConfig {
    /// core의 `AnalyticsConfig`에서 엔진 설정을 생성합니다.
    ///
    /// core 쪽 검증이 끝난 설정을 기대하지만, 구분자가 단일 바이트가
    /// 아닌 경우에 대비해 기본 구분자로 방어합니다.
    pub fn from_core(core: &weblens_core::config::AnalyticsConfig) -> Self {
        let delimiter = core.delimiter.as_bytes().first().copied().unwrap_or(b',');
        Self {
            delimiter,
            skip_header: core.skip_header,
            top_pages: core.top_pages,
            failure_statuses: core.failure_statuses.clone(),
            min_failure_count: core.min_failure_count,
            max_line_length: core.max_line_length,
            parallel: core.parallel,
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        const MAX_TOP_PAGES: usize = 1000;
        const MAX_LINE_LENGTH_LIMIT: usize = 1024 * 1024; // 1MB

        if self.top_pages == 0 || self.top_pages > MAX_TOP_PAGES {
            return Err(AnalyticsError::Config {
                field: "top_pages".to_owned(),
                reason: format!("must be 1-{}", MAX_TOP_PAGES),
            });
        }

        if self.failure_statuses.is_empty() {
            return Err(AnalyticsError::Config {
                field: "failure_statuses".to_owned(),
                reason: "at least one failure status must be configured".to_owned(),
            });
        }

        for status in &self.failure_statuses {
            if !(100..=599).contains(status) {
                return Err(AnalyticsError::Config {
                    field: "failure_statuses".to_owned(),
                    reason: format!("status {} is outside the HTTP range 100-599", status),
                });
            }
        }

        if self.max_line_length == 0 || self.max_line_length > MAX_LINE_LENGTH_LIMIT {
            return Err(AnalyticsError::Config {
                field: "max_line_length".to_owned(),
                reason: format!("must be 1-{}", MAX_LINE_LENGTH_LIMIT),
            });
        }

        Ok(())
    }
}

/// 엔진 설정 빌더
#[derive(Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 필드 구분자를 설정합니다.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.config.delimiter = delimiter;
        self
    }

    /// 헤더 건너뛰기 여부를 설정합니다.
    pub fn skip_header(mut self, skip: bool) -> Self {
        self.config.skip_header = skip;
        self
    }

    /// 방문 페이지 순위 상위 N을 설정합니다.
    pub fn top_pages(mut self, n: usize) -> Self {
        self.config.top_pages = n;
        self
    }

    /// 실패 상태 집합을 설정합니다.
    pub fn failure_statuses(mut self, statuses: Vec<u16>) -> Self {
        self.config.failure_statuses = statuses;
        self
    }

    /// 의심 IP 판정 최소 실패 수를 설정합니다.
    pub fn min_failure_count(mut self, count: u64) -> Self {
        self.config.min_failure_count = count;
        self
    }

    /// 한 줄 최대 길이를 설정합니다.
    pub fn max_line_length(mut self, length: usize) -> Self {
        self.config.max_line_length = length;
        self
    }

    /// 병렬 실행 여부를 설정합니다.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// 설정을 검증하고 `EngineConfig`를 생성합니다.
    pub fn build(self) -> Result<EngineConfig, AnalyticsError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
