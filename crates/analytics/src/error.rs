//! 분석 엔진 에러 타입
//!
//! [`AnalyticsError`]는 분석 엔진 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<AnalyticsError> for WeblensError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 행 단위 파싱 실패는 에러가 아닙니다: 손상된 행은 파서 경계에서
//! 센티널 값으로 복구되며 이 타입으로 표현되지 않습니다.

use weblens_core::error::{AggregateError, ConfigError, ExportError, WeblensError};

/// 분석 엔진 도메인 에러
///
/// 설정 검증, 병렬 태스크 조인, 결과 내보내기, 스트림 I/O 등
/// 엔진 내부의 모든 에러 상황을 포괄합니다.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 뷰 계산 태스크 실패 (병렬 실행 시 조인 실패)
    #[error("view task failed: {view}: {reason}")]
    Task {
        /// 실패한 뷰 이름
        view: String,
        /// 실패 사유
        reason: String,
    },

    /// 결과 집합 내보내기 실패
    #[error("export error: {name}: {reason}")]
    Export {
        /// 논리 출력 이름
        name: String,
        /// 실패 사유
        reason: String,
    },

    /// 입력 스트림 또는 출력 대상의 I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AnalyticsError> for WeblensError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::Config { field, reason } => {
                WeblensError::Config(ConfigError::InvalidValue { field, reason })
            }
            AnalyticsError::Task { view, reason } => {
                WeblensError::Aggregate(AggregateError::TaskFailed { view, reason })
            }
            AnalyticsError::Export { name, reason } => {
                WeblensError::Export(ExportError::Sink { name, reason })
            }
            AnalyticsError::Io(e) => WeblensError::Io(e),
        }
    }
}
