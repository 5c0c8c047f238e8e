//! 에러 타입 — 도메인별 에러 정의

/// Weblens 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum WeblensError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 집계 실행 에러
    #[error("aggregate error: {0}")]
    Aggregate(#[from] AggregateError),

    /// 결과 내보내기 에러
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 집계 실행 에러
///
/// 뷰 계산 자체는 순수 함수라 실패하지 않습니다. 병렬 실행 시
/// 태스크 조인 실패만 이 범주에 속합니다.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// 뷰 계산 태스크 실패 (패닉, 취소 등)
    #[error("view task failed: {view}: {reason}")]
    TaskFailed { view: String, reason: String },
}

/// 결과 내보내기 에러
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// 결과 집합 직렬화 실패
    #[error("failed to serialize result set '{name}': {reason}")]
    Serialize { name: String, reason: String },

    /// 출력 대상 쓰기 실패
    #[error("failed to write result set '{name}': {reason}")]
    Sink { name: String, reason: String },
}
