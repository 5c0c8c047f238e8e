//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 모든 모듈이 공유하는 데이터 구조를 정의합니다.
//! 파서는 [`LogRecord`]를 생성하고, 집계 엔진은 이를 소비하여
//! [`AnalyticsReport`]를 만들고, 익스포터는 리포트를 직렬화합니다.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// 타임스탬프를 분 단위 버킷으로 자를 때의 접두어 길이
///
/// `YYYY-MM-DD HH:MM` = 16바이트. 이보다 짧은 타임스탬프는
/// 트래픽 추이 뷰에서 버킷을 갖지 않습니다.
pub const MINUTE_KEY_LEN: usize = 16;

/// 응답 상태 키
///
/// 정수 상태 코드 또는 파싱 불가 레코드를 위한 NULL 센티널입니다.
/// NULL은 독립된 동치류로, 어떤 정수 코드와도 같지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum StatusKey {
    /// HTTP 상태 코드 (예: 200, 404)
    Code(u16),
    /// 상태 필드가 없거나 정수로 파싱되지 않는 레코드의 버킷
    Null,
}

impl StatusKey {
    /// 원시 상태 필드에서 상태 키를 만듭니다.
    ///
    /// 빈 문자열과 정수가 아닌 값은 모두 [`StatusKey::Null`]로 수렴합니다.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<u16>() {
            Ok(code) => Self::Code(code),
            Err(_) => Self::Null,
        }
    }

    /// NULL 센티널 여부를 반환합니다.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// 정수 코드를 반환합니다 (NULL이면 None).
    pub fn as_code(&self) -> Option<u16> {
        match self {
            Self::Code(code) => Some(*code),
            Self::Null => None,
        }
    }
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Null => write!(f, "NULL"),
        }
    }
}

impl From<StatusKey> for String {
    fn from(key: StatusKey) -> Self {
        key.to_string()
    }
}

impl From<String> for StatusKey {
    fn from(raw: String) -> Self {
        if raw == "NULL" {
            Self::Null
        } else {
            Self::parse(&raw)
        }
    }
}

/// 로그 레코드
///
/// 관측된 HTTP 요청 한 건을 나타냅니다.
/// 파싱 시점에 한 번 생성되며, 집계는 레코드를 변경하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// 클라이언트 주소 (문자열 이상의 검증 없음)
    pub ip: String,
    /// 사전순 정렬 가능한 일시 표현 (예: "2024-02-01 10:15:01")
    pub timestamp: String,
    /// 요청 리소스 경로
    pub url: String,
    /// 응답 상태 (파싱 불가 시 NULL 센티널)
    pub status: StatusKey,
    /// 클라이언트 에이전트 헤더 원문
    pub user_agent: String,
}

impl LogRecord {
    /// 분 단위 시간 버킷 키를 반환합니다.
    ///
    /// 타임스탬프의 앞 16바이트(`YYYY-MM-DD HH:MM`)입니다.
    /// 16바이트보다 짧거나 경계가 문자 중간에 걸리면 None을 반환하며,
    /// 해당 레코드는 트래픽 추이 뷰에서만 제외됩니다.
    pub fn minute_key(&self) -> Option<&str> {
        self.timestamp.get(..MINUTE_KEY_LEN)
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} status={}",
            self.ip, self.timestamp, self.url, self.status,
        )
    }
}

// --- 결과 행 타입 ---
// 각 분석 뷰의 한 행입니다. 모든 카운트는 음수가 없는 정수이며
// 부동소수점 연산은 어디에도 없습니다.

/// 전체 요청 수 (단일 행 결과 집합)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalCount {
    /// 전체 레코드 수
    pub total_requests: u64,
}

/// 상태 분포의 한 행
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    /// 상태 키 (NULL 포함)
    pub status: StatusKey,
    /// 해당 상태의 레코드 수
    pub count: u64,
}

/// 방문 페이지 순위의 한 행
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCount {
    /// 리소스 경로
    pub url: String,
    /// 방문 수
    pub count: u64,
}

/// 에이전트 분포의 한 행
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCount {
    /// 클라이언트 에이전트 원문
    pub user_agent: String,
    /// 요청 수
    pub count: u64,
}

/// 의심 IP 탐지의 한 행
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspiciousIp {
    /// 클라이언트 주소
    pub ip: String,
    /// 실패 상태(기본 404/500) 요청 수
    pub failure_count: u64,
}

/// 트래픽 추이의 한 행
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteCount {
    /// 분 단위 버킷 키 (`YYYY-MM-DD HH:MM`)
    pub minute: String,
    /// 해당 분의 요청 수
    pub count: u64,
}

/// 리포트 메타데이터 — 분석 실행 한 번의 추적 정보
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// 리포트 고유 ID (UUID v4)
    pub report_id: String,
    /// 리포트 생성 시각
    pub generated_at: SystemTime,
    /// 입력 레코드 수
    pub record_count: u64,
}

impl ReportMeta {
    /// 새 UUID v4 리포트 ID로 메타데이터를 만듭니다.
    pub fn with_new_id(record_count: u64) -> Self {
        Self {
            report_id: uuid::Uuid::new_v4().to_string(),
            generated_at: SystemTime::now(),
            record_count,
        }
    }
}

/// 분석 리포트 — 여섯 개의 명명된 결과 집합
///
/// 한 번의 분석 실행이 생성하는 전체 출력입니다.
/// 생성 이후 불변이며, 동일한 입력에 대해 순차/병렬 실행 모두
/// 동일한 결과 집합을 만듭니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    /// 실행 메타데이터
    pub meta: ReportMeta,
    /// 전체 요청 수
    pub total_requests: u64,
    /// 상태 분포 (카운트 내림차순)
    pub status_codes: Vec<StatusCount>,
    /// 상위 N 방문 페이지 (카운트 내림차순)
    pub visited_pages: Vec<PageCount>,
    /// 에이전트 분포 (카운트 내림차순)
    pub traffic_sources: Vec<AgentCount>,
    /// 의심 IP (실패 수 내림차순)
    pub suspicious_ips: Vec<SuspiciousIp>,
    /// 분 단위 트래픽 추이 (시간 키 오름차순)
    pub traffic_trends: Vec<MinuteCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(timestamp: &str) -> LogRecord {
        LogRecord {
            ip: "192.168.1.1".to_owned(),
            timestamp: timestamp.to_owned(),
            url: "/home".to_owned(),
            status: StatusKey::Code(200),
            user_agent: "Chrome/90.0".to_owned(),
        }
    }

    #[test]
    fn status_key_parses_integer() {
        assert_eq!(StatusKey::parse("200"), StatusKey::Code(200));
        assert_eq!(StatusKey::parse(" 404 "), StatusKey::Code(404));
    }

    #[test]
    fn status_key_empty_and_garbage_are_null() {
        assert_eq!(StatusKey::parse(""), StatusKey::Null);
        assert_eq!(StatusKey::parse("abc"), StatusKey::Null);
        assert_eq!(StatusKey::parse("-1"), StatusKey::Null);
    }

    #[test]
    fn null_never_equals_a_code() {
        assert_ne!(StatusKey::Null, StatusKey::Code(0));
        assert!(StatusKey::Null.is_null());
        assert_eq!(StatusKey::Null.as_code(), None);
    }

    #[test]
    fn status_key_display() {
        assert_eq!(StatusKey::Code(404).to_string(), "404");
        assert_eq!(StatusKey::Null.to_string(), "NULL");
    }

    #[test]
    fn status_key_serde_round_trip() {
        let json = serde_json::to_string(&StatusKey::Code(500)).unwrap();
        assert_eq!(json, "\"500\"");
        let back: StatusKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StatusKey::Code(500));

        let null_json = serde_json::to_string(&StatusKey::Null).unwrap();
        assert_eq!(null_json, "\"NULL\"");
        let back: StatusKey = serde_json::from_str(&null_json).unwrap();
        assert_eq!(back, StatusKey::Null);
    }

    #[test]
    fn minute_key_truncates_to_16_bytes() {
        let rec = record("2024-02-01 10:15:01");
        assert_eq!(rec.minute_key(), Some("2024-02-01 10:15"));
    }

    #[test]
    fn minute_key_short_timestamp_is_none() {
        let rec = record("2024-02-01");
        assert_eq!(rec.minute_key(), None);
    }

    #[test]
    fn minute_key_exact_16_bytes() {
        let rec = record("2024-02-01 10:15");
        assert_eq!(rec.minute_key(), Some("2024-02-01 10:15"));
    }

    #[test]
    fn report_meta_ids_are_unique() {
        let a = ReportMeta::with_new_id(0);
        let b = ReportMeta::with_new_id(0);
        assert_ne!(a.report_id, b.report_id);
    }
}
