//! 접근 로그 파서 -- 구분자 텍스트를 [`LogRecord`]로 변환합니다.
//!
//! 다섯 개의 위치 필드(ip, timestamp, url, status, user_agent)를 기대하며,
//! 손상된 행도 버리지 않습니다:
//! - 필드가 모자라면 빈 문자열 / NULL 센티널로 채워 레코드를 만듭니다.
//! - 상태 필드가 비어 있거나 정수가 아니면 NULL 센티널이 됩니다.
//! - user_agent 안의 구분자(여섯 번째 이후 필드)는 user_agent에 그대로 합쳐집니다.
//!
//! 행 단위 파싱은 절대 실패하지 않으며, 스트림 수준 I/O 실패만
//! [`AnalyticsError::Io`]로 전파됩니다.

use std::io::BufRead;

use bytes::Bytes;
use metrics::counter;

use weblens_core::metrics::{ANALYTICS_RECORDS_PARSED_TOTAL, ANALYTICS_RECORDS_RECOVERED_TOTAL};
use weblens_core::pipeline::RecordParser;
use weblens_core::types::{LogRecord, StatusKey};

use crate::config::EngineConfig;
use crate::error::AnalyticsError;

/// 레코드당 위치 필드 수
const FIELD_COUNT: usize = 5;

/// 읽어들인 원시 한 줄
///
/// 리더가 생성하고 파서가 소비하는 중간 데이터 형식입니다.
/// 행 번호는 복구 로그에 사용됩니다 (1부터 시작).
#[derive(Debug, Clone)]
pub struct RawLine {
    /// 원시 라인 바이트 (개행 제외)
    pub data: Bytes,
    /// 입력 내 행 번호 (1부터 시작)
    pub number: usize,
}

impl RawLine {
    /// 새 RawLine을 생성합니다.
    pub fn new(data: Bytes, number: usize) -> Self {
        Self { data, number }
    }
}

/// 접근 로그 파서
///
/// core의 [`RecordParser`] trait을 구현하여 구분자 텍스트 한 줄을
/// `LogRecord`로 변환합니다.
///
/// ## 복구 규칙
/// - 필드 부족: 빈 문자열 / NULL 센티널로 채움
/// - 상태 파싱 불가: NULL 센티널
/// - 최대 길이 초과: 한도까지 절단 후 파싱
/// - UTF-8이 아닌 바이트: lossy 변환
pub struct AccessLogParser {
    /// 필드 구분자 (단일 바이트)
    delimiter: u8,
    /// 첫 줄을 헤더로 간주하고 건너뛸지 여부 (배치 진입점에서만 사용)
    skip_header: bool,
    /// 한 줄 최대 길이 (바이트)
    max_line_length: usize,
}

impl AccessLogParser {
    /// 기본 설정(쉼표 구분, 헤더 건너뜀, 64KB 한도)으로 파서를 생성합니다.
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            skip_header: true,
            max_line_length: 64 * 1024, // 64KB
        }
    }

    /// 엔진 설정에서 파서를 생성합니다.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            delimiter: config.delimiter,
            skip_header: config.skip_header,
            max_line_length: config.max_line_length,
        }
    }

    /// 필드 구분자를 설정합니다.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// 헤더 건너뛰기 여부를 설정합니다.
    pub fn with_skip_header(mut self, skip: bool) -> Self {
        self.skip_header = skip;
        self
    }

    /// 최대 입력 크기를 설정합니다.
    pub fn with_max_line_length(mut self, length: usize) -> Self {
        self.max_line_length = length;
        self
    }

    /// 원시 한 줄을 파싱하며 행 번호를 복구 로그에 남깁니다.
    pub fn parse_raw(&self, line: &RawLine) -> LogRecord {
        let (record, recovered) = self.parse_inner(&line.data);
        if recovered {
            tracing::debug!(line = line.number, "recovered malformed record");
        }
        record
    }

    /// 메모리 상의 전체 입력을 줄 단위로 파싱합니다.
    ///
    /// `skip_header`가 설정되어 있으면 첫 줄을 건너뜁니다.
    /// 마지막 개행 뒤의 빈 조각은 레코드가 되지 않습니다.
    pub fn parse_bytes(&self, data: &[u8]) -> Vec<LogRecord> {
        let mut records = Vec::new();
        for (idx, line) in data.split(|&b| b == b'\n').enumerate() {
            if idx == 0 && self.skip_header {
                continue;
            }
            if line.is_empty() || line == b"\r" {
                continue;
            }
            let raw = RawLine::new(Bytes::copy_from_slice(line), idx + 1);
            records.push(self.parse_raw(&raw));
        }
        records
    }

    /// 리더에서 줄 단위로 레코드를 읽습니다.
    ///
    /// 스트림 수준 I/O 실패만 에러입니다. 손상된 행은 복구되어
    /// 레코드가 되고, 빈 행은 건너뜁니다.
    pub fn read_records<R: BufRead>(&self, mut reader: R) -> Result<Vec<LogRecord>, AnalyticsError> {
        let mut records = Vec::new();
        let mut buf = Vec::new();
        let mut number = 0usize;

        loop {
            buf.clear();
            let read = reader.read_until(b'\n', &mut buf)?;
            if read == 0 {
                break;
            }
            number += 1;

            if number == 1 && self.skip_header {
                continue;
            }

            // 개행 제거
            while buf.last() == Some(&b'\n') || buf.last() == Some(&b'\r') {
                buf.pop();
            }
            if buf.is_empty() {
                continue;
            }

            let raw = RawLine::new(Bytes::copy_from_slice(&buf), number);
            records.push(self.parse_raw(&raw));
        }

        Ok(records)
    }

    /// 한 줄을 파싱하고 복구 발생 여부를 함께 반환합니다.
    fn parse_inner(&self, raw: &[u8]) -> (LogRecord, bool) {
        // 한도 초과분은 절단 후 파싱 (행 자체는 버리지 않음)
        let raw = if raw.len() > self.max_line_length {
            &raw[..self.max_line_length]
        } else {
            raw
        };

        let input = String::from_utf8_lossy(raw);
        let input = input.trim_end_matches(['\r', '\n']);

        let mut fields = input.splitn(FIELD_COUNT, self.delimiter as char);
        let ip = fields.next().unwrap_or_default();
        let timestamp = fields.next();
        let url = fields.next();
        let status = fields.next();
        let user_agent = fields.next();

        let short = user_agent.is_none();
        let status_key = status.map_or(StatusKey::Null, StatusKey::parse);
        let recovered = short || (status.is_some() && status_key.is_null());

        counter!(ANALYTICS_RECORDS_PARSED_TOTAL).increment(1);
        if recovered {
            counter!(ANALYTICS_RECORDS_RECOVERED_TOTAL).increment(1);
        }

        let record = LogRecord {
            ip: ip.to_owned(),
            timestamp: timestamp.unwrap_or_default().to_owned(),
            url: url.unwrap_or_default().to_owned(),
            status: status_key,
            user_agent: user_agent.unwrap_or_default().to_owned(),
        };
        (record, recovered)
    }
}

impl Default for AccessLogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordParser for AccessLogParser {
    fn format_name(&self) -> &str {
        "access_log"
    }

    fn parse_record(&self, raw: &[u8]) -> LogRecord {
        self.parse_inner(raw).0
    }
}
