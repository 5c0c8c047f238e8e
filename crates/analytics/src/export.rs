//! 결과 익스포터 -- 명명된 결과 집합을 안정적인 외부 형식으로 직렬화합니다.
//!
//! 여섯 개 뷰는 각각 논리 출력 이름(`total_requests`, `status_codes`,
//! `visited_pages`, `traffic_sources`, `suspicious_ips`, `traffic_trends`)으로
//! 출력 디렉토리에 파일 하나씩 기록됩니다.
//!
//! # 덮어쓰기 의미론
//! 같은 이름에 다시 쓰면 이전 내용을 완전히 대체합니다
//! (`File::create` 절단). 병합이나 추가는 없습니다.

use std::fs::File;
use std::path::{Path, PathBuf};

use metrics::counter;
use serde::Serialize;

use weblens_core::error::WeblensError;
use weblens_core::metrics::{EXPORT_RESULT_SETS_TOTAL, LABEL_FORMAT};
use weblens_core::pipeline::{
    Exporter, VIEW_STATUS_CODES, VIEW_SUSPICIOUS_IPS, VIEW_TOTAL_REQUESTS, VIEW_TRAFFIC_SOURCES,
    VIEW_TRAFFIC_TRENDS, VIEW_VISITED_PAGES,
};
use weblens_core::types::{AnalyticsReport, TotalCount};

use crate::error::AnalyticsError;

/// CSV 익스포터
///
/// 결과 집합마다 `<name>.csv` 파일을 만듭니다. 헤더 행을 포함하며
/// 필드 구분자는 설정 가능합니다 (기본 쉼표).
pub struct CsvExporter {
    /// 출력 디렉토리 (없으면 생성)
    output_dir: PathBuf,
    /// 출력 필드 구분자
    delimiter: u8,
}

impl CsvExporter {
    /// 새 CSV 익스포터를 생성합니다.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            delimiter: b',',
        }
    }

    /// 출력 필드 구분자를 설정합니다.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// 결과 집합 하나를 `<name>.csv`로 기록합니다.
    fn write_rows<T: Serialize>(&self, name: &str, rows: &[T]) -> Result<(), AnalyticsError> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(format!("{name}.csv"));
        // File::create가 기존 내용을 절단: 덮어쓰기 의미론
        let file = File::create(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(file);

        for row in rows {
            writer.serialize(row).map_err(|e| AnalyticsError::Export {
                name: name.to_owned(),
                reason: e.to_string(),
            })?;
        }
        writer.flush()?;

        counter!(EXPORT_RESULT_SETS_TOTAL, LABEL_FORMAT => "csv").increment(1);
        tracing::debug!(name, path = %path.display(), rows = rows.len(), "result set written");
        Ok(())
    }
}

impl Exporter for CsvExporter {
    fn format_name(&self) -> &str {
        "csv"
    }

    fn export(&self, report: &AnalyticsReport) -> Result<(), WeblensError> {
        self.write_rows(
            VIEW_TOTAL_REQUESTS,
            &[TotalCount {
                total_requests: report.total_requests,
            }],
        )?;
        self.write_rows(VIEW_STATUS_CODES, &report.status_codes)?;
        self.write_rows(VIEW_VISITED_PAGES, &report.visited_pages)?;
        self.write_rows(VIEW_TRAFFIC_SOURCES, &report.traffic_sources)?;
        self.write_rows(VIEW_SUSPICIOUS_IPS, &report.suspicious_ips)?;
        self.write_rows(VIEW_TRAFFIC_TRENDS, &report.traffic_trends)?;

        tracing::info!(dir = %self.output_dir.display(), "report exported as csv");
        Ok(())
    }
}

/// JSON 익스포터
///
/// 결과 집합마다 `<name>.json` 파일(정렬된 배열)을 만들고,
/// 실행 메타데이터를 `report.json`에 함께 기록합니다.
pub struct JsonExporter {
    /// 출력 디렉토리 (없으면 생성)
    output_dir: PathBuf,
}

impl JsonExporter {
    /// 새 JSON 익스포터를 생성합니다.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 값 하나를 `<name>.json`으로 기록합니다.
    fn write_value<T: Serialize>(&self, name: &str, value: &T) -> Result<(), AnalyticsError> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(format!("{name}.json"));
        // File::create가 기존 내용을 절단: 덮어쓰기 의미론
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(file, value).map_err(|e| AnalyticsError::Export {
            name: name.to_owned(),
            reason: e.to_string(),
        })?;

        counter!(EXPORT_RESULT_SETS_TOTAL, LABEL_FORMAT => "json").increment(1);
        tracing::debug!(name, path = %path.display(), "result set written");
        Ok(())
    }
}

impl Exporter for JsonExporter {
    fn format_name(&self) -> &str {
        "json"
    }

    fn export(&self, report: &AnalyticsReport) -> Result<(), WeblensError> {
        self.write_value(
            VIEW_TOTAL_REQUESTS,
            &TotalCount {
                total_requests: report.total_requests,
            },
        )?;
        self.write_value(VIEW_STATUS_CODES, &report.status_codes)?;
        self.write_value(VIEW_VISITED_PAGES, &report.visited_pages)?;
        self.write_value(VIEW_TRAFFIC_SOURCES, &report.traffic_sources)?;
        self.write_value(VIEW_SUSPICIOUS_IPS, &report.suspicious_ips)?;
        self.write_value(VIEW_TRAFFIC_TRENDS, &report.traffic_trends)?;
        self.write_value("report", &report.meta)?;

        tracing::info!(dir = %self.output_dir.display(), "report exported as json");
        Ok(())
    }
}

/// 출력 디렉토리에서 결과 집합 파일 경로를 계산합니다.
///
/// 존재 여부는 확인하지 않습니다.
pub fn result_set_path(output_dir: &Path, name: &str, format: &str) -> PathBuf {
    output_dir.join(format!("{name}.{format}"))
}
