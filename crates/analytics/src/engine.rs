//! 분석 엔진 -- 여섯 개 뷰의 실행을 오케스트레이션합니다.
//!
//! [`AnalyticsEngine`]은 레코드 배치에서 파티션 인덱스를 구축하고
//! 여섯 개 뷰를 계산하여 [`AnalyticsReport`]를 만듭니다.
//!
//! # 실행 모델
//! 인제스트가 끝나면 레코드와 인덱스는 `Arc` 뒤에서 동결되고,
//! 각 뷰는 독립적인 tokio 태스크로 동시 실행됩니다. 쓰는 쪽이
//! 없으므로 읽기에 동기화가 필요 없습니다.
//!
//! ```text
//! Vec<LogRecord> -> PartitionIndex -> [6 view tasks] -> AnalyticsReport
//! ```
//!
//! 순차 실행([`AnalyticsEngine::analyze`])과 병렬 실행
//! ([`AnalyticsEngine::analyze_parallel`])은 동일한 리포트를 만듭니다.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};

use weblens_core::metrics::{
    ANALYTICS_RUN_DURATION_SECONDS, ANALYTICS_VIEWS_COMPUTED_TOTAL, LABEL_VIEW,
};
use weblens_core::pipeline::{
    VIEW_STATUS_CODES, VIEW_SUSPICIOUS_IPS, VIEW_TOTAL_REQUESTS, VIEW_TRAFFIC_SOURCES,
    VIEW_TRAFFIC_TRENDS, VIEW_VISITED_PAGES,
};
use weblens_core::types::{AnalyticsReport, LogRecord, ReportMeta};

use crate::aggregate;
use crate::config::EngineConfig;
use crate::error::AnalyticsError;
use crate::partition::PartitionIndex;

/// 뷰 계산 완료를 메트릭에 기록합니다.
fn mark_view(view: &'static str) {
    counter!(ANALYTICS_VIEWS_COMPUTED_TOTAL, LABEL_VIEW => view).increment(1);
}

/// 분석 엔진
///
/// 설정을 보관하고 레코드 배치를 리포트로 변환합니다.
/// 엔진 자체는 상태가 없으며(설정 제외) 같은 입력에 대해
/// 항상 같은 결과를 만듭니다.
pub struct AnalyticsEngine {
    /// 엔진 설정
    config: EngineConfig,
}

impl AnalyticsEngine {
    /// 설정을 검증하고 새 엔진을 생성합니다.
    pub fn new(config: EngineConfig) -> Result<Self, AnalyticsError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 기본 설정으로 엔진을 생성합니다.
    pub fn with_defaults() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// 엔진 설정에 대한 불변 참조를 반환합니다.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 여섯 개 뷰를 순차적으로 계산합니다.
    pub fn analyze(&self, records: &[LogRecord]) -> AnalyticsReport {
        let started = Instant::now();
        let index = PartitionIndex::build(records);

        let total_requests = aggregate::total_requests(records);
        mark_view(VIEW_TOTAL_REQUESTS);
        let status_codes = aggregate::status_distribution(records);
        mark_view(VIEW_STATUS_CODES);
        let visited_pages = aggregate::top_pages(records, self.config.top_pages);
        mark_view(VIEW_VISITED_PAGES);
        let traffic_sources = aggregate::agent_distribution(records);
        mark_view(VIEW_TRAFFIC_SOURCES);
        let suspicious_ips = aggregate::suspicious_ips(
            records,
            &index,
            &self.config.failure_statuses,
            self.config.min_failure_count,
        );
        mark_view(VIEW_SUSPICIOUS_IPS);
        let traffic_trends = aggregate::traffic_trend(records);
        mark_view(VIEW_TRAFFIC_TRENDS);

        let report = AnalyticsReport {
            meta: ReportMeta::with_new_id(total_requests),
            total_requests,
            status_codes,
            visited_pages,
            traffic_sources,
            suspicious_ips,
            traffic_trends,
        };

        let elapsed = started.elapsed().as_secs_f64();
        histogram!(ANALYTICS_RUN_DURATION_SECONDS).record(elapsed);
        tracing::info!(
            records = report.total_requests,
            partitions = index.partition_count(),
            "analytics report computed"
        );
        report
    }

    /// 여섯 개 뷰를 tokio 태스크로 동시 계산합니다.
    ///
    /// 레코드와 파티션 인덱스는 `Arc` 뒤에서 읽기 전용으로 공유됩니다.
    /// 결과는 순차 실행과 동일합니다.
    pub async fn analyze_parallel(
        &self,
        records: Vec<LogRecord>,
    ) -> Result<AnalyticsReport, AnalyticsError> {
        let started = Instant::now();
        let records: Arc<[LogRecord]> = records.into();
        let index = Arc::new(PartitionIndex::build(&records));

        let total_requests = aggregate::total_requests(&records);
        mark_view(VIEW_TOTAL_REQUESTS);

        let status_task = {
            let records = Arc::clone(&records);
            tokio::task::spawn_blocking(move || aggregate::status_distribution(&records))
        };
        let pages_task = {
            let records = Arc::clone(&records);
            let top_n = self.config.top_pages;
            tokio::task::spawn_blocking(move || aggregate::top_pages(&records, top_n))
        };
        let agents_task = {
            let records = Arc::clone(&records);
            tokio::task::spawn_blocking(move || aggregate::agent_distribution(&records))
        };
        let suspicious_task = {
            let records = Arc::clone(&records);
            let index = Arc::clone(&index);
            let statuses = self.config.failure_statuses.clone();
            let min_failures = self.config.min_failure_count;
            tokio::task::spawn_blocking(move || {
                aggregate::suspicious_ips(&records, &index, &statuses, min_failures)
            })
        };
        let trend_task = {
            let records = Arc::clone(&records);
            tokio::task::spawn_blocking(move || aggregate::traffic_trend(&records))
        };

        let status_codes = join_view(status_task, VIEW_STATUS_CODES).await?;
        let visited_pages = join_view(pages_task, VIEW_VISITED_PAGES).await?;
        let traffic_sources = join_view(agents_task, VIEW_TRAFFIC_SOURCES).await?;
        let suspicious_ips = join_view(suspicious_task, VIEW_SUSPICIOUS_IPS).await?;
        let traffic_trends = join_view(trend_task, VIEW_TRAFFIC_TRENDS).await?;

        let report = AnalyticsReport {
            meta: ReportMeta::with_new_id(total_requests),
            total_requests,
            status_codes,
            visited_pages,
            traffic_sources,
            suspicious_ips,
            traffic_trends,
        };

        let elapsed = started.elapsed().as_secs_f64();
        histogram!(ANALYTICS_RUN_DURATION_SECONDS).record(elapsed);
        tracing::info!(
            records = report.total_requests,
            partitions = index.partition_count(),
            "analytics report computed (parallel)"
        );
        Ok(report)
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// 뷰 태스크를 조인하고 완료를 메트릭에 기록합니다.
async fn join_view<T>(
    task: tokio::task::JoinHandle<T>,
    view: &'static str,
) -> Result<T, AnalyticsError> {
    let result = task.await.map_err(|e| AnalyticsError::Task {
        view: view.to_owned(),
        reason: e.to_string(),
    })?;
    mark_view(view);
    Ok(result)
}
