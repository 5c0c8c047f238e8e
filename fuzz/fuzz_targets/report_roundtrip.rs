#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use weblens_core::types::{
    AgentCount, AnalyticsReport, MinuteCount, PageCount, ReportMeta, StatusCount, StatusKey,
    SuspiciousIp,
};

/// 퍼저용 구조적 리포트 입력
#[derive(Arbitrary, Debug)]
struct FuzzReport {
    statuses: Vec<(Option<u16>, u64)>,
    pages: Vec<(String, u64)>,
    agents: Vec<(String, u64)>,
    ips: Vec<(String, u64)>,
    minutes: Vec<(String, u64)>,
}

fuzz_target!(|input: FuzzReport| {
    // 그룹 수 제한 (퍼징 성능)
    let status_codes: Vec<StatusCount> = input
        .statuses
        .iter()
        .take(64)
        .map(|(code, count)| StatusCount {
            status: code.map_or(StatusKey::Null, StatusKey::Code),
            count: *count,
        })
        .collect();
    let total: u64 = status_codes.iter().map(|g| g.count).fold(0, u64::wrapping_add);

    let report = AnalyticsReport {
        meta: ReportMeta::with_new_id(total),
        total_requests: total,
        status_codes,
        visited_pages: input
            .pages
            .iter()
            .take(64)
            .map(|(url, count)| PageCount {
                url: url.clone(),
                count: *count,
            })
            .collect(),
        traffic_sources: input
            .agents
            .iter()
            .take(64)
            .map(|(user_agent, count)| AgentCount {
                user_agent: user_agent.clone(),
                count: *count,
            })
            .collect(),
        suspicious_ips: input
            .ips
            .iter()
            .take(64)
            .map(|(ip, count)| SuspiciousIp {
                ip: ip.clone(),
                failure_count: *count,
            })
            .collect(),
        traffic_trends: input
            .minutes
            .iter()
            .take(64)
            .map(|(minute, count)| MinuteCount {
                minute: minute.clone(),
                count: *count,
            })
            .collect(),
    };

    // JSON 직렬화 + 재파싱 라운드트립이 항상 성립해야 한다
    let json = serde_json::to_string(&report).expect("report must serialize to JSON");
    let back: AnalyticsReport =
        serde_json::from_str(&json).expect("serialized report must parse back");

    assert_eq!(back.total_requests, report.total_requests);
    assert_eq!(back.status_codes, report.status_codes);
    assert_eq!(back.visited_pages, report.visited_pages);
});
