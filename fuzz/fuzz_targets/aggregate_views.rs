#![no_main]

use libfuzzer_sys::fuzz_target;
use weblens_analytics::{AccessLogParser, AnalyticsEngine};

fuzz_target!(|data: &[u8]| {
    let parser = AccessLogParser::new();
    let records = parser.parse_bytes(data);

    // 임의 입력에서 만들어진 레코드로도 전체 리포트 계산이 패닉 없이 끝나야 한다
    let engine = AnalyticsEngine::with_defaults();
    let report = engine.analyze(&records);

    // 기본 불변식: 전체 카운트 = 레코드 수, 상태 그룹 합 = 전체
    assert_eq!(report.total_requests, records.len() as u64);
    let sum: u64 = report.status_codes.iter().map(|g| g.count).sum();
    assert_eq!(sum, report.total_requests);
});
