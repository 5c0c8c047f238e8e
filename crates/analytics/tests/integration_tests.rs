//! 통합 테스트 -- 파싱부터 내보내기까지 전체 흐름 검증
//!
//! 이 파일은 원시 로그 텍스트 입력부터 여섯 개 결과 집합 파일
//! 생성까지의 전체 파이프라인을 검증합니다.

use std::fs;
use std::io::BufReader;

use weblens_core::pipeline::{ALL_VIEWS, Exporter};
use weblens_core::types::StatusKey;
use weblens_analytics::{
    AccessLogParser, AnalyticsEngine, CsvExporter, EngineConfig, EngineConfigBuilder, JsonExporter,
};

/// 명세의 참조 시나리오 입력 (헤더 포함)
const REFERENCE_INPUT: &str = "\
ip,timestamp,url,status,user_agent
192.168.1.1,2024-02-01 10:15:01,/home,200,Chrome/90.0
192.168.1.1,2024-02-01 10:15:05,/home,404,Chrome/90.0
192.168.1.1,2024-02-01 10:16:00,/home,404,Chrome/90.0
";

/// 파서 → 엔진 흐름: 참조 시나리오
#[test]
fn test_reference_scenario_end_to_end() {
    let parser = AccessLogParser::new();
    let records = parser.parse_bytes(REFERENCE_INPUT.as_bytes());
    assert_eq!(records.len(), 3);

    let engine = AnalyticsEngine::with_defaults();
    let report = engine.analyze(&records);

    // total-count = 3
    assert_eq!(report.total_requests, 3);

    // status distribution {404:2, 200:1}
    assert_eq!(report.status_codes.len(), 2);
    assert_eq!(report.status_codes[0].status, StatusKey::Code(404));
    assert_eq!(report.status_codes[0].count, 2);

    // visited-pages top = (/home, 3)
    assert_eq!(report.visited_pages[0].url, "/home");
    assert_eq!(report.visited_pages[0].count, 3);

    // suspicious-IPs with threshold >3 = empty (count 2)
    assert!(report.suspicious_ips.is_empty());

    // traffic-trend = [(10:15, 2), (10:16, 1)]
    assert_eq!(report.traffic_trends.len(), 2);
    assert_eq!(report.traffic_trends[0].minute, "2024-02-01 10:15");
    assert_eq!(report.traffic_trends[0].count, 2);
    assert_eq!(report.traffic_trends[1].minute, "2024-02-01 10:16");
    assert_eq!(report.traffic_trends[1].count, 1);
}

/// 파일 리더 → 파서 → 엔진 → CSV 익스포터 전체 흐름
#[test]
fn test_file_to_csv_export_flow() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let input_path = dir.path().join("access.log");
    fs::write(&input_path, REFERENCE_INPUT).expect("failed to write input");

    let parser = AccessLogParser::new();
    let file = fs::File::open(&input_path).expect("failed to open input");
    let records = parser
        .read_records(BufReader::new(file))
        .expect("read_records should succeed");
    assert_eq!(records.len(), 3);

    let engine = AnalyticsEngine::with_defaults();
    let report = engine.analyze(&records);

    let out_dir = dir.path().join("out");
    let exporter = CsvExporter::new(&out_dir);
    exporter.export(&report).expect("export should succeed");

    for name in ALL_VIEWS {
        assert!(
            out_dir.join(format!("{name}.csv")).exists(),
            "missing result set {name}"
        );
    }

    let total = fs::read_to_string(out_dir.join("total_requests.csv")).unwrap();
    assert!(total.contains('3'));
}

/// 병렬 실행 → JSON 익스포터 흐름
#[tokio::test(flavor = "multi_thread")]
async fn test_parallel_to_json_export_flow() {
    let parser = AccessLogParser::new();
    let records = parser.parse_bytes(REFERENCE_INPUT.as_bytes());

    let engine = AnalyticsEngine::with_defaults();
    let report = engine
        .analyze_parallel(records)
        .await
        .expect("parallel analyze should succeed");

    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let exporter = JsonExporter::new(dir.path());
    exporter.export(&report).expect("export should succeed");

    let trends = fs::read_to_string(dir.path().join("traffic_trends.json")).unwrap();
    let parsed: Vec<weblens_core::types::MinuteCount> =
        serde_json::from_str(&trends).expect("trends should parse");
    assert_eq!(parsed.len(), 2);
    assert!(parsed[0].minute < parsed[1].minute);
}

/// 손상 입력 복구: 빈 상태 필드는 NULL 그룹으로 집계
#[test]
fn test_empty_status_counted_under_null() {
    let input = "\
ip,timestamp,url,status,user_agent
10.0.0.1,2024-02-01 10:15:01,/login,,curl/8.0
10.0.0.1,2024-02-01 10:15:02,/login,200,curl/8.0
";
    let parser = AccessLogParser::new();
    let records = parser.parse_bytes(input.as_bytes());
    assert_eq!(records.len(), 2);

    let engine = AnalyticsEngine::with_defaults();
    let report = engine.analyze(&records);

    assert_eq!(report.total_requests, 2);
    let null_group = report
        .status_codes
        .iter()
        .find(|g| g.status == StatusKey::Null)
        .expect("NULL group should exist");
    assert_eq!(null_group.count, 1);
}

/// 손상 입력 복구: 필드 부족 행도 레코드가 된다
#[test]
fn test_truncated_rows_still_counted() {
    let input = "\
ip,timestamp,url,status,user_agent
10.0.0.1,2024-02-01 10:15:01
10.0.0.2,2024-02-01 10:15:02,/home,200,curl/8.0
";
    let parser = AccessLogParser::new();
    let records = parser.parse_bytes(input.as_bytes());

    // 두 행 모두 레코드가 되어야 한다 (하나는 복구됨)
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].status, StatusKey::Null);
    assert_eq!(records[0].url, "");

    let engine = AnalyticsEngine::with_defaults();
    let report = engine.analyze(&records);
    assert_eq!(report.total_requests, 2);
}

/// 빈 입력: 모든 뷰가 빈 결과, 에러 없음
#[test]
fn test_empty_input_produces_empty_views() {
    let parser = AccessLogParser::new();
    let records = parser.parse_bytes(b"");

    let engine = AnalyticsEngine::with_defaults();
    let report = engine.analyze(&records);

    assert_eq!(report.total_requests, 0);
    assert!(report.status_codes.is_empty());
    assert!(report.visited_pages.is_empty());
    assert!(report.traffic_sources.is_empty());
    assert!(report.suspicious_ips.is_empty());
    assert!(report.traffic_trends.is_empty());

    // 빈 리포트도 내보낼 수 있어야 한다
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let exporter = CsvExporter::new(dir.path());
    exporter.export(&report).expect("empty export should succeed");
}

/// 의심 IP 탐지: 임계값 초과 IP만, 실패 수 내림차순
#[test]
fn test_suspicious_ip_detection_flow() {
    let mut input = String::from("ip,timestamp,url,status,user_agent\n");
    // 10.0.0.1: 404 x 5 (탐지)
    for i in 0..5 {
        input.push_str(&format!(
            "10.0.0.1,2024-02-01 10:1{i}:00,/missing,404,curl/8.0\n"
        ));
    }
    // 10.0.0.2: 500 x 4 (탐지)
    for i in 0..4 {
        input.push_str(&format!(
            "10.0.0.2,2024-02-01 10:1{i}:00,/err,500,curl/8.0\n"
        ));
    }
    // 10.0.0.3: 404 x 3 (임계값 초과 아님)
    for i in 0..3 {
        input.push_str(&format!(
            "10.0.0.3,2024-02-01 10:1{i}:00,/missing,404,curl/8.0\n"
        ));
    }
    // 10.0.0.4: 200 x 10 (실패 아님)
    for i in 0..10 {
        input.push_str(&format!(
            "10.0.0.4,2024-02-01 10:2{}:00,/home,200,curl/8.0\n",
            i % 10
        ));
    }

    let parser = AccessLogParser::new();
    let records = parser.parse_bytes(input.as_bytes());

    let engine = AnalyticsEngine::with_defaults();
    let report = engine.analyze(&records);

    assert_eq!(report.suspicious_ips.len(), 2);
    assert_eq!(report.suspicious_ips[0].ip, "10.0.0.1");
    assert_eq!(report.suspicious_ips[0].failure_count, 5);
    assert_eq!(report.suspicious_ips[1].ip, "10.0.0.2");
    assert_eq!(report.suspicious_ips[1].failure_count, 4);
}

/// 설정 변형: 구분자/상위 N/실패 집합 커스터마이즈
#[test]
fn test_custom_config_flow() {
    let input = "\
10.0.0.1;2024-02-01 10:15:01;/a;403;curl/8.0
10.0.0.1;2024-02-01 10:15:02;/b;403;curl/8.0
10.0.0.1;2024-02-01 10:15:03;/a;403;curl/8.0
";
    let config = EngineConfigBuilder::new()
        .delimiter(b';')
        .skip_header(false)
        .top_pages(1)
        .failure_statuses(vec![403])
        .min_failure_count(2)
        .build()
        .expect("config should build");

    let parser = AccessLogParser::from_config(&config);
    let records = parser.parse_bytes(input.as_bytes());
    assert_eq!(records.len(), 3);

    let engine = AnalyticsEngine::new(config).expect("engine should build");
    let report = engine.analyze(&records);

    assert_eq!(report.visited_pages.len(), 1);
    assert_eq!(report.visited_pages[0].url, "/a");
    assert_eq!(report.suspicious_ips.len(), 1);
    assert_eq!(report.suspicious_ips[0].failure_count, 3);
}

/// 같은 출력 디렉토리에 두 번 내보내면 이전 내용이 대체된다
#[test]
fn test_export_overwrite_semantics() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let exporter = CsvExporter::new(dir.path());

    let parser = AccessLogParser::new();
    let engine = AnalyticsEngine::with_defaults();

    let first = engine.analyze(&parser.parse_bytes(REFERENCE_INPUT.as_bytes()));
    exporter.export(&first).expect("first export");

    let second_input = "\
ip,timestamp,url,status,user_agent
10.9.9.9,2024-03-01 00:00:00,/other,301,wget/1.0
";
    let second = engine.analyze(&parser.parse_bytes(second_input.as_bytes()));
    exporter.export(&second).expect("second export");

    let pages = fs::read_to_string(dir.path().join("visited_pages.csv")).unwrap();
    assert!(pages.contains("/other"));
    assert!(!pages.contains("/home"));

    let total = fs::read_to_string(dir.path().join("total_requests.csv")).unwrap();
    let mut lines = total.lines();
    assert_eq!(lines.next(), Some("total_requests"));
    assert_eq!(lines.next(), Some("1"));
}

/// 순차/병렬 실행 결과는 항상 동일하다 (멱등성)
#[tokio::test(flavor = "multi_thread")]
async fn test_sequential_and_parallel_agree_on_larger_batch() {
    let mut input = String::from("ip,timestamp,url,status,user_agent\n");
    for i in 0..500 {
        input.push_str(&format!(
            "10.0.{}.{},2024-02-01 {:02}:{:02}:00,/page{},{},agent-{}\n",
            i % 7,
            i % 13,
            10 + (i % 3),
            i % 60,
            i % 11,
            [200, 404, 500, 302][i % 4],
            i % 5,
        ));
    }

    let parser = AccessLogParser::new();
    let records = parser.parse_bytes(input.as_bytes());
    assert_eq!(records.len(), 500);

    let config = EngineConfig {
        top_pages: 5,
        ..Default::default()
    };
    let engine = AnalyticsEngine::new(config).expect("engine should build");

    let sequential = engine.analyze(&records);
    let parallel = engine
        .analyze_parallel(records)
        .await
        .expect("parallel should succeed");

    assert_eq!(sequential.total_requests, parallel.total_requests);
    assert_eq!(sequential.status_codes, parallel.status_codes);
    assert_eq!(sequential.visited_pages, parallel.visited_pages);
    assert_eq!(sequential.traffic_sources, parallel.traffic_sources);
    assert_eq!(sequential.suspicious_ips, parallel.suspicious_ips);
    assert_eq!(sequential.traffic_trends, parallel.traffic_trends);
}
