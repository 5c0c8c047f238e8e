#![no_main]

use libfuzzer_sys::fuzz_target;
use weblens_analytics::AccessLogParser;
use weblens_core::pipeline::RecordParser;

fuzz_target!(|data: &[u8]| {
    let parser = AccessLogParser::new();

    // 행 단위 파싱은 어떤 입력에도 패닉 없이 레코드를 만들어야 한다
    let _ = parser.parse_record(data);

    // 배치 파싱도 임의 바이트에서 패닉이 없어야 한다
    let _ = parser.parse_bytes(data);
});
