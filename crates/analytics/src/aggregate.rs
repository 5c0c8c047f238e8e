//! 집계 뷰 -- 여섯 개의 분석 뷰를 순수 함수로 구현합니다.
//!
//! 각 뷰는 불변 레코드 컬렉션을 받아 정렬된 결과 컬렉션을 반환합니다.
//! 공유 가변 상태가 없어 병렬 실행과 단위 테스트가 자유롭습니다.
//!
//! # 정렬 규칙
//! - 트래픽 추이만 시간 키 오름차순 (시간순), 나머지는 모두 카운트 내림차순.
//! - 동일 카운트의 순서는 최초 등장 순서입니다. 결정적이지만
//!   외부 질의 엔진의 동작과의 일치를 보장하지는 않습니다.
//!
//! # 수치 규칙
//! 모든 카운트는 `u64`이며 부동소수점 연산은 없습니다.
//! 문자열 키 비교는 정규화 없는 바이트 단위 일치입니다.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;

use weblens_core::types::{
    AgentCount, LogRecord, MinuteCount, PageCount, StatusCount, StatusKey, SuspiciousIp,
};

use crate::partition::PartitionIndex;

/// 키 시퀀스를 세어 (키, 카운트) 목록을 최초 등장 순서로 반환합니다.
///
/// 이 순서가 이후 안정 정렬과 결합되어 동일 카운트 그룹의
/// 결정적 순서를 만듭니다.
fn count_by<K, I>(keys: I) -> Vec<(K, u64)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut counts: HashMap<K, u64> = HashMap::new();
    let mut order: Vec<K> = Vec::new();

    for key in keys {
        match counts.entry(key) {
            Entry::Occupied(mut occupied) => *occupied.get_mut() += 1,
            Entry::Vacant(vacant) => {
                order.push(vacant.key().clone());
                vacant.insert(1);
            }
        }
    }

    order
        .into_iter()
        .map(|key| {
            let count = counts[&key];
            (key, count)
        })
        .collect()
}

/// 카운트 내림차순 안정 정렬 (동률은 최초 등장 순서 유지)
fn sort_by_count_desc<K>(groups: &mut [(K, u64)]) {
    groups.sort_by(|a, b| b.1.cmp(&a.1));
}

/// 전체 요청 수를 반환합니다.
pub fn total_requests(records: &[LogRecord]) -> u64 {
    records.len() as u64
}

/// 상태 분포: 상태 키(NULL 포함)별 카운트, 내림차순.
pub fn status_distribution(records: &[LogRecord]) -> Vec<StatusCount> {
    let mut groups = count_by(records.iter().map(|r| r.status));
    sort_by_count_desc(&mut groups);
    groups
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect()
}

/// 방문 페이지 순위: url별 카운트 내림차순, 상위 N으로 절단.
///
/// 절단 경계의 동률은 최초 등장 순서로 결정됩니다.
pub fn top_pages(records: &[LogRecord], n: usize) -> Vec<PageCount> {
    let mut groups = count_by(records.iter().map(|r| r.url.clone()));
    sort_by_count_desc(&mut groups);
    groups.truncate(n);
    groups
        .into_iter()
        .map(|(url, count)| PageCount { url, count })
        .collect()
}

/// 에이전트 분포: user_agent별 카운트 내림차순, 절단 없음.
pub fn agent_distribution(records: &[LogRecord]) -> Vec<AgentCount> {
    let mut groups = count_by(records.iter().map(|r| r.user_agent.clone()));
    sort_by_count_desc(&mut groups);
    groups
        .into_iter()
        .map(|(user_agent, count)| AgentCount { user_agent, count })
        .collect()
}

/// 의심 IP 탐지: 실패 상태로 제한 후 IP별 카운트,
/// `min_failures` 초과만 남기고 내림차순 정렬.
///
/// 파티션 인덱스를 사용해 실패 상태 파티션만 스캔합니다.
pub fn suspicious_ips(
    records: &[LogRecord],
    index: &PartitionIndex,
    failure_statuses: &[u16],
    min_failures: u64,
) -> Vec<SuspiciousIp> {
    let keys: Vec<StatusKey> = failure_statuses
        .iter()
        .map(|&code| StatusKey::Code(code))
        .collect();
    let failures = index.select(records, &keys);

    let mut groups = count_by(failures.iter().map(|r| r.ip.clone()));
    groups.retain(|(_, count)| *count > min_failures);
    sort_by_count_desc(&mut groups);
    groups
        .into_iter()
        .map(|(ip, failure_count)| SuspiciousIp { ip, failure_count })
        .collect()
}

/// 트래픽 추이: 분 단위 버킷별 카운트, 시간 키 오름차순.
///
/// 다른 뷰와 달리 의도적으로 오름차순(시간순)입니다.
/// 분 버킷이 없는 레코드(16바이트 미만 타임스탬프)는 이 뷰에서만 제외됩니다.
pub fn traffic_trend(records: &[LogRecord]) -> Vec<MinuteCount> {
    let mut groups = count_by(
        records
            .iter()
            .filter_map(|r| r.minute_key().map(str::to_owned)),
    );
    groups.sort_by(|a, b| a.0.cmp(&b.0));
    groups
        .into_iter()
        .map(|(minute, count)| MinuteCount { minute, count })
        .collect()
}
