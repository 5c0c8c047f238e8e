//! 파티션 인덱스 -- 상태 키 기준 레코드 그룹화
//!
//! [`PartitionIndex`]는 전체 레코드 시퀀스를 한 번 스캔하여
//! 상태 키(NULL 센티널 포함)별로 레코드 행 인덱스를 묶습니다.
//! 상태 범위가 제한된 질의(의심 IP 탐지 등)가 무관한 파티션을
//! 스캔하지 않도록 하는 논리 인덱스입니다.
//!
//! # 불변식
//! - 파티션은 서로소이며 전체 레코드를 빠짐없이 덮습니다.
//! - 파티션 내부 순서는 입력 순서를 보존합니다.
//! - 실행마다 전체 재구축되며 증분 갱신은 없습니다.

use std::collections::HashMap;

use weblens_core::types::{LogRecord, StatusKey};

/// 상태 키 -> 레코드 행 인덱스 목록 매핑
///
/// 레코드 자체를 복제하지 않고 행 인덱스만 보관합니다.
/// 인덱스를 만든 레코드 슬라이스와 함께 사용해야 합니다.
#[derive(Debug, Clone)]
pub struct PartitionIndex {
    /// 상태 키별 행 인덱스 (입력 순서 보존)
    partitions: HashMap<StatusKey, Vec<usize>>,
    /// 인덱싱된 전체 레코드 수
    total: usize,
}

impl PartitionIndex {
    /// 레코드 시퀀스를 한 번 스캔하여 인덱스를 구축합니다.
    pub fn build(records: &[LogRecord]) -> Self {
        let mut partitions: HashMap<StatusKey, Vec<usize>> = HashMap::new();
        for (row, record) in records.iter().enumerate() {
            partitions.entry(record.status).or_default().push(row);
        }
        Self {
            partitions,
            total: records.len(),
        }
    }

    /// 해당 상태 키의 행 인덱스를 반환합니다 (없으면 빈 슬라이스).
    pub fn rows_for(&self, key: StatusKey) -> &[usize] {
        self.partitions.get(&key).map_or(&[], Vec::as_slice)
    }

    /// 상태 키 집합에 속한 레코드만 입력 순서로 모아 반환합니다.
    ///
    /// 의심 IP 탐지처럼 일부 상태로 제한된 질의가 전체 스캔을
    /// 피할 수 있도록 합니다.
    pub fn select<'a>(&self, records: &'a [LogRecord], keys: &[StatusKey]) -> Vec<&'a LogRecord> {
        let mut rows: Vec<usize> = keys
            .iter()
            .flat_map(|key| self.rows_for(*key).iter().copied())
            .collect();
        rows.sort_unstable();
        rows.dedup();
        rows.into_iter().map(|row| &records[row]).collect()
    }

    /// 파티션 수를 반환합니다 (서로 다른 상태 키 수).
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// 인덱싱된 전체 레코드 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.total
    }

    /// 인덱스가 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// 존재하는 상태 키 목록을 반환합니다 (순서 비보장).
    pub fn keys(&self) -> impl Iterator<Item = StatusKey> + '_ {
        self.partitions.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ip: &str, status: StatusKey) -> LogRecord {
        LogRecord {
            ip: ip.to_owned(),
            timestamp: "2024-02-01 10:15:01".to_owned(),
            url: "/home".to_owned(),
            status,
            user_agent: "curl/8.0".to_owned(),
        }
    }

    #[test]
    fn partitions_are_disjoint_and_cover_all() {
        let records = vec![
            record("a", StatusKey::Code(200)),
            record("b", StatusKey::Code(404)),
            record("c", StatusKey::Null),
            record("d", StatusKey::Code(200)),
        ];
        let index = PartitionIndex::build(&records);

        assert_eq!(index.len(), 4);
        assert_eq!(index.partition_count(), 3);

        let covered: usize = index.keys().map(|k| index.rows_for(k).len()).sum();
        assert_eq!(covered, records.len());
    }

    #[test]
    fn null_is_its_own_partition() {
        let records = vec![
            record("a", StatusKey::Null),
            record("b", StatusKey::Code(0)),
        ];
        let index = PartitionIndex::build(&records);
        assert_eq!(index.rows_for(StatusKey::Null), &[0]);
        assert_eq!(index.rows_for(StatusKey::Code(0)), &[1]);
    }

    #[test]
    fn partition_preserves_input_order() {
        let records = vec![
            record("a", StatusKey::Code(404)),
            record("b", StatusKey::Code(200)),
            record("c", StatusKey::Code(404)),
            record("d", StatusKey::Code(404)),
        ];
        let index = PartitionIndex::build(&records);
        assert_eq!(index.rows_for(StatusKey::Code(404)), &[0, 2, 3]);
    }

    #[test]
    fn rows_for_missing_key_is_empty() {
        let records = vec![record("a", StatusKey::Code(200))];
        let index = PartitionIndex::build(&records);
        assert!(index.rows_for(StatusKey::Code(500)).is_empty());
    }

    #[test]
    fn select_merges_partitions_in_input_order() {
        let records = vec![
            record("a", StatusKey::Code(500)),
            record("b", StatusKey::Code(200)),
            record("c", StatusKey::Code(404)),
            record("d", StatusKey::Code(500)),
        ];
        let index = PartitionIndex::build(&records);
        let selected = index.select(&records, &[StatusKey::Code(404), StatusKey::Code(500)]);

        let ips: Vec<&str> = selected.iter().map(|r| r.ip.as_str()).collect();
        assert_eq!(ips, vec!["a", "c", "d"]);
    }

    #[test]
    fn select_with_duplicate_keys_does_not_duplicate_rows() {
        let records = vec![record("a", StatusKey::Code(404))];
        let index = PartitionIndex::build(&records);
        // 같은 키가 두 번 와도 행은 한 번씩만 나온다
        let selected = index.select(&records, &[StatusKey::Code(404), StatusKey::Code(404)]);
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn empty_records_build_empty_index() {
        let index = PartitionIndex::build(&[]);
        assert!(index.is_empty());
        assert_eq!(index.partition_count(), 0);
    }
}
