//! # nuri-core
//!
//! NURI의 공유 계층 — 도메인 모델, 포트 trait, 에러, 설정.
//! 어댑터 crate들은 이 crate의 타입만으로 서로 통신한다.
//!
//! - [`models`] — 스냅샷/엔트리/리포트/캐시 도메인 구조체
//! - [`ports`] — 옵저버·fetcher·캐시 저장소 포트 (async_trait)
//! - [`error`] — [`error::CoreError`]
//! - [`config`] / [`config_manager`] — 설정 구조체와 JSON 파일 관리

pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod ports;

#[cfg(test)]
mod tests {
    use crate::models::entry::PerformanceEntry;
    use crate::models::vitals::{VitalsSnapshot, VitalsSummary};

    #[test]
    fn entry_json_shape() {
        let json = r#"{"entry_type":"layout-shift","value":0.08,"had_recent_input":false}"#;
        let entry: PerformanceEntry = serde_json::from_str(json).unwrap();
        assert!(matches!(
            entry,
            PerformanceEntry::LayoutShift {
                had_recent_input: false,
                ..
            }
        ));
    }

    #[test]
    fn summary_from_empty_snapshot() {
        let summary = VitalsSummary::from_snapshot(&VitalsSnapshot::default());
        assert!(summary.lcp.is_none());
        assert!(summary.overall_score.is_none());
    }
}
