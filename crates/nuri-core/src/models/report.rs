//! 성능 리포트 모델.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::vitals::{VitalsSnapshot, VitalsSummary};

/// 성능 리포트 — 스냅샷 + 요약 + 개선 권고 직렬화 문서
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// 리포트 ID
    pub report_id: Uuid,
    /// 생성 시각
    pub generated_at: DateTime<Utc>,
    /// 측정 대상 페이지 URL (미설정 시 None)
    pub page_url: Option<String>,
    /// 스냅샷 (생성 시점 복사본)
    pub snapshot: VitalsSnapshot,
    /// 파생 요약
    pub summary: VitalsSummary,
    /// 임계값 규칙 기반 개선 권고
    pub recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serde_roundtrip() {
        let snapshot = VitalsSnapshot {
            lcp_ms: Some(3_000.0),
            ..Default::default()
        };
        let report = PerformanceReport {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            page_url: Some("https://example.com/ja".to_string()),
            summary: VitalsSummary::from_snapshot(&snapshot),
            snapshot,
            recommendations: vec!["이미지 preload 적용 검토".to_string()],
        };

        let json = serde_json::to_string(&report).unwrap();
        let restored: PerformanceReport = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.report_id, report.report_id);
        assert_eq!(restored.snapshot.lcp_ms, Some(3_000.0));
        assert_eq!(restored.recommendations.len(), 1);
    }
}
