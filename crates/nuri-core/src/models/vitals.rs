//! Core Web Vitals 스냅샷 모델.
//!
//! 수집기가 소유하는 단일 가변 레코드와, 거기서 파생되는
//! 등급(rating)/점수 요약을 정의한다.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// LCP 등급 임계값 (밀리초)
pub const LCP_GOOD_MS: f64 = 2_500.0;
/// LCP poor 경계 (밀리초)
pub const LCP_POOR_MS: f64 = 4_000.0;
/// FID 등급 임계값 (밀리초)
pub const FID_GOOD_MS: f64 = 100.0;
/// FID poor 경계 (밀리초)
pub const FID_POOR_MS: f64 = 300.0;
/// CLS 등급 임계값 (무단위)
pub const CLS_GOOD: f64 = 0.1;
/// CLS poor 경계 (무단위)
pub const CLS_POOR: f64 = 0.25;

/// 메모리 사용량 (바이트 단위 triple)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryUsage {
    /// 에이전트 프로세스 메모리 사용량
    pub used_bytes: u64,
    /// 시스템 전체 사용 중 메모리
    pub total_bytes: u64,
    /// 시스템 전체 메모리 (상한)
    pub limit_bytes: u64,
}

/// 성능 지표 스냅샷
///
/// 모든 타이밍 필드는 `None`(미관측) 또는 0 이상의 값이다.
/// 페이지 수명 동안 수집기가 점진적으로 갱신하며, 외부에는 복사본만 노출된다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VitalsSnapshot {
    /// Largest Contentful Paint (밀리초)
    pub lcp_ms: Option<f64>,
    /// First Input Delay (밀리초)
    pub fid_ms: Option<f64>,
    /// Cumulative Layout Shift (무단위 누적값, 페이지 수명 내 단조 증가)
    pub cls: Option<f64>,
    /// Time To First Byte (밀리초)
    pub ttfb_ms: Option<f64>,
    /// First Contentful Paint (밀리초)
    pub fcp_ms: Option<f64>,
    /// Interaction to Next Paint — 관측된 최악 인터랙션 지연 (밀리초)
    pub inp_ms: Option<f64>,
    /// 페이지 로드 완료 시점 (밀리초)
    pub page_load_ms: Option<f64>,
    /// DOM 준비 완료 시점 (밀리초)
    pub dom_ready_ms: Option<f64>,
    /// 리소스 URL → 로드 시간 (밀리초), LRU 용량 제한 적용
    #[serde(default)]
    pub resource_timings: HashMap<String, f64>,
    /// 페이지 에러 횟수
    pub error_count: u64,
    /// 페이지 경고 횟수
    pub warning_count: u64,
    /// 메모리 사용량 (미지원 플랫폼에서는 None)
    pub memory: Option<MemoryUsage>,
}

/// 지표 등급 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rating {
    /// 양호
    Good,
    /// 개선 필요
    NeedsImprovement,
    /// 불량
    Poor,
}

impl Rating {
    /// 등급별 수치 점수 (good=100, needs-improvement=50, poor=0)
    pub fn score(self) -> f64 {
        match self {
            Rating::Good => 100.0,
            Rating::NeedsImprovement => 50.0,
            Rating::Poor => 0.0,
        }
    }

    /// 임계값 쌍으로 등급 분류
    fn from_thresholds(value: f64, good: f64, poor: f64) -> Self {
        if value < good {
            Rating::Good
        } else if value < poor {
            Rating::NeedsImprovement
        } else {
            Rating::Poor
        }
    }
}

/// LCP 등급 분류 (<2500 good, <4000 needs-improvement)
pub fn rate_lcp(ms: f64) -> Rating {
    Rating::from_thresholds(ms, LCP_GOOD_MS, LCP_POOR_MS)
}

/// FID 등급 분류 (<100 good, <300 needs-improvement)
pub fn rate_fid(ms: f64) -> Rating {
    Rating::from_thresholds(ms, FID_GOOD_MS, FID_POOR_MS)
}

/// CLS 등급 분류 (<0.1 good, <0.25 needs-improvement)
pub fn rate_cls(value: f64) -> Rating {
    Rating::from_thresholds(value, CLS_GOOD, CLS_POOR)
}

/// 단일 지표 평가 (측정값 + 등급)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MetricAssessment {
    /// 측정값
    pub value: f64,
    /// 등급
    pub rating: Rating,
}

/// 스냅샷에서 파생되는 요약
///
/// 미관측 지표는 평가에서 제외된다 — 0점 취급하지 않는다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalsSummary {
    /// LCP 평가
    pub lcp: Option<MetricAssessment>,
    /// FID 평가
    pub fid: Option<MetricAssessment>,
    /// CLS 평가
    pub cls: Option<MetricAssessment>,
    /// 종합 점수 — 관측된 지표 점수의 평균, 전부 미관측이면 None
    pub overall_score: Option<f64>,
}

impl VitalsSummary {
    /// 스냅샷에서 요약 생성
    pub fn from_snapshot(snapshot: &VitalsSnapshot) -> Self {
        let lcp = snapshot.lcp_ms.map(|v| MetricAssessment {
            value: v,
            rating: rate_lcp(v),
        });
        let fid = snapshot.fid_ms.map(|v| MetricAssessment {
            value: v,
            rating: rate_fid(v),
        });
        let cls = snapshot.cls.map(|v| MetricAssessment {
            value: v,
            rating: rate_cls(v),
        });

        let scores: Vec<f64> = [&lcp, &fid, &cls]
            .into_iter()
            .flatten()
            .map(|a| a.rating.score())
            .collect();

        let overall_score = if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        };

        Self {
            lcp,
            fid,
            cls,
            overall_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_boundaries() {
        assert_eq!(rate_lcp(2_499.9), Rating::Good);
        assert_eq!(rate_lcp(2_500.0), Rating::NeedsImprovement);
        assert_eq!(rate_lcp(4_000.0), Rating::Poor);
        assert_eq!(rate_fid(99.0), Rating::Good);
        assert_eq!(rate_fid(100.0), Rating::NeedsImprovement);
        assert_eq!(rate_fid(300.0), Rating::Poor);
        assert_eq!(rate_cls(0.05), Rating::Good);
        assert_eq!(rate_cls(0.1), Rating::NeedsImprovement);
        assert_eq!(rate_cls(0.3), Rating::Poor);
    }

    #[test]
    fn score_averages_only_observed_metrics() {
        let snapshot = VitalsSnapshot {
            lcp_ms: Some(2_000.0), // good = 100
            fid_ms: None,
            cls: None,
            ..Default::default()
        };
        let summary = VitalsSummary::from_snapshot(&snapshot);
        assert_eq!(summary.overall_score, Some(100.0));
        assert!(summary.fid.is_none());
        assert!(summary.cls.is_none());
    }

    #[test]
    fn score_mixed_ratings() {
        let snapshot = VitalsSnapshot {
            lcp_ms: Some(2_000.0), // good = 100
            fid_ms: Some(150.0),   // needs-improvement = 50
            cls: Some(0.5),        // poor = 0
            ..Default::default()
        };
        let summary = VitalsSummary::from_snapshot(&snapshot);
        assert_eq!(summary.overall_score, Some(50.0));
    }

    #[test]
    fn score_none_when_nothing_observed() {
        let summary = VitalsSummary::from_snapshot(&VitalsSnapshot::default());
        assert!(summary.overall_score.is_none());
    }

    #[test]
    fn snapshot_serde_roundtrip() {
        let snapshot = VitalsSnapshot {
            lcp_ms: Some(1_234.5),
            cls: Some(0.02),
            error_count: 3,
            memory: Some(MemoryUsage {
                used_bytes: 100,
                total_bytes: 200,
                limit_bytes: 300,
            }),
            ..Default::default()
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: VitalsSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.lcp_ms, Some(1_234.5));
        assert_eq!(restored.error_count, 3);
        assert_eq!(restored.memory.unwrap().limit_bytes, 300);
    }
}
