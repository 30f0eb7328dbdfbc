//! 텔레메트리 API 핸들러.

use axum::extract::State;
use axum::Json;
use nuri_core::models::entry::PerformanceEntry;
use nuri_core::models::report::PerformanceReport;
use nuri_core::models::vitals::{VitalsSnapshot, VitalsSummary};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::AppState;

/// 텔레메트리 조회 응답 DTO
#[derive(Debug, Serialize)]
pub struct VitalsResponse {
    /// 조회 시각 (RFC3339)
    pub timestamp: String,
    /// 현재 스냅샷
    pub snapshot: VitalsSnapshot,
    /// 파생 요약 (지표별 등급 + 종합 점수)
    pub summary: VitalsSummary,
    /// 임계값 규칙 기반 개선 권고
    pub recommendations: Vec<String>,
}

/// 액션 요청
#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    /// 액션 판별자
    pub action: String,
}

/// 액션 응답
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    /// 처리 결과
    pub status: &'static str,
    /// 처리된 액션
    pub action: String,
    /// generate-report 액션의 결과 리포트
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<PerformanceReport>,
}

/// 엔트리 수신 응답
#[derive(Debug, Serialize)]
pub struct EntriesResponse {
    /// 수신한 엔트리 수
    pub received: usize,
    /// 스냅샷에 반영된 엔트리 수
    pub applied: usize,
}

/// 텔레메트리 조회
///
/// GET /api/vitals
pub async fn get_vitals(State(state): State<AppState>) -> Result<Json<VitalsResponse>, ApiError> {
    let snapshot = state.collector.metrics();
    let summary = VitalsSummary::from_snapshot(&snapshot);
    let recommendations = nuri_vitals::report::recommendations(&snapshot, &summary);

    Ok(Json(VitalsResponse {
        timestamp: chrono::Utc::now().to_rfc3339(),
        snapshot,
        summary,
        recommendations,
    }))
}

/// 텔레메트리 액션 실행
///
/// POST /api/vitals/action — body `{ "action": "reset-metrics" | … }`
pub async fn post_action(
    State(state): State<AppState>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let mut report = None;

    match request.action.as_str() {
        "reset-metrics" => {
            state.collector.reset_metrics();
            info!("액션 실행: reset-metrics");
        }
        "reset-bundle-analysis" => {
            state.collector.reset_resource_timings();
            info!("액션 실행: reset-bundle-analysis");
        }
        "generate-report" => {
            report = Some(state.collector.generate_report());
            info!("액션 실행: generate-report");
        }
        "optimize-performance" => {
            if let Some(sync) = &state.sync {
                let sync = sync.clone();
                // 동기화 패스는 응답을 막지 않도록 백그라운드에서 실행
                tokio::spawn(async move {
                    let outcome = sync.run_once().await;
                    debug!("optimize-performance 완료: {outcome:?}");
                });
            }
            info!("액션 실행: optimize-performance");
        }
        other => {
            return Err(ApiError::BadRequest(format!("알 수 없는 액션: {other}")));
        }
    }

    Ok(Json(ActionResponse {
        status: "ok",
        action: request.action,
        report,
    }))
}

/// 성능 엔트리 비콘 수신
///
/// POST /api/vitals/entries — body는 엔트리 배열
pub async fn post_entries(
    State(state): State<AppState>,
    Json(entries): Json<Vec<PerformanceEntry>>,
) -> Result<Json<EntriesResponse>, ApiError> {
    let received = entries.len();
    let applied = entries
        .iter()
        .filter(|entry| state.collector.ingest(entry))
        .count();

    debug!("엔트리 수신: {received}건, 반영 {applied}건");
    Ok(Json(EntriesResponse { received, applied }))
}

/// 성능 리포트 조회
///
/// GET /api/vitals/report
pub async fn get_report(State(state): State<AppState>) -> Result<Json<PerformanceReport>, ApiError> {
    Ok(Json(state.collector.generate_report()))
}
