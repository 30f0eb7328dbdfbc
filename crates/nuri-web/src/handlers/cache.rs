//! 캐시 상태 API 핸들러.

use axum::extract::State;
use axum::Json;
use nuri_cache::ControlMessage;
use nuri_core::models::cache::CacheStatus;
use tokio::sync::oneshot;

use crate::error::ApiError;
use crate::AppState;

/// 캐시 상태 조회
///
/// GET /api/cache/status — 컨트롤 채널로 `GET_CACHE_STATUS`를 보내고
/// oneshot 포트로 응답을 받는다.
pub async fn get_cache_status(
    State(state): State<AppState>,
) -> Result<Json<CacheStatus>, ApiError> {
    let (reply_tx, reply_rx) = oneshot::channel();

    state
        .cache_control
        .send(ControlMessage::CacheStatus { reply: reply_tx })
        .await
        .map_err(|_| ApiError::Unavailable("캐시 컨트롤 채널 닫힘".to_string()))?;

    let status = reply_rx
        .await
        .map_err(|_| ApiError::Unavailable("캐시 상태 응답 없음".to_string()))?;

    Ok(Json(status))
}
