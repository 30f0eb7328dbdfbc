//! API 라우트 정의.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::AppState;

/// API 라우트 생성
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // 텔레메트리
        .route("/vitals", get(handlers::vitals::get_vitals))
        .route("/vitals/entries", post(handlers::vitals::post_entries))
        .route("/vitals/action", post(handlers::vitals::post_action))
        .route("/vitals/report", get(handlers::vitals::get_report))
        // 캐시 상태
        .route("/cache/status", get(handlers::cache::get_cache_status))
        // 실시간 스트림 (SSE)
        .route("/stream", get(handlers::stream::event_stream))
}
