//! 캐시 만료 검사.
//!
//! 저장 시점에 `sw-cache-time` 헤더를 기록하고, 조회 시점에 캐시별
//! 만료 윈도우와 비교한다.

use chrono::{DateTime, Utc};
use nuri_core::models::cache::{CachedResponse, CACHE_TIME_HEADER};
use std::time::Duration;
use tracing::debug;

/// 저장 시각 헤더를 현재 시각으로 기록
pub fn with_cache_time(response: CachedResponse) -> CachedResponse {
    response.with_header(CACHE_TIME_HEADER, Utc::now().to_rfc3339())
}

/// 엔트리가 만료 윈도우 안에 있는지 검사
///
/// `sw-cache-time` 헤더가 없는 엔트리는 항상 유효한 것으로 취급한다.
/// 이 방어적 기본값은 헤더를 기록하지 않은 외부 경로가 남긴 엔트리의
/// 만료를 무력화하므로 주의 — 이 crate의 쓰기 경로는 항상
/// `with_cache_time`으로 헤더를 기록한다.
pub fn is_cache_valid(response: &CachedResponse, ttl: Duration) -> bool {
    let Some(raw) = response.header(CACHE_TIME_HEADER) else {
        return true;
    };

    let Ok(stored_at) = DateTime::parse_from_rfc3339(raw) else {
        debug!("캐시 시각 파싱 실패, 만료로 취급: {raw}");
        return false;
    };

    let elapsed_ms = (Utc::now() - stored_at.with_timezone(&Utc)).num_milliseconds();
    elapsed_ms < ttl.as_millis() as i64
}
