//! 요청 해석 전략.
//!
//! cache-first / network-first / stale-while-revalidate.
//! 각 전략은 `CacheStore` + `NetworkFetcher` 포트 위에서 동작하며,
//! 저장 실패는 응답 반환을 막지 않는다 (경고 후 계속).

use nuri_core::error::CoreError;
use nuri_core::models::cache::CachedResponse;
use nuri_core::ports::cache_store::CacheStore;
use nuri_core::ports::fetcher::NetworkFetcher;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::expiry::{is_cache_valid, with_cache_time};
use crate::policy::CachePolicy;

/// cache-first — 유효한 캐시 엔트리 우선, 없으면 네트워크
///
/// 만료된 엔트리는 이 시점에 지연 삭제된다. 캐시도 네트워크도 없으면
/// 에러를 호출자에게 전파한다.
pub async fn cache_first(
    store: &Arc<dyn CacheStore>,
    fetcher: &Arc<dyn NetworkFetcher>,
    policy: &'static CachePolicy,
    path: &str,
) -> Result<CachedResponse, CoreError> {
    if let Some(cached) = store.get(policy.cache_name, path).await? {
        if is_cache_valid(&cached, policy.ttl) {
            debug!("캐시 HIT: {} ← {path}", policy.cache_name);
            return Ok(cached);
        }
        // 만료 엔트리 지연 삭제
        store.delete(policy.cache_name, path).await?;
        debug!("만료 엔트리 삭제: {} ← {path}", policy.cache_name);
    }

    debug!("캐시 MISS: {path}");
    let response = fetcher.fetch(path).await?;

    if response.is_success() {
        let stamped = with_cache_time(response.clone());
        if let Err(e) = store.put(policy.cache_name, path, &stamped).await {
            warn!("캐시 저장 실패 (응답은 반환): {path}: {e}");
        }
    }
    Ok(response)
}

/// network-first — 네트워크 우선, 실패 시 최신 캐시 엔트리로 폴백
///
/// 폴백 시에는 신선도를 검사하지 않는다 — 오프라인에서 오래된 응답이
/// 빈손보다 낫다. 캐시마저 없으면 원래 네트워크 에러를 전파한다.
pub async fn network_first(
    store: &Arc<dyn CacheStore>,
    fetcher: &Arc<dyn NetworkFetcher>,
    policy: &'static CachePolicy,
    path: &str,
) -> Result<CachedResponse, CoreError> {
    match fetcher.fetch(path).await {
        Ok(response) => {
            if response.is_success() {
                let stamped = with_cache_time(response.clone());
                if let Err(e) = store.put(policy.cache_name, path, &stamped).await {
                    warn!("캐시 저장 실패 (응답은 반환): {path}: {e}");
                }
            }
            Ok(response)
        }
        Err(e) => {
            warn!("네트워크 실패, 캐시 폴백 시도: {path}: {e}");
            match store.get(policy.cache_name, path).await? {
                Some(cached) => {
                    debug!("캐시 폴백 HIT: {path}");
                    Ok(cached)
                }
                None => Err(e),
            }
        }
    }
}

/// stale-while-revalidate — 캐시 즉시 반환 + 백그라운드 재검증
///
/// 캐시 엔트리가 있으면 신선도를 검사하지 않고 즉시 반환하고,
/// 분리된 태스크가 캐시를 갱신한다. 재검증 결과는 다음 요청에서만
/// 관측되며, 실패해도 호출자에게 드러나지 않는다.
pub async fn stale_while_revalidate(
    store: &Arc<dyn CacheStore>,
    fetcher: &Arc<dyn NetworkFetcher>,
    policy: &'static CachePolicy,
    path: &str,
) -> Result<CachedResponse, CoreError> {
    if let Some(cached) = store.get(policy.cache_name, path).await? {
        debug!("캐시 HIT (재검증 병행): {} ← {path}", policy.cache_name);

        let store = Arc::clone(store);
        let fetcher = Arc::clone(fetcher);
        let path = path.to_string();
        tokio::spawn(async move {
            match fetcher.fetch(&path).await {
                Ok(response) if response.is_success() => {
                    let stamped = with_cache_time(response);
                    if let Err(e) = store.put(policy.cache_name, &path, &stamped).await {
                        warn!("재검증 저장 실패: {path}: {e}");
                    } else {
                        debug!("백그라운드 재검증 완료: {path}");
                    }
                }
                Ok(response) => {
                    debug!("재검증 비정상 응답 무시: {path} ({})", response.status);
                }
                Err(e) => {
                    debug!("백그라운드 재검증 실패 (무시): {path}: {e}");
                }
            }
        });

        return Ok(cached);
    }

    debug!("캐시 MISS: {path}");
    let response = fetcher.fetch(path).await?;

    if response.is_success() {
        let stamped = with_cache_time(response.clone());
        if let Err(e) = store.put(policy.cache_name, path, &stamped).await {
            warn!("캐시 저장 실패 (응답은 반환): {path}: {e}");
        }
    }
    Ok(response)
}
