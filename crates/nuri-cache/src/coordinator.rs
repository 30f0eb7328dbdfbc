//! 오프라인 캐시 코디네이터.
//!
//! 워커 라이프사이클(설치 → 대기 → 활성화)을 관리하고, 가로챈 fetch
//! 요청을 리소스 클래스별 전략으로 해석한다. 네 캐시는 코디네이터가
//! 단독 소유한다.

use nuri_core::config::CacheConfig;
use nuri_core::error::CoreError;
use nuri_core::models::cache::{
    CacheStatus, CachedResponse, Destination, FetchRequest, WorkerPhase,
};
use nuri_core::ports::cache_store::CacheStore;
use nuri_core::ports::fetcher::NetworkFetcher;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::class::classify;
use crate::expiry::{is_cache_valid, with_cache_time};
use crate::policy::{self, Strategy, CACHE_TTLS, CURRENT_CACHES};
use crate::strategy;

/// 오프라인 폴백 문서의 HTTP 상태
const OFFLINE_STATUS: u16 = 503;

/// 프리캐시된 오프라인 페이지마저 없을 때의 최소 폴백 본문
const OFFLINE_FALLBACK_BODY: &str = "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>오프라인</title></head>\n<body><h1>오프라인입니다</h1><p>네트워크 연결을 확인한 뒤 다시 시도해 주세요.</p></body></html>\n";

/// 오프라인 캐시 코디네이터
pub struct CacheCoordinator {
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn NetworkFetcher>,
    config: CacheConfig,
    phase: Mutex<WorkerPhase>,
}

impl CacheCoordinator {
    /// 새 코디네이터 생성 — `install()` 전 상태
    pub fn new(
        store: Arc<dyn CacheStore>,
        fetcher: Arc<dyn NetworkFetcher>,
        config: CacheConfig,
    ) -> Self {
        Self {
            store,
            fetcher,
            config,
            phase: Mutex::new(WorkerPhase::Installing),
        }
    }

    /// 현재 라이프사이클 단계
    pub fn phase(&self) -> WorkerPhase {
        *self.phase.lock()
    }

    /// 워커 설치 — 프리캐시 매니페스트를 각 클래스의 캐시에 저장
    ///
    /// 경로 단위 best-effort: 개별 실패는 경고 후 건너뛰고 설치는
    /// 완료된다. 종료 상태는 `Installed` (활성화 대기).
    pub async fn install(&self) -> Result<(), CoreError> {
        {
            let phase = *self.phase.lock();
            if phase != WorkerPhase::Installing {
                return Err(CoreError::InvalidState {
                    expected: WorkerPhase::Installing.to_string(),
                    actual: phase.to_string(),
                });
            }
        }

        info!(
            "워커 설치 시작 — 프리캐시 {}개 경로",
            self.config.precache_paths.len()
        );

        for name in CURRENT_CACHES {
            self.store.open_cache(name).await?;
        }

        for path in &self.config.precache_paths {
            if let Err(e) = self.refresh_path(path).await {
                warn!("프리캐시 실패 (건너뜀): {path}: {e}");
            }
        }

        *self.phase.lock() = WorkerPhase::Installed;
        info!("워커 설치 완료 — 활성화 대기");
        Ok(())
    }

    /// 워커 활성화 — 현재 식별자 밖의 캐시를 삭제 (버전 마이그레이션)
    ///
    /// 완료 후 `Activated`가 되어 fetch 가로채기가 시작된다.
    pub async fn activate(&self) -> Result<(), CoreError> {
        {
            let mut phase = self.phase.lock();
            if *phase != WorkerPhase::Installed {
                return Err(CoreError::InvalidState {
                    expected: WorkerPhase::Installed.to_string(),
                    actual: phase.to_string(),
                });
            }
            *phase = WorkerPhase::Activating;
        }

        let names = self.store.cache_names().await?;
        for name in names {
            if !CURRENT_CACHES.contains(&name.as_str()) {
                match self.store.delete_cache(&name).await {
                    Ok(true) => info!("구버전 캐시 삭제: {name}"),
                    Ok(false) => {}
                    Err(e) => warn!("구버전 캐시 삭제 실패: {name}: {e}"),
                }
            }
        }

        *self.phase.lock() = WorkerPhase::Activated;
        info!("워커 활성화 완료 — fetch 가로채기 시작");
        Ok(())
    }

    /// 대기 중인 워커를 즉시 활성화 (`SKIP_WAITING`)
    pub async fn skip_waiting(&self) -> Result<(), CoreError> {
        match self.phase() {
            WorkerPhase::Installed => {
                info!("SKIP_WAITING 수신 — 즉시 활성화");
                self.activate().await
            }
            phase => {
                debug!("SKIP_WAITING 무시 (현재 단계: {phase})");
                Ok(())
            }
        }
    }

    /// 가로챈 fetch 요청 해석
    ///
    /// 활성화 전에는 제어되지 않는 페이지처럼 네트워크로 통과시킨다.
    /// 문서 요청이 캐시 없이 실패하면 오프라인 폴백 페이지를 반환한다.
    pub async fn handle_fetch(&self, request: &FetchRequest) -> Result<CachedResponse, CoreError> {
        if self.phase() != WorkerPhase::Activated {
            debug!("활성화 전 네트워크 통과: {}", request.path);
            return self.fetcher.fetch(&request.path).await;
        }

        let class = classify(&request.path);
        let policy = policy::policy_for(class);

        let result = match policy.strategy {
            Strategy::CacheFirst => {
                strategy::cache_first(&self.store, &self.fetcher, policy, &request.path).await
            }
            Strategy::NetworkFirst => {
                strategy::network_first(&self.store, &self.fetcher, policy, &request.path).await
            }
            Strategy::StaleWhileRevalidate => {
                strategy::stale_while_revalidate(&self.store, &self.fetcher, policy, &request.path)
                    .await
            }
        };

        match result {
            Ok(response) => Ok(response),
            Err(e) if request.destination == Destination::Document => {
                warn!("문서 요청 실패, 오프라인 폴백 제공: {}: {e}", request.path);
                self.offline_fallback().await
            }
            Err(e) => Err(e),
        }
    }

    /// 오프라인 폴백 문서
    ///
    /// 프리캐시된 오프라인 페이지를 신선도와 무관하게 사용하고,
    /// 그마저 없으면 내장 본문으로 응답한다.
    async fn offline_fallback(&self) -> Result<CachedResponse, CoreError> {
        let offline_path = &self.config.offline_path;
        let policy = policy::policy_for(classify(offline_path));

        if let Some(cached) = self.store.get(policy.cache_name, offline_path).await? {
            let mut response = cached;
            response.status = OFFLINE_STATUS;
            return Ok(response);
        }

        Ok(
            CachedResponse::new(OFFLINE_STATUS, OFFLINE_FALLBACK_BODY.as_bytes().to_vec())
                .with_header("content-type", "text/html; charset=utf-8"),
        )
    }

    /// 경로를 네트워크에서 받아 분류된 캐시에 저장 (프리캐시/예열 공용)
    pub(crate) async fn refresh_path(&self, path: &str) -> Result<(), CoreError> {
        let policy = policy::policy_for(classify(path));
        let response = self.fetcher.fetch(path).await?;

        if !response.is_success() {
            return Err(CoreError::Network(format!(
                "비정상 응답 ({}): {path}",
                response.status
            )));
        }

        let stamped = with_cache_time(response);
        self.store.put(policy.cache_name, path, &stamped).await?;
        debug!("경로 갱신: {} ← {path}", policy.cache_name);
        Ok(())
    }

    /// 네 캐시를 순회하며 만료 엔트리 삭제 — 삭제 수 반환
    pub async fn sweep_expired(&self) -> Result<usize, CoreError> {
        let mut removed = 0;

        for (cache, ttl) in CACHE_TTLS {
            let paths = self.store.list_paths(cache).await?;
            for path in paths {
                let Some(entry) = self.store.get(cache, &path).await? else {
                    continue;
                };
                if !is_cache_valid(&entry, ttl) && self.store.delete(cache, &path).await? {
                    debug!("만료 엔트리 삭제: {cache} ← {path}");
                    removed += 1;
                }
            }
        }

        if removed > 0 {
            info!("만료 엔트리 {removed}개 삭제");
        }
        Ok(removed)
    }

    /// 캐시 상태 조회 (`GET_CACHE_STATUS`)
    pub async fn cache_status(&self) -> Result<CacheStatus, CoreError> {
        let mut entry_counts = HashMap::new();
        for name in CURRENT_CACHES {
            entry_counts.insert(name.to_string(), self.store.entry_count(name).await?);
        }

        Ok(CacheStatus {
            phase: self.phase(),
            cache_names: CURRENT_CACHES.iter().map(|s| s.to_string()).collect(),
            entry_counts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::HttpFetcher;
    use assert_matches::assert_matches;
    use nuri_store::SqliteCacheStore;
    use std::time::Duration;

    fn test_config(precache_paths: Vec<&str>) -> CacheConfig {
        CacheConfig {
            precache_paths: precache_paths.into_iter().map(String::from).collect(),
            ..Default::default()
        }
    }

    fn make_coordinator(
        server: &mockito::ServerGuard,
        store: Arc<dyn CacheStore>,
        config: CacheConfig,
    ) -> CacheCoordinator {
        let fetcher: Arc<dyn NetworkFetcher> =
            Arc::new(HttpFetcher::new(&server.url(), Duration::from_secs(5)).unwrap());
        CacheCoordinator::new(store, fetcher, config)
    }

    #[tokio::test]
    async fn lifecycle_transitions() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_body("home")
            .create_async()
            .await;

        let store: Arc<dyn CacheStore> = Arc::new(SqliteCacheStore::open_in_memory().unwrap());
        let coordinator = make_coordinator(&server, store, test_config(vec!["/"]));

        assert_eq!(coordinator.phase(), WorkerPhase::Installing);
        coordinator.install().await.unwrap();
        assert_eq!(coordinator.phase(), WorkerPhase::Installed);
        coordinator.activate().await.unwrap();
        assert_eq!(coordinator.phase(), WorkerPhase::Activated);
    }

    #[tokio::test]
    async fn install_twice_is_invalid_state() {
        let server = mockito::Server::new_async().await;
        let store: Arc<dyn CacheStore> = Arc::new(SqliteCacheStore::open_in_memory().unwrap());
        let coordinator = make_coordinator(&server, store, test_config(vec![]));

        coordinator.install().await.unwrap();
        let result = coordinator.install().await;
        assert_matches!(result, Err(CoreError::InvalidState { .. }));
        let _ = server; // 네트워크 미사용
    }

    #[tokio::test]
    async fn install_is_best_effort_per_path() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/ja")
            .with_status(200)
            .with_body("ja")
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/broken")
            .with_status(500)
            .create_async()
            .await;

        let store: Arc<dyn CacheStore> = Arc::new(SqliteCacheStore::open_in_memory().unwrap());
        let coordinator =
            make_coordinator(&server, Arc::clone(&store), test_config(vec!["/ja", "/broken"]));

        // 한 경로의 실패가 설치를 막지 않는다
        coordinator.install().await.unwrap();
        assert_eq!(coordinator.phase(), WorkerPhase::Installed);

        assert!(store
            .get(policy::DYNAMIC_CACHE, "/ja")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .get(policy::DYNAMIC_CACHE, "/broken")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn activate_deletes_only_stale_caches() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/ja")
            .with_status(200)
            .with_body("ja")
            .create_async()
            .await;

        let store: Arc<dyn CacheStore> = Arc::new(SqliteCacheStore::open_in_memory().unwrap());

        // 구버전 캐시 두 개를 미리 만들어 둔다
        store.open_cache("nuri-static-v0").await.unwrap();
        store
            .put(
                "nuri-dynamic-v0",
                "/old",
                &CachedResponse::new(200, b"old".to_vec()),
            )
            .await
            .unwrap();

        let coordinator =
            make_coordinator(&server, Arc::clone(&store), test_config(vec!["/ja"]));
        coordinator.install().await.unwrap();
        coordinator.activate().await.unwrap();

        let names = store.cache_names().await.unwrap();
        assert!(!names.contains(&"nuri-static-v0".to_string()));
        assert!(!names.contains(&"nuri-dynamic-v0".to_string()));
        for current in CURRENT_CACHES {
            assert!(names.contains(&current.to_string()));
        }
        // 현재 캐시의 내용은 보존
        assert!(store
            .get(policy::DYNAMIC_CACHE, "/ja")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn precached_page_served_offline_with_no_network() {
        let mut server = mockito::Server::new_async().await;
        let precache_mock = server
            .mock("GET", "/ja")
            .with_status(200)
            .with_body("<html>ja</html>")
            .expect(1)
            .create_async()
            .await;

        let store: Arc<dyn CacheStore> = Arc::new(SqliteCacheStore::open_in_memory().unwrap());
        let coordinator =
            make_coordinator(&server, Arc::clone(&store), test_config(vec!["/ja"]));

        coordinator.install().await.unwrap();
        coordinator.activate().await.unwrap();
        precache_mock.assert_async().await; // 프리캐시로 정확히 1회

        // 이후 네트워크가 완전히 죽어도 프리캐시 응답 제공
        drop(server);

        let resp = coordinator
            .handle_fetch(&FetchRequest::document("/ja"))
            .await
            .unwrap();
        assert_eq!(resp.body, b"<html>ja</html>");
        assert_eq!(resp.status, 200);
    }

    #[tokio::test]
    async fn fetch_before_activation_passes_through() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ja")
            .with_status(200)
            .with_body("direct")
            .expect(1)
            .create_async()
            .await;

        let store: Arc<dyn CacheStore> = Arc::new(SqliteCacheStore::open_in_memory().unwrap());
        let coordinator =
            make_coordinator(&server, Arc::clone(&store), test_config(vec![]));

        let resp = coordinator
            .handle_fetch(&FetchRequest::document("/ja"))
            .await
            .unwrap();
        assert_eq!(resp.body, b"direct");
        mock.assert_async().await;

        // 통과 요청은 캐시에 저장되지 않는다
        assert!(store
            .get(policy::DYNAMIC_CACHE, "/ja")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn document_failure_serves_offline_fallback() {
        let mut server = mockito::Server::new_async().await;
        let _offline = server
            .mock("GET", "/offline.html")
            .with_status(200)
            .with_body("<html>offline page</html>")
            .create_async()
            .await;

        let store: Arc<dyn CacheStore> = Arc::new(SqliteCacheStore::open_in_memory().unwrap());
        let coordinator = make_coordinator(
            &server,
            Arc::clone(&store),
            test_config(vec!["/offline.html"]),
        );

        coordinator.install().await.unwrap();
        coordinator.activate().await.unwrap();

        // 네트워크 차단
        drop(server);

        let resp = coordinator
            .handle_fetch(&FetchRequest::document("/nowhere"))
            .await
            .unwrap();
        assert_eq!(resp.status, 503);
        assert_eq!(resp.body, b"<html>offline page</html>");
    }

    #[tokio::test]
    async fn non_document_failure_propagates() {
        let server = mockito::Server::new_async().await;
        let store: Arc<dyn CacheStore> = Arc::new(SqliteCacheStore::open_in_memory().unwrap());
        let coordinator = make_coordinator(&server, store, test_config(vec![]));

        coordinator.install().await.unwrap();
        coordinator.activate().await.unwrap();

        drop(server); // 서버 다운

        let result = coordinator
            .handle_fetch(&FetchRequest::new("/api/contact"))
            .await;
        assert_matches!(result, Err(CoreError::Network(_)));
    }

    #[tokio::test]
    async fn skip_waiting_activates_installed_worker() {
        let server = mockito::Server::new_async().await;
        let store: Arc<dyn CacheStore> = Arc::new(SqliteCacheStore::open_in_memory().unwrap());
        let coordinator = make_coordinator(&server, store, test_config(vec![]));

        // 설치 전에는 무시
        coordinator.skip_waiting().await.unwrap();
        assert_eq!(coordinator.phase(), WorkerPhase::Installing);

        coordinator.install().await.unwrap();
        coordinator.skip_waiting().await.unwrap();
        assert_eq!(coordinator.phase(), WorkerPhase::Activated);

        // 활성화 후에는 no-op
        coordinator.skip_waiting().await.unwrap();
        assert_eq!(coordinator.phase(), WorkerPhase::Activated);
        let _ = server;
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_entries() {
        let server = mockito::Server::new_async().await;
        let store: Arc<dyn CacheStore> = Arc::new(SqliteCacheStore::open_in_memory().unwrap());
        let coordinator = make_coordinator(&server, Arc::clone(&store), test_config(vec![]));

        // 동적 캐시(5분 윈도우): 만료 1건 + 신선 1건
        let stale_time = (chrono::Utc::now() - chrono::Duration::minutes(10)).to_rfc3339();
        let stale = CachedResponse::new(200, b"stale".to_vec())
            .with_header(nuri_core::models::cache::CACHE_TIME_HEADER, stale_time);
        store.put(policy::DYNAMIC_CACHE, "/old", &stale).await.unwrap();

        let fresh = with_cache_time(CachedResponse::new(200, b"fresh".to_vec()));
        store.put(policy::DYNAMIC_CACHE, "/new", &fresh).await.unwrap();

        let removed = coordinator.sweep_expired().await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.get(policy::DYNAMIC_CACHE, "/old").await.unwrap().is_none());
        assert!(store.get(policy::DYNAMIC_CACHE, "/new").await.unwrap().is_some());
        let _ = server;
    }

    #[tokio::test]
    async fn cache_status_reports_four_caches() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/ja")
            .with_status(200)
            .with_body("ja")
            .create_async()
            .await;

        let store: Arc<dyn CacheStore> = Arc::new(SqliteCacheStore::open_in_memory().unwrap());
        let coordinator = make_coordinator(&server, store, test_config(vec!["/ja"]));

        coordinator.install().await.unwrap();
        coordinator.activate().await.unwrap();

        let status = coordinator.cache_status().await.unwrap();
        assert_eq!(status.phase, WorkerPhase::Activated);
        assert_eq!(status.cache_names.len(), 4);
        assert_eq!(status.entry_counts[policy::DYNAMIC_CACHE], 1);
        assert_eq!(status.entry_counts[policy::FONT_CACHE], 0);
    }
}
