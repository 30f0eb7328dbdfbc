//! 백그라운드 동기화.
//!
//! 주기적으로 (a) 네 캐시의 만료 엔트리를 정리하고 (b) 주요 경로를
//! 다시 받아 캐시를 예열한다. 요청/응답 경로 밖의 best-effort 유지보수
//! 작업으로, 개별 실패는 패스를 중단시키지 않는다.

use nuri_core::config::SyncConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::coordinator::CacheCoordinator;

/// 동기화 주기 하한 (밀리초)
const MIN_SYNC_INTERVAL_MS: u64 = 10_000;

/// 단일 동기화 패스 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    /// 삭제된 만료 엔트리 수
    pub removed: usize,
    /// 예열에 성공한 경로 수
    pub warmed: usize,
}

/// 백그라운드 동기화 실행기
pub struct BackgroundSync {
    coordinator: Arc<CacheCoordinator>,
    config: SyncConfig,
}

impl BackgroundSync {
    /// 새 동기화 실행기 생성
    pub fn new(coordinator: Arc<CacheCoordinator>, config: SyncConfig) -> Self {
        Self {
            coordinator,
            config,
        }
    }

    /// 단일 동기화 패스 실행 (`sync` 이벤트, 태그 `background-sync`)
    pub async fn run_once(&self) -> SyncReport {
        let removed = match self.coordinator.sweep_expired().await {
            Ok(n) => n,
            Err(e) => {
                warn!("만료 엔트리 정리 실패: {e}");
                0
            }
        };

        let mut warmed = 0;
        for path in &self.config.warm_paths {
            match self.coordinator.refresh_path(path).await {
                Ok(()) => warmed += 1,
                Err(e) => warn!("예열 실패 (건너뜀): {path}: {e}"),
            }
        }

        debug!("동기화 패스 완료 — 삭제 {removed}, 예열 {warmed}");
        SyncReport { removed, warmed }
    }

    /// 주기 실행 루프 시작
    pub fn spawn(self: Arc<Self>, mut shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        let interval_ms = self.config.interval_ms.max(MIN_SYNC_INTERVAL_MS);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // 첫 tick은 즉시 발화하므로 건너뛴다
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let report = self.run_once().await;
                        info!(
                            "백그라운드 동기화 — 삭제 {}, 예열 {}",
                            report.removed, report.warmed
                        );
                    }
                    changed = shutdown_rx.changed() => {
                        // 송신단이 drop되어도 종료
                        if changed.is_err() || *shutdown_rx.borrow() {
                            info!("백그라운드 동기화 종료");
                            break;
                        }
                    }
                }
            }
        })
    }
}
