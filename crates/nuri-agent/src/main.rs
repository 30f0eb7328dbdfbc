//! NURI 에이전트 실행 바이너리.
//!
//! 설정 로드 → 캐시 저장소/네트워크 fetcher → 코디네이터 설치/활성화 →
//! 수집기 초기화 → 컨트롤 루프/백그라운드 동기화 → API 서버 순으로
//! 구성하고, ctrl-c에서 watch 채널로 정리한다.

use anyhow::Context;
use clap::Parser;
use nuri_cache::{
    control_channel, spawn_control_loop, BackgroundSync, CacheCoordinator, HttpFetcher,
};
use nuri_core::config_manager::ConfigManager;
use nuri_core::ports::cache_store::CacheStore;
use nuri_core::ports::fetcher::NetworkFetcher;
use nuri_store::SqliteCacheStore;
use nuri_vitals::VitalsCollector;
use nuri_web::{BroadcastObserver, WebServer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 캐시 DB 파일 이름
const CACHE_DB_FILE: &str = "cache.db";

#[derive(Debug, Parser)]
#[command(
    name = "nuri-agent",
    about = "NURI 웹 성능 텔레메트리 & 오프라인 캐시 에이전트",
    version
)]
struct Cli {
    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리)
    #[arg(long)]
    config: Option<PathBuf>,

    /// API 서버 포트 재정의
    #[arg(long)]
    port: Option<u16>,

    /// 업스트림 오리진 재정의 (예: https://example.com)
    #[arg(long)]
    origin: Option<String>,

    /// 캐시 DB 디렉토리 재정의
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // 설정 로드 + CLI 재정의
    let config_manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    }
    .context("설정 로드 실패")?;

    let mut config = config_manager.get();
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(origin) = &cli.origin {
        config.cache.origin = origin.clone();
    }

    // 캐시 저장소
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => ConfigManager::data_dir().context("데이터 디렉토리 결정 실패")?,
    };
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("데이터 디렉토리 생성 실패: {}", data_dir.display()))?;
    let store: Arc<dyn CacheStore> = Arc::new(
        SqliteCacheStore::open(&data_dir.join(CACHE_DB_FILE)).context("캐시 저장소 열기 실패")?,
    );

    // 네트워크 fetcher (요청별 데드라인 적용)
    let fetcher: Arc<dyn NetworkFetcher> = Arc::new(
        HttpFetcher::new(
            &config.cache.origin,
            Duration::from_millis(config.cache.request_timeout_ms),
        )
        .context("HTTP fetcher 생성 실패")?,
    );

    // 캐시 코디네이터 — 설치 후 즉시 활성화
    let coordinator = Arc::new(CacheCoordinator::new(
        store,
        fetcher,
        config.cache.clone(),
    ));
    coordinator.install().await.context("워커 설치 실패")?;
    coordinator.activate().await.context("워커 활성화 실패")?;

    // 종료 신호
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // 워커 컨트롤 루프
    let (control_tx, control_rx) = control_channel();
    let control_handle =
        spawn_control_loop(Arc::clone(&coordinator), control_rx, shutdown_rx.clone());

    // 텔레메트리 수집기
    let collector = VitalsCollector::new(config.collector.clone());
    collector.initialize();
    collector.set_page_url(config.cache.origin.clone());

    // 백그라운드 동기화
    let sync = Arc::new(BackgroundSync::new(
        Arc::clone(&coordinator),
        config.sync.clone(),
    ));
    let sync_handle = Arc::clone(&sync).spawn(shutdown_rx.clone());

    // API 서버 + SSE 브리지
    let server = WebServer::new(collector.clone(), control_tx, config.web.clone()).with_sync(sync);
    collector.add_observer(BroadcastObserver::new(server.event_sender()));

    info!("NURI 에이전트 시작 — 오리진: {}", config.cache.origin);

    // ctrl-c → 종료 신호
    {
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("종료 신호(ctrl-c) 수신");
                let _ = shutdown_tx.send(true);
            }
        });
    }

    let result = server.run(shutdown_rx).await;

    // 정리 — 수집기와 백그라운드 태스크를 내려놓는다
    let _ = shutdown_tx.send(true);
    collector.cleanup();
    if let Err(e) = control_handle.await {
        warn!("컨트롤 루프 종료 대기 실패: {e}");
    }
    if let Err(e) = sync_handle.await {
        warn!("동기화 루프 종료 대기 실패: {e}");
    }

    result.context("API 서버 실행 실패")
}
