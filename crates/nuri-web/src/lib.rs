//! # nuri-web
//!
//! 로컬 API 서버.
//! Axum 기반 REST API — 텔레메트리 조회/액션/비콘 수신, 캐시 상태,
//! 실시간 SSE 스트림.
//!
//! ## 기능
//! - 지표 스냅샷 + 요약 + 개선 권고 조회
//! - 액션 실행 (reset-metrics, reset-bundle-analysis, generate-report,
//!   optimize-performance)
//! - 성능 엔트리 비콘 수신
//! - 캐시 상태 조회 (컨트롤 채널 경유)
//! - SSE 실시간 지표 스트림

pub mod error;
pub mod handlers;
pub mod routes;

use axum::Router;
use nuri_cache::{BackgroundSync, ControlMessage};
use nuri_core::config::WebConfig;
use nuri_vitals::VitalsCollector;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, watch};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

// 실시간 이벤트 타입 re-export
pub use handlers::stream::{BroadcastObserver, RealtimeEvent, VitalsUpdate};

/// 실시간 이벤트 브로드캐스트 채널 용량
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// 포트 바인드 최대 시도 횟수
const MAX_PORT_ATTEMPTS: u16 = 10;

/// 웹 서버 애플리케이션 상태
#[derive(Clone)]
pub struct AppState {
    /// 텔레메트리 수집기 핸들
    pub collector: VitalsCollector,
    /// 캐시 코디네이터 컨트롤 채널
    pub cache_control: mpsc::Sender<ControlMessage>,
    /// 백그라운드 동기화 (optimize-performance 액션용)
    pub sync: Option<Arc<BackgroundSync>>,
    /// 실시간 이벤트 송신 채널
    pub event_tx: broadcast::Sender<RealtimeEvent>,
}

/// 로컬 API 서버
pub struct WebServer {
    config: WebConfig,
    state: AppState,
}

impl WebServer {
    /// 새 웹 서버 생성
    pub fn new(
        collector: VitalsCollector,
        cache_control: mpsc::Sender<ControlMessage>,
        config: WebConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            state: AppState {
                collector,
                cache_control,
                sync: None,
                event_tx,
            },
        }
    }

    /// 백그라운드 동기화 설정
    pub fn with_sync(mut self, sync: Arc<BackgroundSync>) -> Self {
        self.state.sync = Some(sync);
        self
    }

    /// 외부에서 생성된 이벤트 브로드캐스트 채널 설정
    pub fn with_event_tx(mut self, event_tx: broadcast::Sender<RealtimeEvent>) -> Self {
        self.state.event_tx = event_tx;
        self
    }

    /// 실시간 이벤트 송신 채널 반환
    ///
    /// 수집기 브리지 옵저버를 연결할 때 사용.
    pub fn event_sender(&self) -> broadcast::Sender<RealtimeEvent> {
        self.state.event_tx.clone()
    }

    /// 서버 실행
    ///
    /// 기본 포트가 사용 중이면 인접 포트를 차례로 시도한다
    /// (최대 [`MAX_PORT_ATTEMPTS`]개). 종료는 watch 채널이 `true`가 될 때.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) -> Result<(), std::io::Error> {
        let host = if self.config.allow_external {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };

        let app = Router::new()
            .nest("/api", routes::api_routes())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(self.state);

        let (listener, addr) = bind_available_port(host, self.config.port).await?;
        info!("API 서버 시작: http://{addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                // 송신단 drop도 종료로 취급
                let _ = shutdown_rx.wait_for(|stop| *stop).await;
                info!("웹 서버 종료 신호 수신");
            })
            .await?;

        info!("API 서버 종료");
        Ok(())
    }

    /// 서버 URL 반환
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.config.port)
    }
}

/// 사용 가능한 포트에 리스너 바인드
///
/// `base_port`부터 시작해 `AddrInUse`면 다음 포트로 넘어간다.
/// 그 밖의 바인드 에러는 즉시 반환.
async fn bind_available_port(
    host: &str,
    base_port: u16,
) -> Result<(TcpListener, SocketAddr), std::io::Error> {
    let mut last_error = None;

    for attempt in 0..MAX_PORT_ATTEMPTS {
        let port = base_port.saturating_add(attempt);
        if attempt > 0 && port == base_port.saturating_add(attempt - 1) {
            break; // u16 상한 도달
        }

        let addr: SocketAddr = match format!("{host}:{port}").parse() {
            Ok(a) => a,
            Err(e) => {
                error!("잘못된 주소 {host}:{port} — {e}");
                continue;
            }
        };

        match TcpListener::bind(addr).await {
            Ok(listener) => {
                if attempt > 0 {
                    warn!("포트 {base_port} 사용 불가, 대체 포트 {port} 사용");
                }
                return Ok((listener, addr));
            }
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                warn!("포트 {port} 이미 사용 중");
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            format!(
                "포트 {}-{} 모두 사용 불가",
                base_port,
                base_port.saturating_add(MAX_PORT_ATTEMPTS - 1)
            ),
        )
    }))
}


#[cfg(test)]
mod tests {
    use super::*;
    use nuri_cache::control_channel;
    use nuri_core::config::CollectorConfig;

    #[test]
    fn default_config() {
        let config = WebConfig::default();
        assert_eq!(config.port, 9400);
        assert!(!config.allow_external);
    }

    #[tokio::test]
    async fn web_server_url() {
        let collector = VitalsCollector::new(CollectorConfig::default());
        let (control_tx, _control_rx) = control_channel();
        let server = WebServer::new(collector, control_tx, WebConfig::default());
        assert_eq!(server.url(), "http://localhost:9400");
    }

    #[tokio::test]
    async fn bind_skips_occupied_port() {
        let occupied = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = occupied.local_addr().unwrap().port();

        let (_listener, addr) = bind_available_port("127.0.0.1", base).await.unwrap();
        assert_ne!(addr.port(), base);
    }
}
