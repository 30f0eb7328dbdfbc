//! 워커 컨트롤 채널.
//!
//! postMessage에 해당하는 mpsc 컨트롤 루프. 상태 조회는 oneshot 포트로
//! 응답한다. 메시지 단위로 에러를 격리하며, 한 메시지의 실패가 루프를
//! 중단시키지 않는다.

use nuri_core::error::CoreError;
use nuri_core::models::cache::CacheStatus;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::coordinator::CacheCoordinator;

/// 컨트롤 채널 용량
pub const CONTROL_CHANNEL_CAPACITY: usize = 32;

/// 워커 컨트롤 메시지
#[derive(Debug)]
pub enum ControlMessage {
    /// 대기 중인 워커를 즉시 활성화
    SkipWaiting,
    /// 캐시 상태 조회 — 제공된 포트로 응답
    CacheStatus {
        /// 응답 포트
        reply: oneshot::Sender<CacheStatus>,
    },
    /// push 이벤트 (로그만)
    Push {
        /// 페이로드
        payload: Option<String>,
    },
    /// 알림 클릭 이벤트 (로그만)
    NotificationClick {
        /// 클릭된 액션
        action: Option<String>,
    },
}

/// 컨트롤 채널 생성
pub fn control_channel() -> (mpsc::Sender<ControlMessage>, mpsc::Receiver<ControlMessage>) {
    mpsc::channel(CONTROL_CHANNEL_CAPACITY)
}

/// 컨트롤 루프 시작
///
/// 종료 신호(watch) 또는 송신단 전체 drop 시 루프가 끝난다.
pub fn spawn_control_loop(
    coordinator: Arc<CacheCoordinator>,
    mut rx: mpsc::Receiver<ControlMessage>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else {
                        debug!("컨트롤 송신단 종료 — 루프 종료");
                        break;
                    };
                    if let Err(e) = handle_message(&coordinator, msg).await {
                        // 메시지 단위 격리 — 루프는 계속
                        error!("컨트롤 메시지 처리 실패: {e}");
                    }
                }
                changed = shutdown_rx.changed() => {
                    // 송신단이 drop되어도 종료
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("컨트롤 루프 종료");
                        break;
                    }
                }
            }
        }
    })
}

/// 단일 컨트롤 메시지 처리
async fn handle_message(
    coordinator: &CacheCoordinator,
    msg: ControlMessage,
) -> Result<(), CoreError> {
    match msg {
        ControlMessage::SkipWaiting => coordinator.skip_waiting().await,
        ControlMessage::CacheStatus { reply } => {
            let status = coordinator.cache_status().await?;
            if reply.send(status).is_err() {
                debug!("캐시 상태 수신자 없음 — 응답 폐기");
            }
            Ok(())
        }
        ControlMessage::Push { payload } => {
            info!("push 수신 (처리 없음): {payload:?}");
            Ok(())
        }
        ControlMessage::NotificationClick { action } => {
            info!("notificationclick 수신 (처리 없음): {action:?}");
            Ok(())
        }
    }
}
