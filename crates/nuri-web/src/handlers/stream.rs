//! SSE 실시간 스트림 핸들러.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use nuri_core::error::CoreError;
use nuri_core::models::vitals::{VitalsSnapshot, VitalsSummary};
use nuri_core::ports::observer::VitalsObserver;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::AppState;

/// 실시간 이벤트 타입
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum RealtimeEvent {
    /// 지표 스냅샷 갱신
    #[serde(rename = "vitals")]
    Vitals(VitalsUpdate),
    /// 연결 확인 (heartbeat)
    #[serde(rename = "ping")]
    Ping,
}

impl RealtimeEvent {
    /// SSE event 필드에 쓰이는 이벤트 이름
    fn name(&self) -> &'static str {
        match self {
            RealtimeEvent::Vitals(_) => "vitals",
            RealtimeEvent::Ping => "ping",
        }
    }
}

/// 지표 갱신 데이터
#[derive(Debug, Clone, Serialize)]
pub struct VitalsUpdate {
    pub timestamp: String,
    pub lcp_ms: Option<f64>,
    pub fid_ms: Option<f64>,
    pub cls: Option<f64>,
    pub overall_score: Option<f64>,
}

/// 수집기 → broadcast 채널 브리지 옵저버
///
/// 수집기의 갱신 통지를 SSE 구독자에게 흘려보낸다. 구독자가 없을 때의
/// 송신 실패는 정상 상황이므로 무시한다.
pub struct BroadcastObserver {
    event_tx: broadcast::Sender<RealtimeEvent>,
}

impl BroadcastObserver {
    /// 새 브리지 옵저버 생성
    pub fn new(event_tx: broadcast::Sender<RealtimeEvent>) -> Arc<Self> {
        Arc::new(Self { event_tx })
    }
}

impl VitalsObserver for BroadcastObserver {
    fn on_update(&self, snapshot: &VitalsSnapshot) -> Result<(), CoreError> {
        let summary = VitalsSummary::from_snapshot(snapshot);
        let update = VitalsUpdate {
            timestamp: chrono::Utc::now().to_rfc3339(),
            lcp_ms: snapshot.lcp_ms,
            fid_ms: snapshot.fid_ms,
            cls: snapshot.cls,
            overall_score: summary.overall_score,
        };

        // 구독자 없음 → 송신 실패는 무시
        let _ = self.event_tx.send(RealtimeEvent::Vitals(update));
        Ok(())
    }
}

/// SSE 스트림 엔드포인트
///
/// GET /api/stream — 지표 갱신을 Server-Sent Events로 전송.
/// 느린 구독자가 놓친 이벤트(`Lagged`)는 조용히 건너뛴다.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = BroadcastStream::new(state.event_tx.subscribe()).filter_map(|received| {
        let event = received.ok()?;
        let json = serde_json::to_string(&event).ok()?;
        Some(Ok(Event::default().event(event.name()).data(json)))
    });

    Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_vitals_event() {
        let event = RealtimeEvent::Vitals(VitalsUpdate {
            timestamp: "2026-01-30T12:00:00Z".to_string(),
            lcp_ms: Some(1_800.0),
            fid_ms: None,
            cls: Some(0.02),
            overall_score: Some(100.0),
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"vitals\""));
        assert!(json.contains("\"lcp_ms\":1800.0"));
    }

    #[test]
    fn event_names() {
        let vitals = RealtimeEvent::Vitals(VitalsUpdate {
            timestamp: String::new(),
            lcp_ms: None,
            fid_ms: None,
            cls: None,
            overall_score: None,
        });
        assert_eq!(vitals.name(), "vitals");
        assert_eq!(RealtimeEvent::Ping.name(), "ping");
    }

    #[test]
    fn broadcast_observer_forwards_updates() {
        let (tx, mut rx) = broadcast::channel(8);
        let observer = BroadcastObserver::new(tx);

        let snapshot = VitalsSnapshot {
            lcp_ms: Some(2_000.0),
            ..Default::default()
        };
        observer.on_update(&snapshot).unwrap();

        let event = rx.try_recv().unwrap();
        match event {
            RealtimeEvent::Vitals(update) => {
                assert_eq!(update.lcp_ms, Some(2_000.0));
                assert_eq!(update.overall_score, Some(100.0));
            }
            other => panic!("예상 밖 이벤트: {other:?}"),
        }
    }

    #[test]
    fn broadcast_observer_ignores_missing_subscribers() {
        let (tx, _) = broadcast::channel(8);
        let observer = BroadcastObserver::new(tx);

        // 구독자가 없어도 에러가 아니다
        observer.on_update(&VitalsSnapshot::default()).unwrap();
    }
}
