//! 텔레메트리 수집기.
//!
//! 성능 엔트리를 패밀리별 핸들러로 스냅샷에 반영하고 옵저버에게
//! 통지한다. 페이지 수명 단위의 단일 가변 스냅샷을 단독 소유하며,
//! 외부에는 복사본만 노출한다.

use lru::LruCache;
use nuri_core::config::CollectorConfig;
use nuri_core::error::CoreError;
use nuri_core::models::entry::{MetricFamily, PerformanceEntry};
use nuri_core::models::report::PerformanceReport;
use nuri_core::models::vitals::{MemoryUsage, VitalsSnapshot, VitalsSummary};
use nuri_core::ports::observer::VitalsObserver;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::memory::MemoryProbe;
use crate::report;

/// 메모리 폴링 주기 하한 (밀리초)
const MIN_MEMORY_POLL_INTERVAL_MS: u64 = 1_000;

/// 수집기 내부 상태 — 스냅샷의 원본
struct SnapshotState {
    lcp_ms: Option<f64>,
    fid_ms: Option<f64>,
    cls: Option<f64>,
    ttfb_ms: Option<f64>,
    fcp_ms: Option<f64>,
    inp_ms: Option<f64>,
    page_load_ms: Option<f64>,
    dom_ready_ms: Option<f64>,
    /// 리소스 URL → 로드 시간. LRU 용량 제한으로 무한 성장 방지
    resource_timings: LruCache<String, f64>,
    error_count: u64,
    warning_count: u64,
    memory: Option<MemoryUsage>,
}

impl SnapshotState {
    fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            lcp_ms: None,
            fid_ms: None,
            cls: None,
            ttfb_ms: None,
            fcp_ms: None,
            inp_ms: None,
            page_load_ms: None,
            dom_ready_ms: None,
            resource_timings: LruCache::new(capacity),
            error_count: 0,
            warning_count: 0,
            memory: None,
        }
    }

    /// 방어적 복사본 생성
    fn to_snapshot(&self) -> VitalsSnapshot {
        VitalsSnapshot {
            lcp_ms: self.lcp_ms,
            fid_ms: self.fid_ms,
            cls: self.cls,
            ttfb_ms: self.ttfb_ms,
            fcp_ms: self.fcp_ms,
            inp_ms: self.inp_ms,
            page_load_ms: self.page_load_ms,
            dom_ready_ms: self.dom_ready_ms,
            resource_timings: self
                .resource_timings
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            error_count: self.error_count,
            warning_count: self.warning_count,
            memory: self.memory,
        }
    }
}

/// 패밀리별 엔트리 핸들러
struct FamilyHandler {
    family: MetricFamily,
    apply: fn(&mut SnapshotState, &PerformanceEntry) -> bool,
}

/// 수집기 공유 내부 (핸들 간 Arc 공유)
struct CollectorInner {
    config: CollectorConfig,
    state: Mutex<SnapshotState>,
    observers: Mutex<Vec<Arc<dyn VitalsObserver>>>,
    handlers: Mutex<Vec<FamilyHandler>>,
    initialized: AtomicBool,
    poll_handle: Mutex<Option<JoinHandle<()>>>,
    page_url: Mutex<Option<String>>,
}

impl CollectorInner {
    /// 옵저버 통지 — 리스너별 실패 격리
    fn notify(&self, snapshot: &VitalsSnapshot) {
        let observers: Vec<_> = self.observers.lock().clone();
        for observer in observers {
            if let Err(e) = observer.on_update(snapshot) {
                // 한 리스너의 실패가 다른 리스너를 막지 않는다
                warn!("옵저버 통지 실패 (격리됨): {e}");
            }
        }
    }

    /// 옵저버 에러 통지
    fn notify_error(&self, error: &CoreError) {
        let observers: Vec<_> = self.observers.lock().clone();
        for observer in observers {
            observer.on_error(error);
        }
    }

    /// 메모리 사용량 갱신 (폴링 태스크에서 호출)
    fn apply_memory(&self, usage: MemoryUsage) {
        let snapshot = {
            let mut state = self.state.lock();
            state.memory = Some(usage);
            state.to_snapshot()
        };
        self.notify(&snapshot);
    }
}

/// 텔레메트리 수집기
///
/// 애플리케이션 컨텍스트가 명시적으로 생성/소유하고 `initialize()` /
/// `cleanup()`으로 수명을 제어한다. 핸들은 저렴하게 복제되며 내부
/// 상태를 공유한다.
#[derive(Clone)]
pub struct VitalsCollector {
    inner: Arc<CollectorInner>,
}

impl VitalsCollector {
    /// 새 수집기 생성 (초기화 전 상태)
    pub fn new(config: CollectorConfig) -> Self {
        let capacity = config.resource_timing_capacity;
        Self {
            inner: Arc::new(CollectorInner {
                config,
                state: Mutex::new(SnapshotState::new(capacity)),
                observers: Mutex::new(Vec::new()),
                handlers: Mutex::new(Vec::new()),
                initialized: AtomicBool::new(false),
                poll_handle: Mutex::new(None),
                page_url: Mutex::new(None),
            }),
        }
    }

    /// 수집기 초기화 — 멱등
    ///
    /// 패밀리별 핸들러를 등록하고 메모리 폴링 태스크를 시작한다.
    /// 개별 패밀리의 등록 실패는 경고 후 건너뛰며 (해당 지표는 페이지
    /// 수명 동안 None으로 남는다), 나머지 패밀리 등록을 막지 않는다.
    pub fn initialize(&self) {
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            debug!("수집기 이미 초기화됨 — 무시");
            return;
        }

        {
            let mut handlers = self.inner.handlers.lock();
            handlers.clear();
            for family in MetricFamily::ALL {
                match Self::setup_family(family) {
                    Ok(handler) => handlers.push(handler),
                    Err(e) => {
                        warn!("{family:?} 핸들러 등록 실패, 해당 지표는 수집되지 않음: {e}")
                    }
                }
            }
            debug!("지표 핸들러 {}개 등록", handlers.len());
        }

        self.spawn_memory_poll();
    }

    /// 패밀리별 핸들러 구성
    fn setup_family(family: MetricFamily) -> Result<FamilyHandler, CoreError> {
        let apply = match family {
            MetricFamily::Lcp => apply_lcp,
            MetricFamily::Fid => apply_fid,
            MetricFamily::Cls => apply_cls,
            MetricFamily::Fcp => apply_fcp,
            MetricFamily::Navigation => apply_navigation,
            MetricFamily::Resource => apply_resource,
            MetricFamily::Interaction => apply_interaction,
            MetricFamily::PageFaults => apply_page_faults,
        };
        Ok(FamilyHandler { family, apply })
    }

    /// 메모리 폴링 태스크 시작
    fn spawn_memory_poll(&self) {
        let interval_ms = self
            .inner
            .config
            .memory_poll_interval_ms
            .max(MIN_MEMORY_POLL_INTERVAL_MS);
        let weak: Weak<CollectorInner> = Arc::downgrade(&self.inner);
        let probe = MemoryProbe::new();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if let Some(usage) = probe.sample() {
                    inner.apply_memory(usage);
                }
            }
        });

        *self.inner.poll_handle.lock() = Some(handle);
    }

    /// 성능 엔트리 반영
    ///
    /// 스냅샷이 실제로 변경되었을 때만 옵저버에게 통지하고 true를
    /// 반환한다. 음수 타이밍 등 잘못된 엔트리는 무시된다.
    pub fn ingest(&self, entry: &PerformanceEntry) -> bool {
        if !self.inner.initialized.load(Ordering::SeqCst) {
            debug!("초기화 전 엔트리 무시: {entry:?}");
            return false;
        }

        if let Some(reason) = validate_entry(entry) {
            warn!("잘못된 성능 엔트리 무시 ({reason}): {entry:?}");
            self.inner.notify_error(&CoreError::Internal(format!(
                "잘못된 성능 엔트리: {reason}"
            )));
            return false;
        }

        let apply = {
            let handlers = self.inner.handlers.lock();
            handlers
                .iter()
                .find(|h| h.family == entry.family())
                .map(|h| h.apply)
        };
        let Some(apply) = apply else {
            // 등록 실패한 패밀리의 엔트리 — 해당 지표는 수집되지 않음
            return false;
        };

        let snapshot = {
            let mut state = self.inner.state.lock();
            if !apply(&mut state, entry) {
                return false;
            }
            state.to_snapshot()
        };

        self.inner.notify(&snapshot);
        true
    }

    /// 옵저버 등록 — O(1) 상각
    pub fn add_observer(&self, observer: Arc<dyn VitalsObserver>) {
        self.inner.observers.lock().push(observer);
    }

    /// 옵저버 해제 — 등록된 적 없는 리스너면 no-op
    pub fn remove_observer(&self, observer: &Arc<dyn VitalsObserver>) {
        self.inner
            .observers
            .lock()
            .retain(|o| !Arc::ptr_eq(o, observer));
    }

    /// 현재 스냅샷 반환 (방어적 복사)
    pub fn metrics(&self) -> VitalsSnapshot {
        self.inner.state.lock().to_snapshot()
    }

    /// 스냅샷을 빈 상태로 교체하고 즉시 옵저버에게 통지
    ///
    /// 수동 테스트/디버그 용도 — 정상 수명주기의 일부가 아니다.
    pub fn reset_metrics(&self) {
        let snapshot = {
            let mut state = self.inner.state.lock();
            *state = SnapshotState::new(self.inner.config.resource_timing_capacity);
            state.to_snapshot()
        };
        debug!("스냅샷 초기화");
        self.inner.notify(&snapshot);
    }

    /// 리소스 타이밍 맵만 비운다
    pub fn reset_resource_timings(&self) {
        self.inner.state.lock().resource_timings.clear();
        debug!("리소스 타이밍 초기화");
    }

    /// 측정 대상 페이지 URL 기록
    pub fn set_page_url(&self, url: impl Into<String>) {
        *self.inner.page_url.lock() = Some(url.into());
    }

    /// 성능 리포트 생성 — 스냅샷 + 요약 + 개선 권고
    pub fn generate_report(&self) -> PerformanceReport {
        let snapshot = self.metrics();
        let summary = VitalsSummary::from_snapshot(&snapshot);
        let recommendations = report::recommendations(&snapshot, &summary);

        PerformanceReport {
            report_id: Uuid::new_v4(),
            generated_at: chrono::Utc::now(),
            page_url: self.inner.page_url.lock().clone(),
            snapshot,
            summary,
            recommendations,
        }
    }

    /// 수집기 정리 — 여러 번 호출해도 안전
    ///
    /// 폴링 태스크를 중단하고 핸들러/옵저버 목록을 비운다.
    pub fn cleanup(&self) {
        if let Some(handle) = self.inner.poll_handle.lock().take() {
            handle.abort();
        }
        self.inner.handlers.lock().clear();
        self.inner.observers.lock().clear();
        self.inner.initialized.store(false, Ordering::SeqCst);
        debug!("수집기 정리 완료");
    }

    /// 등록된 패밀리 핸들러 수
    pub fn handler_count(&self) -> usize {
        self.inner.handlers.lock().len()
    }

    /// 등록된 옵저버 수
    pub fn observer_count(&self) -> usize {
        self.inner.observers.lock().len()
    }
}

/// 엔트리 유효성 검사 — 위반 사유 반환, 정상이면 None
///
/// 스냅샷 불변식: 모든 타이밍은 None 또는 0 이상.
fn validate_entry(entry: &PerformanceEntry) -> Option<&'static str> {
    match entry {
        PerformanceEntry::LargestContentfulPaint { start_time_ms }
        | PerformanceEntry::FirstContentfulPaint { start_time_ms } => {
            (*start_time_ms < 0.0).then_some("음수 페인트 시점")
        }
        PerformanceEntry::FirstInput {
            start_time_ms,
            processing_start_ms,
        } => {
            if *start_time_ms < 0.0 || *processing_start_ms < 0.0 {
                Some("음수 입력 시점")
            } else if processing_start_ms < start_time_ms {
                Some("입력보다 빠른 처리 시점")
            } else {
                None
            }
        }
        PerformanceEntry::LayoutShift { value, .. } => (*value < 0.0).then_some("음수 이동 점수"),
        PerformanceEntry::Navigation {
            request_start_ms,
            response_start_ms,
            dom_content_loaded_ms,
            load_event_end_ms,
        } => {
            if *request_start_ms < 0.0
                || *response_start_ms < 0.0
                || *dom_content_loaded_ms < 0.0
                || *load_event_end_ms < 0.0
            {
                Some("음수 네비게이션 타이밍")
            } else if response_start_ms < request_start_ms {
                Some("요청보다 빠른 응답 시점")
            } else {
                None
            }
        }
        PerformanceEntry::Resource { duration_ms, .. }
        | PerformanceEntry::Interaction { duration_ms } => {
            (*duration_ms < 0.0).then_some("음수 소요 시간")
        }
        PerformanceEntry::PageError { .. } | PerformanceEntry::PageWarning { .. } => None,
    }
}

// ============================================================
// 패밀리별 apply 함수
// ============================================================

/// LCP — 가장 최근 후보가 최종값
fn apply_lcp(state: &mut SnapshotState, entry: &PerformanceEntry) -> bool {
    if let PerformanceEntry::LargestContentfulPaint { start_time_ms } = entry {
        state.lcp_ms = Some(*start_time_ms);
        true
    } else {
        false
    }
}

/// FID — 첫 입력만 기록
fn apply_fid(state: &mut SnapshotState, entry: &PerformanceEntry) -> bool {
    if let PerformanceEntry::FirstInput {
        start_time_ms,
        processing_start_ms,
    } = entry
    {
        if state.fid_ms.is_some() {
            return false;
        }
        state.fid_ms = Some(processing_start_ms - start_time_ms);
        true
    } else {
        false
    }
}

/// CLS — 최근 입력이 없는 이동만 누적 (단조 증가)
fn apply_cls(state: &mut SnapshotState, entry: &PerformanceEntry) -> bool {
    if let PerformanceEntry::LayoutShift {
        value,
        had_recent_input,
    } = entry
    {
        if *had_recent_input {
            return false;
        }
        state.cls = Some(state.cls.unwrap_or(0.0) + value);
        true
    } else {
        false
    }
}

/// FCP — 첫 페인트만 기록
fn apply_fcp(state: &mut SnapshotState, entry: &PerformanceEntry) -> bool {
    if let PerformanceEntry::FirstContentfulPaint { start_time_ms } = entry {
        if state.fcp_ms.is_some() {
            return false;
        }
        state.fcp_ms = Some(*start_time_ms);
        true
    } else {
        false
    }
}

/// 네비게이션 타이밍 — TTFB, DOM 준비, 로드 완료
fn apply_navigation(state: &mut SnapshotState, entry: &PerformanceEntry) -> bool {
    if let PerformanceEntry::Navigation {
        request_start_ms,
        response_start_ms,
        dom_content_loaded_ms,
        load_event_end_ms,
    } = entry
    {
        state.ttfb_ms = Some(response_start_ms - request_start_ms);
        state.dom_ready_ms = Some(*dom_content_loaded_ms);
        state.page_load_ms = Some(*load_event_end_ms);
        true
    } else {
        false
    }
}

/// 리소스 타이밍 — URL별 최신값, LRU 용량 제한
fn apply_resource(state: &mut SnapshotState, entry: &PerformanceEntry) -> bool {
    if let PerformanceEntry::Resource { name, duration_ms } = entry {
        state.resource_timings.put(name.clone(), *duration_ms);
        true
    } else {
        false
    }
}

/// INP — 관측된 최악 인터랙션 지연
fn apply_interaction(state: &mut SnapshotState, entry: &PerformanceEntry) -> bool {
    if let PerformanceEntry::Interaction { duration_ms } = entry {
        match state.inp_ms {
            Some(current) if current >= *duration_ms => false,
            _ => {
                state.inp_ms = Some(*duration_ms);
                true
            }
        }
    } else {
        false
    }
}

/// 에러/경고 카운터
fn apply_page_faults(state: &mut SnapshotState, entry: &PerformanceEntry) -> bool {
    match entry {
        PerformanceEntry::PageError { .. } => {
            state.error_count += 1;
            true
        }
        PerformanceEntry::PageWarning { .. } => {
            state.warning_count += 1;
            true
        }
        _ => false,
    }
}
