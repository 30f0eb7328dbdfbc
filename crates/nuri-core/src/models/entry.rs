//! 성능 엔트리 모델.
//!
//! 페이지가 비콘으로 전송하는 브라우저 PerformanceObserver 엔트리를
//! 태그드 enum으로 정의한다. `entry_type` 태그는 브라우저의
//! entryType 문자열과 동일한 kebab-case 값을 사용한다.

use serde::{Deserialize, Serialize};

/// 단일 성능 엔트리
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entry_type", rename_all = "kebab-case")]
pub enum PerformanceEntry {
    /// 최대 콘텐츠풀 페인트
    LargestContentfulPaint {
        /// 렌더 시점 (밀리초)
        start_time_ms: f64,
    },
    /// 첫 입력 — FID = processing_start - start_time
    FirstInput {
        /// 입력 발생 시점 (밀리초)
        start_time_ms: f64,
        /// 핸들러 처리 시작 시점 (밀리초)
        processing_start_ms: f64,
    },
    /// 레이아웃 이동 — 최근 입력이 있었으면 CLS에 누적하지 않음
    LayoutShift {
        /// 이동 점수
        value: f64,
        /// 500ms 내 사용자 입력 여부
        had_recent_input: bool,
    },
    /// 첫 콘텐츠풀 페인트
    FirstContentfulPaint {
        /// 페인트 시점 (밀리초)
        start_time_ms: f64,
    },
    /// 네비게이션 타이밍 — TTFB = response_start - request_start
    Navigation {
        /// 요청 시작 (밀리초)
        request_start_ms: f64,
        /// 첫 바이트 수신 (밀리초)
        response_start_ms: f64,
        /// DOMContentLoaded 완료 (밀리초)
        dom_content_loaded_ms: f64,
        /// load 이벤트 완료 (밀리초)
        load_event_end_ms: f64,
    },
    /// 리소스 로드 타이밍
    Resource {
        /// 리소스 URL
        name: String,
        /// 로드 시간 (밀리초)
        duration_ms: f64,
    },
    /// 인터랙션 지연 (INP 산출용)
    Interaction {
        /// 입력부터 다음 페인트까지 (밀리초)
        duration_ms: f64,
    },
    /// 페이지 런타임 에러
    PageError {
        /// 에러 메시지
        message: String,
    },
    /// 페이지 경고 (콘솔 warn)
    PageWarning {
        /// 경고 메시지
        message: String,
    },
}

/// 지표 패밀리 — 수집기가 패밀리 단위로 핸들러를 등록한다
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricFamily {
    /// Largest Contentful Paint
    Lcp,
    /// First Input Delay
    Fid,
    /// Cumulative Layout Shift
    Cls,
    /// First Contentful Paint
    Fcp,
    /// 네비게이션 타이밍 (TTFB, 로드/DOM 준비 시점)
    Navigation,
    /// 리소스 타이밍
    Resource,
    /// 인터랙션 (INP)
    Interaction,
    /// 에러/경고 카운터
    PageFaults,
}

impl MetricFamily {
    /// 전체 패밀리 목록 (수집기 초기화 순서)
    pub const ALL: [MetricFamily; 8] = [
        MetricFamily::Lcp,
        MetricFamily::Fid,
        MetricFamily::Cls,
        MetricFamily::Fcp,
        MetricFamily::Navigation,
        MetricFamily::Resource,
        MetricFamily::Interaction,
        MetricFamily::PageFaults,
    ];
}

impl PerformanceEntry {
    /// 엔트리가 속하는 지표 패밀리
    pub fn family(&self) -> MetricFamily {
        match self {
            PerformanceEntry::LargestContentfulPaint { .. } => MetricFamily::Lcp,
            PerformanceEntry::FirstInput { .. } => MetricFamily::Fid,
            PerformanceEntry::LayoutShift { .. } => MetricFamily::Cls,
            PerformanceEntry::FirstContentfulPaint { .. } => MetricFamily::Fcp,
            PerformanceEntry::Navigation { .. } => MetricFamily::Navigation,
            PerformanceEntry::Resource { .. } => MetricFamily::Resource,
            PerformanceEntry::Interaction { .. } => MetricFamily::Interaction,
            PerformanceEntry::PageError { .. } | PerformanceEntry::PageWarning { .. } => {
                MetricFamily::PageFaults
            }
        }
    }
}
