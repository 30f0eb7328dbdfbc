//! 개선 권고 생성.
//!
//! 임계값 규칙으로 사람이 읽을 수 있는 최적화 권고 문자열을 만든다.

use nuri_core::models::vitals::{Rating, VitalsSnapshot, VitalsSummary};

/// TTFB 권고 임계값 (밀리초)
const TTFB_SLOW_MS: f64 = 800.0;

/// 스냅샷/요약에서 개선 권고 목록 생성
///
/// 모든 지표가 양호하면 빈 목록을 반환한다.
pub fn recommendations(snapshot: &VitalsSnapshot, summary: &VitalsSummary) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(lcp) = summary.lcp {
        match lcp.rating {
            Rating::Poor => out.push(
                "LCP 4초 초과 — 히어로 이미지 preload와 WebP/AVIF 포맷 전환, 서버 응답 개선을 검토하세요"
                    .to_string(),
            ),
            Rating::NeedsImprovement => out.push(
                "LCP 2.5초 초과 — 주요 콘텐츠 이미지의 지연 로딩 해제와 preload 적용을 검토하세요"
                    .to_string(),
            ),
            Rating::Good => {}
        }
    }

    if let Some(fid) = summary.fid {
        match fid.rating {
            Rating::Poor => out.push(
                "FID 300ms 초과 — 메인 스레드 장시간 작업을 분할하고 서드파티 스크립트를 지연 로드하세요"
                    .to_string(),
            ),
            Rating::NeedsImprovement => out.push(
                "FID 100ms 초과 — 초기 번들에서 미사용 JavaScript를 제거하세요".to_string(),
            ),
            Rating::Good => {}
        }
    }

    if let Some(cls) = summary.cls {
        match cls.rating {
            Rating::Poor => out.push(
                "CLS 0.25 초과 — 이미지/광고 영역에 명시적 크기를 지정하고 동적 삽입 콘텐츠를 점검하세요"
                    .to_string(),
            ),
            Rating::NeedsImprovement => out.push(
                "CLS 0.1 초과 — 웹 폰트 로딩에 font-display: optional 적용을 검토하세요".to_string(),
            ),
            Rating::Good => {}
        }
    }

    if let Some(ttfb) = snapshot.ttfb_ms {
        if ttfb > TTFB_SLOW_MS {
            out.push(
                "TTFB 800ms 초과 — 서버 캐싱과 CDN 적용, 리다이렉트 체인 축소를 검토하세요"
                    .to_string(),
            );
        }
    }

    if snapshot.error_count > 0 {
        out.push(format!(
            "페이지 런타임 에러 {}건 — 콘솔 에러를 우선 해결하세요",
            snapshot.error_count
        ));
    }

    out
}
