//! NURI 공통 에러 타입.
//!
//! 어댑터 crate(네트워크, 저장소, 웹)는 외부 라이브러리의 에러를
//! `CoreError`로 변환해 반환한다.

use thiserror::Error;

/// 도메인 공통 에러
#[derive(Debug, Error)]
pub enum CoreError {
    /// 네트워크 에러 (연결 실패, DNS 오류 등)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 요청별 데드라인 초과
    #[error("요청 타임아웃: {timeout_ms}ms 초과")]
    FetchTimeout {
        /// 초과된 타임아웃 (밀리초)
        timeout_ms: u64,
    },

    /// 캐시 저장소 에러
    #[error("저장소 에러: {0}")]
    Storage(String),

    /// 리소스를 찾을 수 없음
    #[error("{resource_type}을(를) 찾을 수 없음: {id}")]
    NotFound {
        /// 리소스 종류 (예: "Cache", "Entry")
        resource_type: String,
        /// 리소스 식별자
        id: String,
    },

    /// 허용되지 않는 라이프사이클 단계에서의 호출
    #[error("잘못된 상태 — 기대: {expected}, 실제: {actual}")]
    InvalidState {
        /// 기대한 상태
        expected: String,
        /// 실제 상태
        actual: String,
    },

    /// 설정값 오류
    #[error("설정 오류: {0}")]
    Config(String),

    /// JSON 직렬화/역직렬화 실패
    #[error("JSON 처리 실패: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 옵저버(리스너) 콜백 실패
    #[error("옵저버 에러: {0}")]
    Observer(String),

    /// 예상치 못한 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),

    /// I/O 실패
    #[error("I/O 실패: {0}")]
    Io(#[from] std::io::Error),
}
