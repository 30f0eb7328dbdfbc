//! 캐시 도메인 모델.
//!
//! 리소스 클래스, 캐시된 응답, 요청 메타데이터, 캐시 상태를 정의한다.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 캐시 기록 시각 헤더 — 저장 시점에 RFC3339로 기록된다
pub const CACHE_TIME_HEADER: &str = "sw-cache-time";

/// 리소스 클래스 — 요청 경로로 결정되는 닫힌 열거형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceClass {
    /// 빌드 산출물, 스타일시트, 스크립트
    Static,
    /// 이미지 리소스
    Image,
    /// 웹 폰트
    Font,
    /// `/api/` 경로
    Api,
    /// 그 외 전부 (문서 포함)
    Dynamic,
}

/// 요청 목적지 — 오프라인 문서 폴백 판단에만 사용, 분류에는 미사용
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Destination {
    /// 네비게이션 (HTML 문서)
    Document,
    /// 스크립트
    Script,
    /// 스타일시트
    Style,
    /// 이미지
    Image,
    /// 폰트
    Font,
    /// 기타
    Other,
}

/// 가로챈 fetch 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRequest {
    /// 오리진 기준 경로 (예: "/ja", "/api/contact")
    pub path: String,
    /// 요청 목적지
    pub destination: Destination,
}

impl FetchRequest {
    /// 경로만으로 요청 생성 (목적지는 Other)
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            destination: Destination::Other,
        }
    }

    /// 문서 네비게이션 요청 생성
    pub fn document(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            destination: Destination::Document,
        }
    }
}

/// 캐시에 저장되는 (그리고 네트워크에서 받아오는) 응답
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// HTTP 상태 코드
    pub status: u16,
    /// 응답 헤더 (소문자 키)
    pub headers: HashMap<String, String>,
    /// 응답 본문
    pub body: Vec<u8>,
}

impl CachedResponse {
    /// 상태 코드와 본문으로 응답 생성
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body,
        }
    }

    /// 2xx 성공 응답 여부
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 헤더 조회 (소문자 키)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// 헤더 추가 빌더
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }
}

/// 워커 라이프사이클 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkerPhase {
    /// 설치 중 (프리캐시 진행)
    Installing,
    /// 설치 완료, 활성화 대기
    Installed,
    /// 활성화 중 (구버전 캐시 정리)
    Activating,
    /// 활성화 완료 — fetch 가로채기 시작
    Activated,
}

impl std::fmt::Display for WorkerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkerPhase::Installing => "installing",
            WorkerPhase::Installed => "installed",
            WorkerPhase::Activating => "activating",
            WorkerPhase::Activated => "activated",
        };
        f.write_str(name)
    }
}

/// 캐시 상태 응답 (`GET_CACHE_STATUS` 컨트롤 메시지)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatus {
    /// 현재 라이프사이클 단계
    pub phase: WorkerPhase,
    /// 현재 버전의 네 캐시 식별자
    pub cache_names: Vec<String>,
    /// 캐시별 엔트리 수
    pub entry_counts: HashMap<String, u64>,
}
