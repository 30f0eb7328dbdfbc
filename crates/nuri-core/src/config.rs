//! 애플리케이션 설정 구조체.
//!
//! 오리진 URL, 수집기 주기, 캐시 TTL, 프리캐시 매니페스트, 웹 서버 포트 등
//! 런타임 설정을 정의한다. `ConfigManager`가 JSON 파일로 저장/로드한다.

use serde::{Deserialize, Serialize};

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 텔레메트리 수집기 설정
    #[serde(default)]
    pub collector: CollectorConfig,
    /// 캐시 코디네이터 설정
    #[serde(default)]
    pub cache: CacheConfig,
    /// 백그라운드 동기화 설정
    #[serde(default)]
    pub sync: SyncConfig,
    /// 웹 서버 설정
    #[serde(default)]
    pub web: WebConfig,
}

impl AppConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self::default()
    }
}

// ============================================================
// 수집기 설정
// ============================================================

/// 텔레메트리 수집기 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// 메모리 폴링 주기 (밀리초)
    #[serde(default = "default_memory_poll_interval_ms")]
    pub memory_poll_interval_ms: u64,
    /// 리소스 타이밍 맵 용량 (LRU 상한)
    #[serde(default = "default_resource_timing_capacity")]
    pub resource_timing_capacity: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            memory_poll_interval_ms: default_memory_poll_interval_ms(),
            resource_timing_capacity: default_resource_timing_capacity(),
        }
    }
}

fn default_memory_poll_interval_ms() -> u64 {
    30_000
}

fn default_resource_timing_capacity() -> usize {
    512
}

// ============================================================
// 캐시 설정
// ============================================================

/// 캐시 코디네이터 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// 업스트림 오리진 (프록시 대상 사이트)
    #[serde(default = "default_origin")]
    pub origin: String,
    /// 요청별 타임아웃 (밀리초)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// 설치 시 프리캐시할 경로 목록
    #[serde(default = "default_precache_paths")]
    pub precache_paths: Vec<String>,
    /// 오프라인 폴백 문서 경로
    #[serde(default = "default_offline_path")]
    pub offline_path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            request_timeout_ms: default_request_timeout_ms(),
            precache_paths: default_precache_paths(),
            offline_path: default_offline_path(),
        }
    }
}

fn default_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_precache_paths() -> Vec<String> {
    [
        "/",
        "/ja",
        "/en",
        "/offline.html",
        "/icons/icon-192.png",
        "/icons/icon-512.png",
        "/fonts/NotoSansJP-Regular.woff2",
        "/images/hero.webp",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_offline_path() -> String {
    "/offline.html".to_string()
}

// ============================================================
// 백그라운드 동기화 설정
// ============================================================

/// 백그라운드 동기화 설정 — 만료 엔트리 정리 + 주요 경로 예열
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// 동기화 주기 (밀리초)
    #[serde(default = "default_sync_interval_ms")]
    pub interval_ms: u64,
    /// 예열(warm-up)할 주요 페이지 경로
    #[serde(default = "default_warm_paths")]
    pub warm_paths: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_sync_interval_ms(),
            warm_paths: default_warm_paths(),
        }
    }
}

fn default_sync_interval_ms() -> u64 {
    900_000 // 15분
}

fn default_warm_paths() -> Vec<String> {
    ["/", "/ja", "/en", "/services", "/contact"]
        .into_iter()
        .map(String::from)
        .collect()
}

// ============================================================
// 웹 서버 설정
// ============================================================

/// 웹 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// 바인드 포트
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// 외부 접속 허용 여부 (false면 127.0.0.1만)
    #[serde(default)]
    pub allow_external: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_web_port(),
            allow_external: false,
        }
    }
}

fn default_web_port() -> u16 {
    9400
}
