//! 캐시 저장소 포트.
//!
//! 구현: `nuri-store` crate (rusqlite)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::cache::CachedResponse;

/// 이름 붙은 캐시들의 저장소
///
/// 코디네이터가 단독으로 소유하며, 모든 접근은 가로챈 fetch 이벤트를
/// 통해서만 이루어진다. 동일 경로에 대한 동시 put은 last-write-wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// 캐시를 연다 (없으면 빈 캐시 생성)
    async fn open_cache(&self, cache: &str) -> Result<(), CoreError>;

    /// 엔트리 조회
    async fn get(&self, cache: &str, path: &str) -> Result<Option<CachedResponse>, CoreError>;

    /// 엔트리 저장 (기존 엔트리 덮어쓰기)
    async fn put(&self, cache: &str, path: &str, response: &CachedResponse)
        -> Result<(), CoreError>;

    /// 엔트리 삭제 — 존재했으면 true
    async fn delete(&self, cache: &str, path: &str) -> Result<bool, CoreError>;

    /// 캐시 내 전체 경로 목록
    async fn list_paths(&self, cache: &str) -> Result<Vec<String>, CoreError>;

    /// 존재하는 캐시 이름 목록
    async fn cache_names(&self) -> Result<Vec<String>, CoreError>;

    /// 캐시 전체 삭제 (엔트리 포함) — 존재했으면 true
    async fn delete_cache(&self, cache: &str) -> Result<bool, CoreError>;

    /// 캐시 내 엔트리 수
    async fn entry_count(&self, cache: &str) -> Result<u64, CoreError>;
}
