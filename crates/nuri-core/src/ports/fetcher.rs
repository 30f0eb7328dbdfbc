//! 네트워크 fetch 포트.
//!
//! 구현: `nuri-cache` crate의 `HttpFetcher` (reqwest)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::cache::CachedResponse;

/// 오리진으로의 아웃바운드 fetch
///
/// 전송 실패는 `CoreError::Network`, 데드라인 초과는
/// `CoreError::FetchTimeout`으로 반환한다. 2xx가 아닌 응답은
/// 에러가 아니라 상태 코드가 담긴 응답으로 반환된다.
#[async_trait]
pub trait NetworkFetcher: Send + Sync {
    /// 오리진 기준 경로를 fetch
    async fn fetch(&self, path: &str) -> Result<CachedResponse, CoreError>;
}
