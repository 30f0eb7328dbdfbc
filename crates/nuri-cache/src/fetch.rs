//! HTTP 네트워크 fetch 어댑터.
//!
//! `NetworkFetcher` 포트 구현. 설정된 오리진에 대해 요청별 데드라인이
//! 적용된 reqwest 클라이언트로 fetch한다.

use async_trait::async_trait;
use nuri_core::error::CoreError;
use nuri_core::models::cache::CachedResponse;
use nuri_core::ports::fetcher::NetworkFetcher;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// reqwest 기반 fetch 어댑터 — `NetworkFetcher` 포트 구현
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
}

impl HttpFetcher {
    /// 새 fetch 어댑터 생성
    ///
    /// `timeout`은 요청별 데드라인으로, 초과 시 `CoreError::FetchTimeout`.
    pub fn new(origin: &str, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        Ok(Self {
            client,
            base_url: origin.trim_end_matches('/').to_string(),
            timeout_ms: timeout.as_millis() as u64,
        })
    }

    /// 설정된 오리진 반환
    pub fn origin(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl NetworkFetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<CachedResponse, CoreError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("fetch: {url}");

        let resp = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                CoreError::FetchTimeout {
                    timeout_ms: self.timeout_ms,
                }
            } else {
                CoreError::Network(format!("요청 실패: {url}: {e}"))
            }
        })?;

        let status = resp.status().as_u16();

        let mut headers = HashMap::new();
        for (name, value) in resp.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.as_str().to_ascii_lowercase(), v.to_string());
            }
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| CoreError::Network(format!("본문 읽기 실패: {url}: {e}")))?
            .to_vec();

        Ok(CachedResponse {
            status,
            headers,
            body,
        })
    }
}
