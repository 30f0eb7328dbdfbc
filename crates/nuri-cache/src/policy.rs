//! 캐시 정책 테이블.
//!
//! 리소스 클래스 → (캐시 이름, TTL, 전략) 정적 조회 테이블.
//! 호출 지점마다 URL 패턴을 다시 검사하지 않는다.

use nuri_core::models::cache::ResourceClass;
use std::time::Duration;

/// 정적 리소스 캐시 (24시간)
pub const STATIC_CACHE: &str = "nuri-static-v1";
/// 동적 리소스 캐시 (5분) — Api 클래스도 공유
pub const DYNAMIC_CACHE: &str = "nuri-dynamic-v1";
/// 이미지 캐시 (7일)
pub const IMAGE_CACHE: &str = "nuri-image-v1";
/// 폰트 캐시 (30일)
pub const FONT_CACHE: &str = "nuri-font-v1";

/// 현재 버전의 네 캐시 식별자 — 활성화 시 이 목록 밖의 캐시는 삭제된다
pub const CURRENT_CACHES: [&str; 4] = [STATIC_CACHE, DYNAMIC_CACHE, IMAGE_CACHE, FONT_CACHE];

/// 캐시별 만료 윈도우
pub const CACHE_TTLS: [(&str, Duration); 4] = [
    (STATIC_CACHE, Duration::from_secs(24 * 60 * 60)),
    (DYNAMIC_CACHE, Duration::from_secs(5 * 60)),
    (IMAGE_CACHE, Duration::from_secs(7 * 24 * 60 * 60)),
    (FONT_CACHE, Duration::from_secs(30 * 24 * 60 * 60)),
];

/// 요청 해석 전략
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// 유효한 캐시 엔트리 우선, 없으면 네트워크
    CacheFirst,
    /// 네트워크 우선, 실패 시 캐시 폴백
    NetworkFirst,
    /// 캐시 즉시 반환 + 백그라운드 재검증
    StaleWhileRevalidate,
}

/// 클래스별 캐시 정책
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    /// 대상 캐시 이름
    pub cache_name: &'static str,
    /// 만료 윈도우
    pub ttl: Duration,
    /// 해석 전략
    pub strategy: Strategy,
}

const STATIC_POLICY: CachePolicy = CachePolicy {
    cache_name: STATIC_CACHE,
    ttl: Duration::from_secs(24 * 60 * 60),
    strategy: Strategy::CacheFirst,
};

const IMAGE_POLICY: CachePolicy = CachePolicy {
    cache_name: IMAGE_CACHE,
    ttl: Duration::from_secs(7 * 24 * 60 * 60),
    strategy: Strategy::CacheFirst,
};

const FONT_POLICY: CachePolicy = CachePolicy {
    cache_name: FONT_CACHE,
    ttl: Duration::from_secs(30 * 24 * 60 * 60),
    strategy: Strategy::CacheFirst,
};

const API_POLICY: CachePolicy = CachePolicy {
    cache_name: DYNAMIC_CACHE,
    ttl: Duration::from_secs(5 * 60),
    strategy: Strategy::NetworkFirst,
};

const DYNAMIC_POLICY: CachePolicy = CachePolicy {
    cache_name: DYNAMIC_CACHE,
    ttl: Duration::from_secs(5 * 60),
    strategy: Strategy::StaleWhileRevalidate,
};

/// 클래스에 해당하는 정책 조회
pub fn policy_for(class: ResourceClass) -> &'static CachePolicy {
    match class {
        ResourceClass::Static => &STATIC_POLICY,
        ResourceClass::Image => &IMAGE_POLICY,
        ResourceClass::Font => &FONT_POLICY,
        ResourceClass::Api => &API_POLICY,
        ResourceClass::Dynamic => &DYNAMIC_POLICY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategies_per_resource_class() {
        assert_eq!(policy_for(ResourceClass::Static).strategy, Strategy::CacheFirst);
        assert_eq!(policy_for(ResourceClass::Image).strategy, Strategy::CacheFirst);
        assert_eq!(policy_for(ResourceClass::Font).strategy, Strategy::CacheFirst);
        assert_eq!(policy_for(ResourceClass::Api).strategy, Strategy::NetworkFirst);
        assert_eq!(
            policy_for(ResourceClass::Dynamic).strategy,
            Strategy::StaleWhileRevalidate
        );
    }

    #[test]
    fn api_shares_dynamic_cache() {
        assert_eq!(policy_for(ResourceClass::Api).cache_name, DYNAMIC_CACHE);
    }

    #[test]
    fn ttl_windows() {
        assert_eq!(
            policy_for(ResourceClass::Static).ttl,
            Duration::from_secs(86_400)
        );
        assert_eq!(policy_for(ResourceClass::Dynamic).ttl, Duration::from_secs(300));
        assert_eq!(
            policy_for(ResourceClass::Image).ttl,
            Duration::from_secs(604_800)
        );
        assert_eq!(
            policy_for(ResourceClass::Font).ttl,
            Duration::from_secs(2_592_000)
        );
    }

    #[test]
    fn current_caches_cover_every_policy_target() {
        for class in [
            ResourceClass::Static,
            ResourceClass::Image,
            ResourceClass::Font,
            ResourceClass::Api,
            ResourceClass::Dynamic,
        ] {
            let policy = policy_for(class);
            assert!(CURRENT_CACHES.contains(&policy.cache_name));
        }
    }
}
