//! 리소스 분류.
//!
//! 요청 경로를 `ResourceClass`로 분류한다. 우선순위 순서로 평가:
//! 빌드 산출물/스타일시트/스크립트 → Static, 이미지 확장자 → Image,
//! 폰트 확장자 → Font, `/api/` 경로 → Api, 나머지 → Dynamic.

use nuri_core::models::cache::ResourceClass;
use url::Url;

/// 빌드 산출물 경로 접두사
const STATIC_PREFIXES: [&str; 3] = ["/_next/static/", "/static/", "/assets/"];

/// 정적 리소스 확장자 (스타일시트/스크립트)
const STATIC_EXTENSIONS: [&str; 4] = ["css", "js", "mjs", "map"];

/// 이미지 확장자
const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "webp", "avif", "svg", "ico"];

/// 폰트 확장자
const FONT_EXTENSIONS: [&str; 5] = ["woff", "woff2", "ttf", "otf", "eot"];

/// 요청 경로(또는 절대 URL)를 리소스 클래스로 분류
pub fn classify(path_or_url: &str) -> ResourceClass {
    let path = normalize(path_or_url);

    if STATIC_PREFIXES.iter().any(|p| path.starts_with(p))
        || has_extension(&path, &STATIC_EXTENSIONS)
    {
        return ResourceClass::Static;
    }
    if has_extension(&path, &IMAGE_EXTENSIONS) {
        return ResourceClass::Image;
    }
    if has_extension(&path, &FONT_EXTENSIONS) {
        return ResourceClass::Font;
    }
    if path.starts_with("/api/") {
        return ResourceClass::Api;
    }
    ResourceClass::Dynamic
}

/// 절대 URL이면 경로만 추출하고, 쿼리/프래그먼트를 제거
fn normalize(path_or_url: &str) -> String {
    if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
        if let Ok(url) = Url::parse(path_or_url) {
            return url.path().to_string();
        }
    }

    let without_fragment = path_or_url.split('#').next().unwrap_or(path_or_url);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);
    without_query.to_string()
}

/// 마지막 경로 세그먼트의 확장자가 목록에 있는지 검사
fn has_extension(path: &str, extensions: &[&str]) -> bool {
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rsplit_once('.') {
        Some((_, ext)) => extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)),
        None => false,
    }
}
