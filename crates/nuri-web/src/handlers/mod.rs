//! API 핸들러 모듈.

pub mod cache;
pub mod stream;
pub mod vitals;
