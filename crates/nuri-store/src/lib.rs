//! # nuri-store
//!
//! 캐시 저장소 어댑터.
//! 이름 붙은 캐시들을 SQLite에 영속화한다 — `CacheStore` 포트 구현.

pub mod sqlite;

pub use sqlite::SqliteCacheStore;
