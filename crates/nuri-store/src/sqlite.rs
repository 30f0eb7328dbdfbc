//! SQLite 캐시 저장소 어댑터.
//!
//! `CacheStore` 포트 구현. 캐시 레지스트리(`caches`)와
//! 엔트리 테이블(`cache_entries`)로 이름 붙은 캐시를 영속화한다.
//! 동일 (캐시, 경로)에 대한 동시 put은 last-write-wins.

use async_trait::async_trait;
use nuri_core::error::CoreError;
use nuri_core::models::cache::CachedResponse;
use nuri_core::ports::cache_store::CacheStore;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// SQLite 캐시 저장소 — `CacheStore` 포트 구현
pub struct SqliteCacheStore {
    conn: Mutex<Connection>,
}

impl SqliteCacheStore {
    /// 파일 기반 SQLite 저장소 생성
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path)
            .map_err(|e| CoreError::Storage(format!("SQLite 열기 실패: {e}")))?;

        // 성능 최적화 PRAGMA 설정
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA cache_size=8000;
            PRAGMA temp_store=MEMORY;
            ",
        )
        .map_err(|e| CoreError::Storage(format!("PRAGMA 설정 실패: {e}")))?;

        init_schema(&conn)?;

        info!("캐시 저장소 초기화: {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 인메모리 SQLite 저장소 생성 (테스트용)
    pub fn open_in_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CoreError::Storage(format!("인메모리 SQLite 생성 실패: {e}")))?;

        init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

/// 스키마 초기화 (멱등)
fn init_schema(conn: &Connection) -> Result<(), CoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS caches (
            name TEXT PRIMARY KEY,
            created_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS cache_entries (
            cache_name TEXT NOT NULL,
            path TEXT NOT NULL,
            status INTEGER NOT NULL,
            headers TEXT NOT NULL,
            body BLOB NOT NULL,
            stored_at TEXT NOT NULL,
            PRIMARY KEY (cache_name, path)
        );
        CREATE INDEX IF NOT EXISTS idx_cache_entries_cache
            ON cache_entries(cache_name);
        ",
    )
    .map_err(|e| CoreError::Storage(format!("스키마 생성 실패: {e}")))
}

#[async_trait]
impl CacheStore for SqliteCacheStore {
    async fn open_cache(&self, cache: &str) -> Result<(), CoreError> {
        let conn = self.lock();
        conn.execute(
            "INSERT OR IGNORE INTO caches (name, created_at) VALUES (?1, ?2)",
            params![cache, chrono::Utc::now().to_rfc3339()],
        )
        .map_err(|e| CoreError::Storage(format!("캐시 생성 실패: {e}")))?;
        Ok(())
    }

    async fn get(&self, cache: &str, path: &str) -> Result<Option<CachedResponse>, CoreError> {
        let conn = self.lock();
        let row = conn
            .query_row(
                "SELECT status, headers, body FROM cache_entries
                 WHERE cache_name = ?1 AND path = ?2",
                params![cache, path],
                |row| {
                    Ok((
                        row.get::<_, u16>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| CoreError::Storage(format!("엔트리 조회 실패: {e}")))?;

        match row {
            Some((status, headers_json, body)) => {
                let headers: HashMap<String, String> = serde_json::from_str(&headers_json)?;
                Ok(Some(CachedResponse {
                    status,
                    headers,
                    body,
                }))
            }
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        cache: &str,
        path: &str,
        response: &CachedResponse,
    ) -> Result<(), CoreError> {
        let headers_json = serde_json::to_string(&response.headers)?;
        let conn = self.lock();
        conn.execute(
            "INSERT OR IGNORE INTO caches (name, created_at) VALUES (?1, ?2)",
            params![cache, chrono::Utc::now().to_rfc3339()],
        )
        .map_err(|e| CoreError::Storage(format!("캐시 등록 실패: {e}")))?;
        conn.execute(
            "INSERT OR REPLACE INTO cache_entries
                 (cache_name, path, status, headers, body, stored_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                cache,
                path,
                response.status,
                headers_json,
                response.body,
                chrono::Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| CoreError::Storage(format!("엔트리 저장 실패: {e}")))?;

        debug!("캐시 저장: {cache} ← {path} ({} bytes)", response.body.len());
        Ok(())
    }

    async fn delete(&self, cache: &str, path: &str) -> Result<bool, CoreError> {
        let conn = self.lock();
        let deleted = conn
            .execute(
                "DELETE FROM cache_entries WHERE cache_name = ?1 AND path = ?2",
                params![cache, path],
            )
            .map_err(|e| CoreError::Storage(format!("엔트리 삭제 실패: {e}")))?;
        Ok(deleted > 0)
    }

    async fn list_paths(&self, cache: &str) -> Result<Vec<String>, CoreError> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare("SELECT path FROM cache_entries WHERE cache_name = ?1 ORDER BY path")
            .map_err(|e| CoreError::Storage(format!("쿼리 준비 실패: {e}")))?;
        let paths = stmt
            .query_map(params![cache], |row| row.get::<_, String>(0))
            .map_err(|e| CoreError::Storage(format!("경로 조회 실패: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CoreError::Storage(format!("경로 수집 실패: {e}")))?;
        Ok(paths)
    }

    async fn cache_names(&self) -> Result<Vec<String>, CoreError> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare("SELECT name FROM caches ORDER BY name")
            .map_err(|e| CoreError::Storage(format!("쿼리 준비 실패: {e}")))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| CoreError::Storage(format!("캐시 목록 조회 실패: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CoreError::Storage(format!("캐시 목록 수집 실패: {e}")))?;
        Ok(names)
    }

    async fn delete_cache(&self, cache: &str) -> Result<bool, CoreError> {
        let conn = self.lock();
        conn.execute(
            "DELETE FROM cache_entries WHERE cache_name = ?1",
            params![cache],
        )
        .map_err(|e| CoreError::Storage(format!("캐시 엔트리 삭제 실패: {e}")))?;
        let deleted = conn
            .execute("DELETE FROM caches WHERE name = ?1", params![cache])
            .map_err(|e| CoreError::Storage(format!("캐시 삭제 실패: {e}")))?;

        if deleted > 0 {
            info!("캐시 삭제: {cache}");
        }
        Ok(deleted > 0)
    }

    async fn entry_count(&self, cache: &str) -> Result<u64, CoreError> {
        let conn = self.lock();
        let count: u64 = conn
            .query_row(
                "SELECT COUNT(*) FROM cache_entries WHERE cache_name = ?1",
                params![cache],
                |row| row.get(0),
            )
            .map_err(|e| CoreError::Storage(format!("엔트리 수 조회 실패: {e}")))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuri_core::models::cache::CACHE_TIME_HEADER;

    fn make_response(body: &str) -> CachedResponse {
        CachedResponse::new(200, body.as_bytes().to_vec())
            .with_header("content-type", "text/html")
            .with_header(CACHE_TIME_HEADER, chrono::Utc::now().to_rfc3339())
    }

    #[tokio::test]
    async fn put_and_get_roundtrip() {
        let store = SqliteCacheStore::open_in_memory().unwrap();

        store
            .put("nuri-static-v1", "/ja", &make_response("<html>ja</html>"))
            .await
            .unwrap();

        let entry = store.get("nuri-static-v1", "/ja").await.unwrap().unwrap();
        assert_eq!(entry.status, 200);
        assert_eq!(entry.body, b"<html>ja</html>");
        assert_eq!(entry.header("content-type"), Some("text/html"));
        assert!(entry.header(CACHE_TIME_HEADER).is_some());
    }

    #[tokio::test]
    async fn get_missing_entry_is_none() {
        let store = SqliteCacheStore::open_in_memory().unwrap();
        assert!(store.get("nuri-static-v1", "/nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_overwrites_previous_entry() {
        let store = SqliteCacheStore::open_in_memory().unwrap();

        store
            .put("nuri-dynamic-v1", "/page", &make_response("old"))
            .await
            .unwrap();
        store
            .put("nuri-dynamic-v1", "/page", &make_response("new"))
            .await
            .unwrap();

        let entry = store.get("nuri-dynamic-v1", "/page").await.unwrap().unwrap();
        assert_eq!(entry.body, b"new");
        assert_eq!(store.entry_count("nuri-dynamic-v1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_entry() {
        let store = SqliteCacheStore::open_in_memory().unwrap();

        store
            .put("nuri-image-v1", "/images/hero.webp", &make_response("img"))
            .await
            .unwrap();

        assert!(store.delete("nuri-image-v1", "/images/hero.webp").await.unwrap());
        assert!(!store.delete("nuri-image-v1", "/images/hero.webp").await.unwrap());
        assert!(store
            .get("nuri-image-v1", "/images/hero.webp")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn cache_registry_and_deletion() {
        let store = SqliteCacheStore::open_in_memory().unwrap();

        store.open_cache("nuri-static-v1").await.unwrap();
        store
            .put("nuri-font-v1", "/fonts/a.woff2", &make_response("font"))
            .await
            .unwrap();
        store.open_cache("nuri-static-v0").await.unwrap(); // 구버전

        let mut names = store.cache_names().await.unwrap();
        names.sort();
        assert_eq!(
            names,
            vec!["nuri-font-v1", "nuri-static-v0", "nuri-static-v1"]
        );

        assert!(store.delete_cache("nuri-static-v0").await.unwrap());
        assert!(!store.delete_cache("nuri-static-v0").await.unwrap());

        let names = store.cache_names().await.unwrap();
        assert!(!names.contains(&"nuri-static-v0".to_string()));
        // 남은 캐시의 엔트리는 보존
        assert_eq!(store.entry_count("nuri-font-v1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn list_paths_sorted() {
        let store = SqliteCacheStore::open_in_memory().unwrap();

        store
            .put("nuri-dynamic-v1", "/b", &make_response("b"))
            .await
            .unwrap();
        store
            .put("nuri-dynamic-v1", "/a", &make_response("a"))
            .await
            .unwrap();

        let paths = store.list_paths("nuri-dynamic-v1").await.unwrap();
        assert_eq!(paths, vec!["/a", "/b"]);
    }

    #[tokio::test]
    async fn file_backed_store_persists() {
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("cache.db");

        {
            let store = SqliteCacheStore::open(&db_path).unwrap();
            store
                .put("nuri-static-v1", "/", &make_response("home"))
                .await
                .unwrap();
        }

        let store = SqliteCacheStore::open(&db_path).unwrap();
        let entry = store.get("nuri-static-v1", "/").await.unwrap().unwrap();
        assert_eq!(entry.body, b"home");
    }
}
