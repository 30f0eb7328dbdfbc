//! 설정 파일 관리.
//!
//! `AppConfig`를 플랫폼 설정 디렉토리의 JSON 파일로 영속화하고,
//! 런타임 변경(update/reload)을 중재한다.

use crate::config::AppConfig;
use crate::error::CoreError;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// 설정 파일 이름
const CONFIG_FILE_NAME: &str = "config.json";

/// 설정 관리자
///
/// 파일이 없으면 기본 설정을 만들어 저장하고, 이후의 변경은 메모리와
/// 파일에 함께 반영한다. 핸들 복제본끼리 같은 설정을 공유한다.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
    config_path: PathBuf,
}

impl ConfigManager {
    /// 플랫폼 기본 경로의 설정 관리자 생성
    pub fn new() -> Result<Self, CoreError> {
        Self::with_path(Self::project_dirs()?.config_dir().join(CONFIG_FILE_NAME))
    }

    /// 지정된 경로로 설정 관리자 생성
    pub fn with_path(config_path: PathBuf) -> Result<Self, CoreError> {
        if let Some(parent) = config_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    CoreError::Config(format!(
                        "설정 디렉토리를 만들 수 없음: {}: {e}",
                        parent.display()
                    ))
                })?;
                info!("설정 디렉토리 생성: {}", parent.display());
            }
        }

        let config = if config_path.exists() {
            Self::read_file(&config_path)?
        } else {
            let default_config = AppConfig::default_config();
            Self::write_file(&config_path, &default_config)?;
            info!("기본 설정 파일 생성: {}", config_path.display());
            default_config
        };

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// 현재 설정의 복제본
    pub fn get(&self) -> AppConfig {
        self.config.read().unwrap().clone()
    }

    /// 설정 전체 교체 — 메모리 반영 후 파일 저장
    pub fn update(&self, new_config: AppConfig) -> Result<(), CoreError> {
        *self.config.write().unwrap() = new_config.clone();

        Self::write_file(&self.config_path, &new_config)?;
        debug!("설정 저장: {}", self.config_path.display());
        Ok(())
    }

    /// 일부 필드만 변경 — 변경 후 설정을 반환
    pub fn update_with<F>(&self, updater: F) -> Result<AppConfig, CoreError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.get();
        updater(&mut config);
        self.update(config.clone())?;
        Ok(config)
    }

    /// 설정 파일 경로
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// 파일에서 설정을 다시 읽는다 (외부 편집 반영)
    pub fn reload(&self) -> Result<(), CoreError> {
        let config = Self::read_file(&self.config_path)?;
        *self.config.write().unwrap() = config;
        info!("설정 다시 로드");
        Ok(())
    }

    /// 데이터 디렉토리 경로 (캐시 DB 등)
    pub fn data_dir() -> Result<PathBuf, CoreError> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    fn project_dirs() -> Result<ProjectDirs, CoreError> {
        ProjectDirs::from("kr", "nuri-labs", "nuri")
            .ok_or_else(|| CoreError::Config("홈 디렉토리를 찾을 수 없습니다".to_string()))
    }

    fn read_file(path: &Path) -> Result<AppConfig, CoreError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("설정 파일을 읽을 수 없음: {}: {e}", path.display()))
        })?;

        let config = serde_json::from_str(&content).map_err(|e| {
            CoreError::Config(format!("설정 파일 파싱 실패: {}: {e}", path.display()))
        })?;

        debug!("설정 로드: {}", path.display());
        Ok(config)
    }

    fn write_file(path: &Path, config: &AppConfig) -> Result<(), CoreError> {
        let content = serde_json::to_string_pretty(config)?;
        fs::write(path, content).map_err(|e| {
            CoreError::Config(format!("설정 파일을 쓸 수 없음: {}: {e}", path.display()))
        })
    }
}
