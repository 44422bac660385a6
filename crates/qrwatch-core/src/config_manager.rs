//! 설정 파일 관리.
//!
//! JSON 설정 파일 하나를 열어 검증된 `AppConfig`를 보관한다.
//! 파일이 없으면 기본 설정으로 만들고, 파일 내용이 잘못되면 기존 설정을 유지한 채 오류를 돌려준다.

use crate::config::AppConfig;
use crate::error::CoreError;
use directories::ProjectDirs;
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const CONFIG_FILE_NAME: &str = "config.json";

/// 설정 관리자 (복제본끼리 같은 설정을 공유)
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
    current: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    /// 플랫폼 설정 디렉토리의 `config.json`
    ///
    /// - Linux: `~/.config/qrwatch/config.json`
    /// - macOS: `~/Library/Application Support/com.qrwatch.qrwatch/config.json`
    pub fn open_default() -> Result<Self, CoreError> {
        let dirs = ProjectDirs::from("com", "qrwatch", "qrwatch")
            .ok_or_else(|| CoreError::Config("홈 디렉토리를 찾을 수 없음".to_string()))?;
        Self::open(dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// 경로의 설정 파일을 연다. 없으면 상위 디렉토리와 기본 설정 파일을 만든다.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let config = if path.exists() {
            read_config(&path)?
        } else {
            let config = AppConfig::default_config();
            write_config(&path, &config)?;
            info!("기본 설정 파일 생성: {}", path.display());
            config
        };

        Ok(Self {
            path,
            current: Arc::new(RwLock::new(config)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 현재 설정 (복제본)
    pub fn get(&self) -> AppConfig {
        self.current.read().clone()
    }

    /// 검증 후 저장. 실패하면 메모리/파일 모두 이전 상태 그대로.
    pub fn update(&self, config: AppConfig) -> Result<(), CoreError> {
        config.validate()?;
        write_config(&self.path, &config)?;
        *self.current.write() = config;
        debug!("설정 저장: {}", self.path.display());
        Ok(())
    }

    /// 파일을 다시 읽는다. 읽기/검증에 실패하면 현재 설정을 유지한다.
    pub fn reload(&self) -> Result<(), CoreError> {
        let config = read_config(&self.path)?;
        *self.current.write() = config;
        info!("설정 다시 로드: {}", self.path.display());
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<AppConfig, CoreError> {
    let config: AppConfig = serde_json::from_str(&fs::read_to_string(path)?)?;
    config.validate()?;
    Ok(config)
}

/// 임시 파일에 쓴 뒤 교체 (쓰다 만 파일이 남지 않게)
fn write_config(path: &Path, config: &AppConfig) -> Result<(), CoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(config)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
