//! 应用配置。
//!
//! 配置以 TOML 保存，默认位于系统配置目录下的 `lyric_sync/config.toml`。

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use lyric_core::{SyncOptions, TtmlError, TtmlGenerationOptions, TtmlParsingOptions};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

const CONFIG_FILE_NAME: &str = "config.toml";

/// 日志设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogOptions {
    /// `RUST_LOG` 未设置时使用的过滤规则，例如 `info` 或 `lyric_sync=debug`
    pub level: String,
    /// 是否同时写入数据目录下的日志文件
    pub log_to_file: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log: LogOptions,
    pub parsing: TtmlParsingOptions,
    pub generation: TtmlGenerationOptions,
    pub sync: SyncOptions,
}

impl AppConfig {
    pub fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "Unilyric", "lyric_sync")
    }

    /// 默认配置文件路径。无法确定系统目录时返回 `None`。
    pub fn default_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// 从指定路径读取配置。文件不存在时返回默认配置。
    ///
    /// # Errors
    ///
    /// 文件存在但无法读取或不是合法的配置时返回错误。
    pub fn load(path: &Path) -> Result<Self, TtmlError> {
        if !path.exists() {
            info!("配置文件 {path:?} 不存在，使用默认配置。");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        info!("从 {path:?} 加载配置成功。");
        Ok(config)
    }

    /// 从默认路径读取配置，任何失败都退回默认配置。
    pub fn load_default() -> Self {
        let Some(path) = Self::default_path() else {
            info!("无法确定配置目录，使用默认配置。");
            return Self::default();
        };
        Self::load(&path).unwrap_or_else(|e| {
            error!("加载配置文件 {path:?} 失败: {e}。将使用默认配置。");
            Self::default()
        })
    }

    /// 保存配置，必要时创建父目录。
    ///
    /// # Errors
    ///
    /// 序列化失败或写入文件失败时返回错误。
    pub fn save(&self, path: &Path) -> Result<(), TtmlError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        info!("配置已保存到 {path:?}。");
        Ok(())
    }
}
