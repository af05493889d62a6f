// ==========================================
// 三表导入系统 - 导入配置
// ==========================================
// 存储: JSON 文件
// 查找顺序: 显式路径 → RESOURCE_INGEST_CONFIG → <config_dir>/resource-ingest/config.json → 默认值
// 文件缺失: 使用默认值；文件格式错误: 返回 ConfigError
// ==========================================

use crate::domain::types::EntityKind;
use crate::importer::schema::EntitySchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// 配置文件路径环境变量
pub const CONFIG_ENV_VAR: &str = "RESOURCE_INGEST_CONFIG";

/// 用户配置目录下的子目录名
pub const CONFIG_DIR_NAME: &str = "resource-ingest";

pub const CONFIG_FILE_NAME: &str = "config.json";

// ==========================================
// ConfigError - 配置错误
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// IngestConfig - 导入配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub log_level: String,     // 默认日志级别（RUST_LOG 优先）
    pub export_dir: PathBuf,   // 导出目录
    pub pretty_output: bool,   // JSON 输出是否缩进
    // 逻辑字段 → 额外表头别名，如 {"Skills": ["Competencies"]}
    pub header_aliases: HashMap<String, Vec<String>>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            export_dir: PathBuf::from("./export"),
            pretty_output: true,
            header_aliases: HashMap::new(),
        }
    }
}

impl IngestConfig {
    /// 按查找顺序加载配置
    ///
    /// # 参数
    /// - explicit: 命令行显式指定的配置文件（存在即必须可读）
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            return Self::read_file(path);
        }

        match resolve_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => {
                debug!("未找到配置目录，使用默认配置");
                Ok(Self::default())
            }
        }
    }

    /// 从指定路径加载；文件不存在时返回默认配置
    pub fn load_from_path(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Ok(Self::default());
        }
        Self::read_file(path)
    }

    fn read_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        for field in config.unknown_alias_fields() {
            warn!(field = %field, "表头别名指向未知字段，已忽略");
        }

        info!(path = %path.display(), "配置文件加载完成");
        Ok(config)
    }

    /// header_aliases 中不属于任何实体的字段名
    pub fn unknown_alias_fields(&self) -> Vec<String> {
        let mut unknown: Vec<String> = self
            .header_aliases
            .keys()
            .filter(|field| {
                !EntityKind::ALL
                    .iter()
                    .any(|kind| EntitySchema::for_kind(*kind).field(field).is_some())
            })
            .cloned()
            .collect();
        unknown.sort();
        unknown
    }
}

/// 环境变量 → 用户配置目录
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.export_dir, PathBuf::from("./export"));
        assert!(config.pretty_output);
        assert!(config.header_aliases.is_empty());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"log_level": "debug", "header_aliases": {{"Skills": ["Competencies"]}}}}"#
        )
        .unwrap();

        let config = IngestConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(config.pretty_output);
        assert_eq!(config.header_aliases["Skills"], vec!["Competencies"]);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = IngestConfig::load_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, IngestConfig::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = IngestConfig::load_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_unknown_alias_fields() {
        let mut config = IngestConfig::default();
        config
            .header_aliases
            .insert("Skills".to_string(), vec!["Abilities".to_string()]);
        config
            .header_aliases
            .insert("Colour".to_string(), vec!["Color".to_string()]);

        assert_eq!(config.unknown_alias_fields(), vec!["Colour"]);
    }
}
