// ==========================================
// 三表导入系统 - 配置层
// ==========================================
// 职责: 导入配置加载（日志级别 / 导出目录 / 表头别名）
// 存储: JSON 文件
// ==========================================

pub mod ingest_config;

pub use ingest_config::{
    resolve_config_path, ConfigError, ConfigResult, IngestConfig, CONFIG_ENV_VAR,
};
