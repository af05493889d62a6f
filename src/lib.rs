// ==========================================
// 三表导入系统 - 核心库
// ==========================================
// 输入: 表格导出的原始行（Clients / Workers / Tasks）
// 输出: 规范记录 + 行级拒绝 + 建议性校验发现
// 特性: 无状态、同步、全函数（单行失败不影响其他行）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - 规范化 / Schema / 转换 / 协作者接口
pub mod importer;

// 引擎层 - 跨实体校验
pub mod engine;

// 导出层 - CSV / rules.json
pub mod export;

// 配置层 - 导入配置
pub mod config;

// 日志系统
pub mod logging;

// 命令行 - check 子命令
pub mod cli;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::EntityKind;

// 领域实体
pub use domain::{
    AcceptedRecord, BusinessRule, BusinessRuleType, CleanOutcome, Client, EntityRecord,
    FieldIssue, RowRejection, RulesConfig, Task, TransformOutcome, ValidationError, Worker,
};

// 导入
pub use importer::{
    apply_suggested_fix, remap_or_passthrough, transform_rows, validate_and_clean,
    AliasHeaderMapper, FixSuggester, HeaderMapper, RowTransformer,
};

// 引擎
pub use engine::{preview_field_edit, validate_all, validate_entity, ResourceValidator};

// 导出
pub use export::{build_rules_config, export_all, write_table_csv};

// 配置
pub use config::IngestConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "resource-ingest";
