// ==========================================
// 三表导入系统 - 导入层
// ==========================================
// 职责: 原始行 → 规范记录（Clients / Workers / Tasks）
// 管道: 表头映射 → 字段解析 → 规范化 → 输入形状 → Schema 转换 → 规范形状
// ==========================================

// 模块声明
pub mod collaborator_trait;
pub mod error;
pub mod field_mapper;
pub mod fix_applier;
pub mod header_mapper;
pub mod normalizer;
pub mod schema;
pub mod transformer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::{accepted_spellings, FieldMapper};
pub use fix_applier::apply_suggested_fix;
pub use header_mapper::{apply_header_mapping, remap_or_passthrough, AliasHeaderMapper};
pub use normalizer::{
    dedup_first_seen, normalize_delimited_string_list, normalize_json_object, normalize_numeric_range_list,
    MAX_RANGE_SPAN,
};
pub use schema::{EntitySchema, FieldRule, FieldSpec, Shape, Stage};
pub use transformer::{transform_rows, validate_and_clean, RowTransformer};

// 重导出 Trait 接口
pub use collaborator_trait::{
    CollaboratorError, CollaboratorResult, FixSuggester, HeaderMapper, HeaderMapping,
};
