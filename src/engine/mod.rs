// ==========================================
// 三表导入系统 - 校验引擎层
// ==========================================
// 职责: 规范记录集的形状复核 + 跨实体规则 + 发现合并
// 红线: 引擎不修改输入表；所有发现均为建议性
// ==========================================

pub mod cross_entity;
pub mod edit;
pub mod merge;
pub mod validator;

// 重导出核心引擎
pub use cross_entity::ResourceAggregates;
pub use edit::{preview_field_edit, validate_entity};
pub use merge::merge_errors;
pub use validator::{validate_all, ResourceValidator};
