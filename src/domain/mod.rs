// ==========================================
// 三表导入系统 - 领域模型层
// ==========================================
// 职责: 定义实体、类型、校验结果与规则文档
// 红线: 不含转换逻辑,不含校验逻辑
// ==========================================

pub mod entity;
pub mod rules;
pub mod types;
pub mod validation;

// 重导出核心类型
pub use entity::{AcceptedRecord, Client, EntityRecord, Task, Worker};
pub use rules::{
    BusinessRule, BusinessRuleType, GlobalSettings, PriorityWeights, RulesConfig, RulesMetadata,
};
pub use types::EntityKind;
pub use validation::{CleanOutcome, FieldIssue, RowRejection, TransformOutcome, ValidationError};
