// ==========================================
// 三表导入系统 - 校验结果模型
// ==========================================
// 职责: 字段级问题 / 行级拒绝 / 校验发现 / 转换结果
// ==========================================

use crate::domain::entity::AcceptedRecord;
use crate::domain::types::EntityKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ==========================================
// FieldIssue - Schema 字段问题
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub path: String,    // 字段路径（如 "PriorityLevel"）
    pub message: String, // 问题描述
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

// ==========================================
// ValidationError - 校验发现（建议性，不阻断）
// ==========================================
// value: 违规值；同一 (entity, row_index, field) 合并后为数组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub entity: EntityKind,
    pub row_index: usize,
    pub field: String,
    pub message: String,
    #[serde(default)]
    pub value: Value,
}

impl ValidationError {
    pub fn new(
        entity: EntityKind,
        row_index: usize,
        field: impl Into<String>,
        message: impl Into<String>,
        value: Value,
    ) -> Self {
        Self {
            entity,
            row_index,
            field: field.into(),
            message: message.into(),
            value,
        }
    }
}

// ==========================================
// RowRejection - 行级结构性拒绝
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRejection {
    pub index: usize,  // 原始行下标（0 起）
    pub error: String, // 可读原因
}

// ==========================================
// TransformOutcome - transform_rows 输出
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformOutcome<T> {
    pub accepted: Vec<AcceptedRecord<T>>,
    pub rejected: Vec<RowRejection>,
}

impl<T> Default for TransformOutcome<T> {
    fn default() -> Self {
        Self {
            accepted: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

impl<T: Clone> TransformOutcome<T> {
    /// 仅取规范记录（按原始行顺序）
    pub fn records(&self) -> Vec<T> {
        self.accepted.iter().map(|a| a.record.clone()).collect()
    }

    /// 输入总行数（接受 + 拒绝）
    pub fn total_rows(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }
}

// ==========================================
// CleanOutcome - validate_and_clean 输出
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanOutcome<T> {
    pub valid: Vec<T>,
    pub invalid: Vec<RowRejection>,
}

impl<T> Default for CleanOutcome<T> {
    fn default() -> Self {
        Self {
            valid: Vec::new(),
            invalid: Vec::new(),
        }
    }
}
