// ==========================================
// 三表导入系统 - 外部协作者 Trait
// ==========================================
// 职责: 定义表头映射 / 修复建议接口（不包含实现）
// 约定: 同步调用；失败一律降级（原样透传 / 无建议），不中断管道
// ==========================================

use crate::domain::types::EntityKind;
use crate::domain::validation::ValidationError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// 原始表头 → 逻辑字段（None 表示不映射，保留原列名）
pub type HeaderMapping = BTreeMap<String, Option<String>>;

/// 协作者错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("Collaborator timed out after {0} ms")]
    Timeout(u64),

    #[error("Collaborator returned an invalid response: {0}")]
    InvalidResponse(String),
}

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

// ==========================================
// HeaderMapper Trait
// ==========================================
// 用途: 上传时将任意表头对齐到逻辑字段
// 实现者: AliasHeaderMapper（内置），外部 AI 映射服务
pub trait HeaderMapper {
    /// 计算表头映射
    ///
    /// # 参数
    /// - raw_headers: 上传文件中的原始表头
    /// - expected_headers: 目标实体的逻辑字段（按导出顺序）
    ///
    /// # 返回
    /// - Ok(HeaderMapping): 每个原始表头对应的逻辑字段（或 None）
    /// - Err: 协作者不可用 / 超时 / 响应无效
    fn map_headers(
        &self,
        raw_headers: &[String],
        expected_headers: &[&str],
    ) -> CollaboratorResult<HeaderMapping>;
}

// ==========================================
// FixSuggester Trait
// ==========================================
// 用途: 针对单条校验问题给出修正后的原始行
// 实现者: 外部 AI 修复服务
pub trait FixSuggester {
    /// 生成修正行
    ///
    /// # 参数
    /// - error: 需要修复的校验问题
    /// - row: 当前记录（原始行形式）
    /// - kind: 所属实体
    ///
    /// # 返回
    /// - Ok(Map): 修正后的原始行（仍需经过 transform_rows 才会被接受）
    /// - Err: 协作者失败
    fn suggest_fix(
        &self,
        error: &ValidationError,
        row: &Map<String, Value>,
        kind: EntityKind,
    ) -> CollaboratorResult<Map<String, Value>>;
}
