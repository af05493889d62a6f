// ==========================================
// 三表导入系统 - 领域类型定义
// ==========================================
// 职责: 实体种类枚举（客户/工人/任务）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 实体种类 (Entity Kind)
// ==========================================
// 序列化格式: 小写（与校验结果中的 entity 字段一致）
// 排序: Client < Worker < Task（合并校验错误时的稳定顺序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Client, // 客户
    Worker, // 工人
    Task,   // 任务
}

impl EntityKind {
    /// 全部实体种类（按校验顺序）
    pub const ALL: [EntityKind; 3] = [EntityKind::Client, EntityKind::Worker, EntityKind::Task];

    /// 小写名称（用于合成行标识 `<entitykind>_<rowIndex>`）
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Client => "client",
            EntityKind::Worker => "worker",
            EntityKind::Task => "task",
        }
    }

    /// 表名（用于导出文件名）
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Client => "clients",
            EntityKind::Worker => "workers",
            EntityKind::Task => "tasks",
        }
    }

    /// 主键字段名
    pub fn id_field(&self) -> &'static str {
        match self {
            EntityKind::Client => "ClientID",
            EntityKind::Worker => "WorkerID",
            EntityKind::Task => "TaskID",
        }
    }

    /// 名称字段名
    pub fn name_field(&self) -> &'static str {
        match self {
            EntityKind::Client => "ClientName",
            EntityKind::Worker => "WorkerName",
            EntityKind::Task => "TaskName",
        }
    }

    /// 展示用标签（用于错误消息，如 "Duplicate Client ID"）
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Client => "Client",
            EntityKind::Worker => "Worker",
            EntityKind::Task => "Task",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
