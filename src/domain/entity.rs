// ==========================================
// 三表导入系统 - 实体领域模型
// ==========================================
// 职责: 客户/工人/任务的规范记录（Canonical Record）
// 序列化: 字段名与表格列名一致（PascalCase + *ID / AttributesJSON）
// ==========================================

use crate::domain::types::EntityKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;

// ==========================================
// EntityRecord - 规范记录公共接口
// ==========================================
// 用途: 转换器/校验器/导出按实体种类泛型处理
pub trait EntityRecord: Serialize + DeserializeOwned + Clone + Debug {
    /// 实体种类
    const KIND: EntityKind;

    /// 自然主键（ClientID / WorkerID / TaskID）
    fn natural_id(&self) -> &str;
}

// ==========================================
// Client - 客户
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Client {
    #[serde(rename = "ClientID")]
    pub client_id: String, // 客户唯一标识
    pub client_name: String, // 客户名称（非空）
    pub priority_level: i64, // 优先级 1-5
    #[serde(rename = "RequestedTaskIDs", default)]
    pub requested_task_ids: Vec<String>, // 请求任务（保序，允许重复）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_tag: Option<String>, // 分组标签
    #[serde(rename = "AttributesJSON", default)]
    pub attributes_json: Map<String, Value>, // 任意属性
}

impl EntityRecord for Client {
    const KIND: EntityKind = EntityKind::Client;

    fn natural_id(&self) -> &str {
        &self.client_id
    }
}

// ==========================================
// Worker - 工人
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Worker {
    #[serde(rename = "WorkerID")]
    pub worker_id: String, // 工人唯一标识
    pub worker_name: String, // 工人姓名（非空）
    #[serde(default)]
    pub skills: Vec<String>, // 技能集合
    #[serde(default)]
    pub available_slots: Vec<i64>, // 可用阶段集合
    pub max_load_per_ph: i64, // 每阶段最大负载 >= 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_group: Option<String>, // 工人分组
    pub qualification_level: i64, // 资质等级 1-5
}

impl EntityRecord for Worker {
    const KIND: EntityKind = EntityKind::Worker;

    fn natural_id(&self) -> &str {
        &self.worker_id
    }
}

// ==========================================
// Task - 任务
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Task {
    #[serde(rename = "TaskID")]
    pub task_id: String, // 任务唯一标识
    pub task_name: String, // 任务名称（非空）
    pub category: String, // 类别
    pub duration: i64, // 持续阶段数 >= 1
    #[serde(default)]
    pub required_skills: Vec<String>, // 所需技能集合
    #[serde(default)]
    pub preferred_phase: Vec<i64>, // 偏好阶段（去重升序）
    pub max_concurrent: i64, // 最大并发 >= 1
}

impl EntityRecord for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn natural_id(&self) -> &str {
        &self.task_id
    }
}

// ==========================================
// AcceptedRecord - 转换成功的记录
// ==========================================
// row_key: 稳定行标识（自然主键，缺失时为 `<entitykind>_<rowIndex>`）
// source_row: 原始行下标（0 起）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedRecord<T> {
    pub row_key: String,
    pub source_row: usize,
    pub record: T,
}

impl<T: EntityRecord> AcceptedRecord<T> {
    pub fn new(record: T, source_row: usize) -> Self {
        let row_key = if record.natural_id().trim().is_empty() {
            format!("{}_{}", T::KIND.as_str(), source_row)
        } else {
            record.natural_id().to_string()
        };

        Self {
            row_key,
            source_row,
            record,
        }
    }
}
