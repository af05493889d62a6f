// ==========================================
// 三表导入系统 - 实体 Schema 层
// ==========================================
// 职责: 每个实体两阶段形状定义 + 转换
// - 输入形状（宽松）: 集合字段可为原始字符串或已类型化数组
// - 规范形状（严格）: 集合字段必须为规范化后的数组
// 校验契约: validate(candidate) -> Ok(value) | Err(Vec<FieldIssue>)
// ==========================================

use crate::domain::types::EntityKind;
use crate::domain::validation::FieldIssue;
use crate::importer::normalizer::{
    dedup_first_seen, integral_number, normalize_delimited_string_list, normalize_json_object,
    normalize_numeric_range_list,
};
use serde_json::{Map, Value};
use std::collections::HashSet;

// ==========================================
// FieldRule - 字段约束
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// 非空字符串（ID / 名称 / 类别）
    RequiredText { message: &'static str },
    /// 可选字符串
    OptionalText,
    /// 有界整数
    BoundedInt {
        min: i64,
        max: Option<i64>,
        message: &'static str,
    },
    /// 字符串列表（输入: 逗号字符串或字符串数组）；unique 时按首次出现去重
    TextList { unique: bool },
    /// 阶段集合（输入: 区间字符串或数字数组）
    PhaseList { ascending: bool },
    /// 任意属性对象（输入: JSON 字符串或对象，可缺省）
    JsonObject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rule: FieldRule,
}

const fn field(name: &'static str, rule: FieldRule) -> FieldSpec {
    FieldSpec { name, rule }
}

// ==========================================
// 各实体字段定义（列顺序即导出顺序）
// ==========================================
const CLIENT_FIELDS: &[FieldSpec] = &[
    field("ClientID", FieldRule::RequiredText { message: "Client ID is required" }),
    field("ClientName", FieldRule::RequiredText { message: "Client name is required" }),
    field(
        "PriorityLevel",
        FieldRule::BoundedInt { min: 1, max: Some(5), message: "Priority must be between 1-5" },
    ),
    field("RequestedTaskIDs", FieldRule::TextList { unique: false }),
    field("GroupTag", FieldRule::OptionalText),
    field("AttributesJSON", FieldRule::JsonObject),
];

const WORKER_FIELDS: &[FieldSpec] = &[
    field("WorkerID", FieldRule::RequiredText { message: "Worker ID is required" }),
    field("WorkerName", FieldRule::RequiredText { message: "Worker name is required" }),
    field("Skills", FieldRule::TextList { unique: true }),
    field("AvailableSlots", FieldRule::PhaseList { ascending: false }),
    field(
        "MaxLoadPerPh",
        FieldRule::BoundedInt { min: 1, max: None, message: "Max load must be at least 1" },
    ),
    field("WorkerGroup", FieldRule::OptionalText),
    field(
        "QualificationLevel",
        FieldRule::BoundedInt {
            min: 1,
            max: Some(5),
            message: "Qualification must be between 1-5",
        },
    ),
];

const TASK_FIELDS: &[FieldSpec] = &[
    field("TaskID", FieldRule::RequiredText { message: "Task ID is required" }),
    field("TaskName", FieldRule::RequiredText { message: "Task name is required" }),
    field("Category", FieldRule::RequiredText { message: "Category is required" }),
    field(
        "Duration",
        FieldRule::BoundedInt { min: 1, max: None, message: "Duration must be at least 1" },
    ),
    field("RequiredSkills", FieldRule::TextList { unique: true }),
    field("PreferredPhase", FieldRule::PhaseList { ascending: true }),
    field(
        "MaxConcurrent",
        FieldRule::BoundedInt { min: 1, max: None, message: "Max concurrent must be at least 1" },
    ),
];

// ==========================================
// Stage / Shape - 校验阶段与形状
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Input,
    Canonical,
}

#[derive(Debug, Clone, Copy)]
pub struct Shape {
    schema: EntitySchema,
    stage: Stage,
}

impl Shape {
    /// 校验候选值；成功时返回仅含 schema 字段的对象（未知列被剥离）
    pub fn validate(&self, candidate: &Value) -> Result<Map<String, Value>, Vec<FieldIssue>> {
        let obj = match candidate {
            Value::Object(obj) => obj,
            other => {
                return Err(vec![FieldIssue::new(
                    "",
                    format!("Expected object, received {}", type_name(other)),
                )])
            }
        };

        let mut issues = Vec::new();
        let mut out = Map::new();

        for spec in self.schema.fields {
            let value = obj.get(spec.name);
            let before = issues.len();
            check_field(spec, value, self.stage, &mut issues);
            if issues.len() == before {
                if let Some(v) = value {
                    out.insert(spec.name.to_string(), v.clone());
                }
            }
        }

        if issues.is_empty() {
            Ok(out)
        } else {
            Err(issues)
        }
    }
}

// ==========================================
// EntitySchema - 实体 Schema
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub fields: &'static [FieldSpec],
}

impl EntitySchema {
    pub fn for_kind(kind: EntityKind) -> Self {
        let fields = match kind {
            EntityKind::Client => CLIENT_FIELDS,
            EntityKind::Worker => WORKER_FIELDS,
            EntityKind::Task => TASK_FIELDS,
        };
        Self { kind, fields }
    }

    pub fn input(&self) -> Shape {
        Shape {
            schema: *self,
            stage: Stage::Input,
        }
    }

    pub fn canonical(&self) -> Shape {
        Shape {
            schema: *self,
            stage: Stage::Canonical,
        }
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// 输入形状 → 规范形状: 对联合类型字段执行规范化
    ///
    /// 调用前应已通过输入形状校验；结果仍需经过规范形状校验。
    pub fn transform(&self, input: &Map<String, Value>) -> Value {
        let mut out = Map::new();

        for spec in self.fields {
            let value = input.get(spec.name);
            let normalized = match (spec.rule, value) {
                (FieldRule::TextList { unique }, Some(v)) => {
                    let list = normalize_delimited_string_list(v);
                    Some(Value::from(if unique { dedup_first_seen(list) } else { list }))
                }
                (FieldRule::TextList { .. }, None) => Some(Value::Array(Vec::new())),
                (FieldRule::PhaseList { .. }, Some(v)) => {
                    Some(Value::from(normalize_numeric_range_list(v)))
                }
                (FieldRule::PhaseList { .. }, None) => Some(Value::Array(Vec::new())),
                (FieldRule::JsonObject, Some(Value::Null)) | (FieldRule::JsonObject, None) => {
                    Some(Value::Object(Map::new()))
                }
                (FieldRule::JsonObject, Some(v)) => Some(Value::Object(normalize_json_object(v))),
                (FieldRule::RequiredText { .. }, Some(Value::String(s)))
                | (FieldRule::OptionalText, Some(Value::String(s))) => {
                    Some(Value::String(s.trim().to_string()))
                }
                (FieldRule::OptionalText, Some(Value::Null)) => None,
                (FieldRule::BoundedInt { .. }, Some(v)) => {
                    Some(integral_number(v).map(Value::from).unwrap_or_else(|| v.clone()))
                }
                (_, v) => v.cloned(),
            };

            if let Some(v) = normalized {
                out.insert(spec.name.to_string(), v);
            }
        }

        Value::Object(out)
    }
}

// ==========================================
// 字段校验
// ==========================================
fn check_field(spec: &FieldSpec, value: Option<&Value>, stage: Stage, issues: &mut Vec<FieldIssue>) {
    let path = spec.name;

    match spec.rule {
        FieldRule::RequiredText { message } => match value {
            None | Some(Value::Null) => issues.push(FieldIssue::new(path, message)),
            Some(Value::String(s)) if s.trim().is_empty() => {
                issues.push(FieldIssue::new(path, message))
            }
            Some(Value::String(_)) => {}
            Some(other) => issues.push(expected(path, "string", other)),
        },

        FieldRule::OptionalText => match value {
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(other) => issues.push(expected(path, "string", other)),
        },

        FieldRule::BoundedInt { min, max, message } => match value {
            None | Some(Value::Null) => {
                issues.push(FieldIssue::new(path, format!("{} is required", path)))
            }
            Some(v) => match integral_number(v) {
                None => issues.push(expected(path, "integer", v)),
                Some(n) => {
                    if n < min || max.is_some_and(|m| n > m) {
                        issues.push(FieldIssue::new(path, message));
                    }
                }
            },
        },

        FieldRule::TextList { .. } => match (stage, value) {
            (_, None) | (_, Some(Value::Null)) => {
                issues.push(FieldIssue::new(path, format!("{} is required", path)))
            }
            (Stage::Input, Some(Value::String(_))) => {}
            (_, Some(Value::Array(items))) => {
                if items.iter().any(|item| !item.is_string()) {
                    issues.push(FieldIssue::new(path, "Expected array of strings"));
                } else if stage == Stage::Canonical
                    && items
                        .iter()
                        .any(|item| item.as_str().is_some_and(|s| s.trim().is_empty()))
                {
                    issues.push(FieldIssue::new(path, format!("{} entries must be non-empty", path)));
                }
            }
            (_, Some(other)) => issues.push(expected(path, "array", other)),
        },

        FieldRule::PhaseList { ascending } => match (stage, value) {
            (_, None) | (_, Some(Value::Null)) => {
                issues.push(FieldIssue::new(path, format!("{} is required", path)))
            }
            (Stage::Input, Some(Value::String(_))) => {}
            (_, Some(Value::Array(items))) => {
                let phases: Option<Vec<i64>> = items.iter().map(integral_number).collect();
                match phases {
                    None => issues.push(FieldIssue::new(path, "Expected array of numbers")),
                    Some(phases) if stage == Stage::Canonical => {
                        let mut seen = HashSet::new();
                        if !phases.iter().all(|p| seen.insert(*p)) {
                            issues.push(FieldIssue::new(
                                path,
                                format!("{} must not contain duplicate phases", path),
                            ));
                        } else if ascending && phases.windows(2).any(|w| w[0] > w[1]) {
                            issues.push(FieldIssue::new(
                                path,
                                format!("{} must be sorted ascending", path),
                            ));
                        }
                    }
                    Some(_) => {}
                }
            }
            (_, Some(other)) => issues.push(expected(path, "array", other)),
        },

        FieldRule::JsonObject => match (stage, value) {
            (_, None) | (_, Some(Value::Null)) | (_, Some(Value::Object(_))) => {}
            (Stage::Input, Some(Value::String(_))) => {}
            (_, Some(other)) => issues.push(expected(path, "object", other)),
        },
    }
}

fn expected(path: &str, expected: &str, received: &Value) -> FieldIssue {
    FieldIssue::new(
        path,
        format!("Expected {}, received {}", expected, type_name(received)),
    )
}

/// JSON 值类型名（用于问题描述）
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
