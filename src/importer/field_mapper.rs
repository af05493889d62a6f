// ==========================================
// 三表导入系统 - 字段映射器实现
// ==========================================
// 职责: 原始行（任意列名拼写）→ 候选记录（逻辑字段 + 规范化值）
// 列名拼写: PascalCase / "Spaced Case" / lowercase / snake_case + 配置别名
// ==========================================

use crate::domain::types::EntityKind;
use crate::importer::normalizer::{
    normalize_delimited_string_list, normalize_integer_or, normalize_json_object,
    normalize_numeric_range_list, DEFAULT_INTEGER,
};
use crate::importer::schema::{EntitySchema, FieldRule};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// 逻辑字段 → 带空格的展示拼写（其余拼写由此派生）
const SPACED_NAMES: &[(&str, &str)] = &[
    ("ClientID", "Client ID"),
    ("ClientName", "Client Name"),
    ("PriorityLevel", "Priority Level"),
    ("RequestedTaskIDs", "Requested Task IDs"),
    ("GroupTag", "Group Tag"),
    ("AttributesJSON", "Attributes JSON"),
    ("WorkerID", "Worker ID"),
    ("WorkerName", "Worker Name"),
    ("Skills", "Skills"),
    ("AvailableSlots", "Available Slots"),
    ("MaxLoadPerPh", "Max Load Per Ph"),
    ("WorkerGroup", "Worker Group"),
    ("QualificationLevel", "Qualification Level"),
    ("TaskID", "Task ID"),
    ("TaskName", "Task Name"),
    ("Category", "Category"),
    ("Duration", "Duration"),
    ("RequiredSkills", "Required Skills"),
    ("PreferredPhase", "Preferred Phase"),
    ("MaxConcurrent", "Max Concurrent"),
];

/// 逻辑字段的全部可接受拼写（按优先级）
pub fn accepted_spellings(field: &str) -> Vec<String> {
    let spaced = SPACED_NAMES
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, spaced)| *spaced)
        .unwrap_or(field);

    let mut spellings = vec![
        field.to_string(),
        spaced.to_string(),
        field.to_lowercase(),
        spaced.to_lowercase().replace(' ', "_"),
    ];
    spellings.dedup();
    spellings
}

pub struct FieldMapper {
    // 逻辑字段 → 额外别名（来自配置）
    extra_aliases: HashMap<String, Vec<String>>,
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldMapper {
    pub fn new() -> Self {
        Self {
            extra_aliases: HashMap::new(),
        }
    }

    pub fn with_aliases(extra_aliases: HashMap<String, Vec<String>>) -> Self {
        Self { extra_aliases }
    }

    /// 将原始行映射为候选记录（供输入形状校验）
    pub fn map_row(&self, row: &Map<String, Value>, kind: EntityKind) -> Value {
        // 列名去首尾空白后查找；同名列先出现者优先
        let mut cells: HashMap<&str, &Value> = HashMap::new();
        for (key, value) in row {
            cells.entry(key.trim()).or_insert(value);
        }

        let schema = EntitySchema::for_kind(kind);
        let mut candidate = Map::new();

        for spec in schema.fields {
            let raw = self.resolve(&cells, spec.name);

            let mapped = match spec.rule {
                FieldRule::RequiredText { .. } | FieldRule::OptionalText => raw.map(coerce_text),
                FieldRule::BoundedInt { .. } => Some(Value::from(normalize_integer_or(
                    raw.unwrap_or(&Value::Null),
                    DEFAULT_INTEGER,
                ))),
                FieldRule::TextList { .. } => {
                    let list = match raw {
                        Some(v) => normalize_delimited_string_list(&unwrap_bracketed_list(v)),
                        None => Vec::new(),
                    };
                    Some(Value::from(list))
                }
                FieldRule::PhaseList { .. } => Some(Value::from(normalize_numeric_range_list(
                    raw.unwrap_or(&Value::Null),
                ))),
                FieldRule::JsonObject => Some(Value::Object(match raw {
                    Some(v) => normalize_json_object(v),
                    None => Map::new(),
                })),
            };

            if let Some(value) = mapped {
                candidate.insert(spec.name.to_string(), value);
            }
        }

        Value::Object(candidate)
    }

    /// 按拼写优先级取第一个非空单元格（null / 空白字符串视为缺失）
    fn resolve<'a>(&self, cells: &HashMap<&str, &'a Value>, field: &str) -> Option<&'a Value> {
        let extra = self
            .extra_aliases
            .get(field)
            .map(|aliases| aliases.as_slice())
            .unwrap_or(&[]);

        accepted_spellings(field)
            .iter()
            .map(String::as_str)
            .chain(extra.iter().map(|a| a.trim()))
            .filter_map(|key| cells.get(key).copied())
            .find(|value| !is_blank(value))
    }
}

pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// 标量转文本；数组/对象原样保留（由输入形状拒绝）
fn coerce_text(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        other => other.clone(),
    }
}

/// `"[T1, T2]"` / `'["T1","T2"]'` 形式的列表单元格: 优先按 JSON 数组解析，否则去掉方括号
fn unwrap_bracketed_list(value: &Value) -> Value {
    let text = match value {
        Value::String(s) => s.trim(),
        other => return other.clone(),
    };

    if text.len() >= 2 && text.starts_with('[') && text.ends_with(']') {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) {
            return Value::Array(items);
        }
        return Value::String(text[1..text.len() - 1].to_string());
    }

    Value::String(text.to_string())
}
