// ==========================================
// 三表导入系统 - 单记录校验 / 单元格编辑预览
// ==========================================
// 编辑流程: 复制记录 → 写入新值 → 输入形状 → Schema 转换 → 规范形状 → 新记录
// 红线: 原记录不被修改；任一阶段失败则返回校验发现
// ==========================================

use crate::domain::entity::EntityRecord;
use crate::domain::validation::{FieldIssue, ValidationError};
use crate::domain::types::EntityKind;
use crate::importer::schema::{EntitySchema, FieldRule};
use serde_json::{Map, Value};
use tracing::debug;

/// 单条记录的规范形状校验（归属到给定行）
pub fn validate_entity<T: EntityRecord>(record: &T, row_index: usize) -> Vec<ValidationError> {
    let value = match serde_json::to_value(record) {
        Ok(value) => value,
        Err(e) => {
            return vec![ValidationError::new(
                T::KIND,
                row_index,
                "",
                e.to_string(),
                Value::Null,
            )]
        }
    };

    match EntitySchema::for_kind(T::KIND).canonical().validate(&value) {
        Ok(_) => Vec::new(),
        Err(issues) => issues_to_errors(T::KIND, row_index, &issues, &value),
    }
}

/// 预览单元格编辑
///
/// # 参数
/// - `record`: 当前记录（不会被修改）
/// - `row_index`: 行下标（用于归属校验发现）
/// - `field`: 逻辑字段名（PascalCase）
/// - `new_value`: 原始单元格值（与上传单元格同样宽松）
///
/// # 返回
/// - Ok(T): 编辑后的规范记录
/// - Err: 该行的校验发现（未知字段 / 形状不符 / 约束不满足）
pub fn preview_field_edit<T: EntityRecord>(
    record: &T,
    row_index: usize,
    field: &str,
    new_value: Value,
) -> Result<T, Vec<ValidationError>> {
    let schema = EntitySchema::for_kind(T::KIND);
    let spec = schema.field(field).ok_or_else(|| {
        vec![ValidationError::new(
            T::KIND,
            row_index,
            field,
            format!("Unknown field \"{}\"", field),
            new_value.clone(),
        )]
    })?;

    let mut row = match serde_json::to_value(record) {
        Ok(Value::Object(row)) => row,
        Ok(_) => Map::new(),
        Err(e) => {
            return Err(vec![ValidationError::new(
                T::KIND,
                row_index,
                field,
                e.to_string(),
                new_value,
            )])
        }
    };
    row.insert(field.to_string(), coerce_edit_value(spec.rule, new_value));
    let edited = Value::Object(row);

    let input = schema
        .input()
        .validate(&edited)
        .map_err(|issues| issues_to_errors(T::KIND, row_index, &issues, &edited))?;

    let transformed = schema.transform(&input);
    let canonical = schema
        .canonical()
        .validate(&transformed)
        .map_err(|issues| issues_to_errors(T::KIND, row_index, &issues, &transformed))?;

    let updated = serde_json::from_value(Value::Object(canonical)).map_err(|e| {
        vec![ValidationError::new(
            T::KIND,
            row_index,
            field,
            e.to_string(),
            Value::Null,
        )]
    })?;

    debug!(entity = %T::KIND, row_index, field, "单元格编辑预览通过");
    Ok(updated)
}

/// 表格编辑器通常以文本提交单元格: 整数字段接受整数文本，文本字段接受标量
fn coerce_edit_value(rule: FieldRule, value: Value) -> Value {
    match (rule, value) {
        (FieldRule::BoundedInt { .. }, Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::String(s),
        },
        (FieldRule::RequiredText { .. } | FieldRule::OptionalText, Value::Number(n)) => {
            Value::String(n.to_string())
        }
        (FieldRule::RequiredText { .. } | FieldRule::OptionalText, Value::Bool(b)) => {
            Value::String(b.to_string())
        }
        (_, value) => value,
    }
}

fn issues_to_errors(
    kind: EntityKind,
    row_index: usize,
    issues: &[FieldIssue],
    source: &Value,
) -> Vec<ValidationError> {
    issues
        .iter()
        .map(|issue| {
            ValidationError::new(
                kind,
                row_index,
                issue.path.clone(),
                issue.message.clone(),
                source.get(&issue.path).cloned().unwrap_or(Value::Null),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Client, Task};
    use serde_json::json;

    fn task() -> Task {
        Task {
            task_id: "T1".to_string(),
            task_name: "Build".to_string(),
            category: "ETL".to_string(),
            duration: 2,
            required_skills: vec!["etl".to_string()],
            preferred_phase: vec![1, 2],
            max_concurrent: 1,
        }
    }

    #[test]
    fn test_validate_entity_ok() {
        assert!(validate_entity(&task(), 0).is_empty());
    }

    #[test]
    fn test_validate_entity_reports_row() {
        let mut bad = task();
        bad.duration = 0;
        bad.preferred_phase = vec![3, 1];

        let errors = validate_entity(&bad, 4);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.row_index == 4 && e.entity == EntityKind::Task));
        assert_eq!(errors[0].field, "Duration");
        assert_eq!(errors[0].value, json!(0));
        assert_eq!(errors[1].field, "PreferredPhase");
    }

    #[test]
    fn test_preview_range_edit() {
        let original = task();
        let updated = preview_field_edit(&original, 0, "PreferredPhase", json!("2-4, 1")).unwrap();

        assert_eq!(updated.preferred_phase, vec![1, 2, 3, 4]);
        assert_eq!(original.preferred_phase, vec![1, 2]);
    }

    #[test]
    fn test_preview_numeric_text_edit() {
        let updated = preview_field_edit(&task(), 0, "Duration", json!("3")).unwrap();
        assert_eq!(updated.duration, 3);
    }

    #[test]
    fn test_preview_rejects_out_of_range() {
        let client = Client {
            client_id: "C1".to_string(),
            client_name: "Acme".to_string(),
            priority_level: 2,
            requested_task_ids: vec![],
            group_tag: None,
            attributes_json: Map::new(),
        };

        let errors = preview_field_edit(&client, 5, "PriorityLevel", json!(6)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].row_index, 5);
        assert_eq!(errors[0].message, "Priority must be between 1-5");
        assert_eq!(errors[0].value, json!(6));
    }

    #[test]
    fn test_preview_rejects_blank_name() {
        let errors = preview_field_edit(&task(), 0, "TaskName", json!("   ")).unwrap_err();
        assert_eq!(errors[0].message, "Task name is required");
    }

    #[test]
    fn test_preview_unknown_field() {
        let errors = preview_field_edit(&task(), 0, "Colour", json!("red")).unwrap_err();
        assert_eq!(errors[0].message, "Unknown field \"Colour\"");
    }
}
