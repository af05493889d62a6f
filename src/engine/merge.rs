// ==========================================
// 三表导入系统 - 校验发现合并
// ==========================================
// 分组键: (entity, row_index, field)，BTreeMap 保证输出顺序确定
// 合并规则: message 以 "; " 拼接；value 多于一个时收集为数组
// ==========================================

use crate::domain::types::EntityKind;
use crate::domain::validation::ValidationError;
use serde_json::Value;
use std::collections::BTreeMap;

type MergeKey = (EntityKind, usize, String);

#[derive(Default)]
struct MergedCell {
    messages: Vec<String>,
    values: Vec<Value>,
}

/// 合并同一单元格的多条校验发现
///
/// 输出按 (entity, row_index, field) 升序；实体顺序为 client < worker < task。
pub fn merge_errors(errors: Vec<ValidationError>) -> Vec<ValidationError> {
    let mut cells: BTreeMap<MergeKey, MergedCell> = BTreeMap::new();

    for error in errors {
        let cell = cells
            .entry((error.entity, error.row_index, error.field))
            .or_default();
        cell.messages.push(error.message);
        cell.values.push(error.value);
    }

    cells
        .into_iter()
        .map(|((entity, row_index, field), mut cell)| {
            let value = if cell.values.len() == 1 {
                cell.values.pop().unwrap_or(Value::Null)
            } else {
                Value::Array(cell.values)
            };
            ValidationError {
                entity,
                row_index,
                field,
                message: cell.messages.join("; "),
                value,
            }
        })
        .collect()
}
