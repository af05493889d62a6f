// ==========================================
// 三表导入系统 - 表格 CSV 导出
// ==========================================
// 列顺序: 实体 Schema 字段顺序
// 单元格: 列表以 "," 拼接；对象为紧凑 JSON；缺省值为空
// ==========================================

use crate::domain::entity::EntityRecord;
use crate::export::ExportResult;
use crate::importer::schema::EntitySchema;
use csv::Writer;
use serde_json::Value;
use std::io;

/// 将规范记录写为 CSV（含表头）
pub fn write_table_csv<T: EntityRecord, W: io::Write>(records: &[T], writer: W) -> ExportResult<()> {
    let schema = EntitySchema::for_kind(T::KIND);
    let header = schema.field_names();

    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(&header)?;

    for record in records {
        let value = serde_json::to_value(record)?;
        let row: Vec<String> = header
            .iter()
            .map(|field| cell_text(value.get(*field)))
            .collect();
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// 单元格文本
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(","),
        Some(other) => other.to_string(),
    }
}
