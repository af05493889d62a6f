// ==========================================
// 三表导入系统 - 行转换器实现
// ==========================================
// 流程: 行结构检查 → 字段映射/规范化 → 输入形状校验 → Schema 转换 → 规范形状校验
// 红线: 不 panic；单行失败只影响该行；每个行下标恰好落入 accepted / rejected 之一
// ==========================================

use crate::domain::entity::{AcceptedRecord, EntityRecord};
use crate::domain::types::EntityKind;
use crate::domain::validation::{CleanOutcome, RowRejection, TransformOutcome};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::schema::{type_name, EntitySchema};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

// ==========================================
// RowTransformer - 行转换器
// ==========================================
#[derive(Default)]
pub struct RowTransformer {
    field_mapper: FieldMapper,
}

impl RowTransformer {
    pub fn new(field_mapper: FieldMapper) -> Self {
        Self { field_mapper }
    }

    /// 原始行 → 规范记录
    ///
    /// # 返回
    /// - accepted: 转换成功的记录（按原始行顺序，带稳定行标识）
    /// - rejected: 被丢弃的行（下标 + 可读原因）
    #[instrument(skip(self, raw_rows), fields(entity = %T::KIND, rows = raw_rows.len()))]
    pub fn transform_rows<T: EntityRecord>(&self, raw_rows: &[Value]) -> TransformOutcome<T> {
        let mut outcome = TransformOutcome::default();

        for (index, raw) in raw_rows.iter().enumerate() {
            match self.transform_row::<T>(index, raw) {
                Ok(record) => outcome.accepted.push(AcceptedRecord::new(record, index)),
                Err(e) => {
                    warn!(row_index = index, error = %e, "行转换失败，已丢弃");
                    outcome.rejected.push(RowRejection {
                        index,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            accepted = outcome.accepted.len(),
            rejected = outcome.rejected.len(),
            "行转换完成"
        );
        outcome
    }

    fn transform_row<T: EntityRecord>(&self, index: usize, raw: &Value) -> ImportResult<T> {
        let row_number = index + 1;
        let row = raw.as_object().ok_or_else(|| ImportError::RowNotObject {
            row: row_number,
            received: type_name(raw).to_string(),
        })?;

        // === 步骤 1-2: 字段解析与规范化 ===
        let candidate = self.field_mapper.map_row(row, T::KIND);

        // === 步骤 3: 输入形状 ===
        let schema = EntitySchema::for_kind(T::KIND);
        let input = schema
            .input()
            .validate(&candidate)
            .map_err(|issues| ImportError::InputShape {
                row: row_number,
                issues,
            })?;

        // === 步骤 4: Schema 转换 + 规范形状 ===
        let canonical = schema
            .canonical()
            .validate(&schema.transform(&input))
            .map_err(|issues| ImportError::CanonicalShape {
                row: row_number,
                issues,
            })?;

        debug!(row_index = index, "行通过规范形状校验");

        serde_json::from_value(Value::Object(canonical)).map_err(|e| ImportError::RecordDecode {
            row: row_number,
            message: e.to_string(),
        })
    }

    /// 程序化记录流的粗粒度校验（不修改被接受的记录）
    ///
    /// 只检查: ID/名称存在、AttributesJSON 文本可解析、阶段字段为数字数组
    #[instrument(skip(self, records), fields(entity = %kind, rows = records.len()))]
    pub fn validate_and_clean<R: Serialize + Clone>(
        &self,
        records: &[R],
        kind: EntityKind,
    ) -> CleanOutcome<R> {
        let mut outcome = CleanOutcome::default();

        for (index, record) in records.iter().enumerate() {
            match check_record(record, kind) {
                Ok(()) => outcome.valid.push(record.clone()),
                Err(e) => {
                    debug!(row_index = index, error = %e, "记录未通过粗粒度校验");
                    outcome.invalid.push(RowRejection {
                        index,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            valid = outcome.valid.len(),
            invalid = outcome.invalid.len(),
            "粗粒度校验完成"
        );
        outcome
    }
}

fn check_record<R: Serialize>(record: &R, kind: EntityKind) -> ImportResult<()> {
    let value = serde_json::to_value(record)?;

    if !is_present(value.get(kind.id_field())) || !is_present(value.get(kind.name_field())) {
        return Err(ImportError::MissingIdentity {
            id_field: kind.id_field(),
            name_field: kind.name_field(),
        });
    }

    match kind {
        EntityKind::Client => {
            if let Some(Value::String(text)) = value.get("AttributesJSON") {
                if !text.is_empty() && serde_json::from_str::<Value>(text).is_err() {
                    return Err(ImportError::InvalidJson {
                        field: "AttributesJSON",
                    });
                }
            }
        }
        EntityKind::Worker => check_phase_array(&value, "AvailableSlots")?,
        EntityKind::Task => check_phase_array(&value, "PreferredPhase")?,
    }

    Ok(())
}

fn check_phase_array(value: &Value, field: &'static str) -> ImportResult<()> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(s)) if s.is_empty() => Ok(()),
        Some(Value::Array(items)) => {
            if items.iter().all(Value::is_number) {
                Ok(())
            } else {
                Err(ImportError::InvalidNumbers { field })
            }
        }
        Some(_) => Err(ImportError::NotAnArray { field }),
    }
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

// ==========================================
// 便捷入口（默认字段映射器）
// ==========================================

/// 使用默认列名拼写转换原始行
pub fn transform_rows<T: EntityRecord>(raw_rows: &[Value]) -> TransformOutcome<T> {
    RowTransformer::default().transform_rows(raw_rows)
}

/// 程序化记录流的粗粒度校验
pub fn validate_and_clean<R: Serialize + Clone>(records: &[R], kind: EntityKind) -> CleanOutcome<R> {
    RowTransformer::default().validate_and_clean(records, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Client, Task, Worker};
    use serde_json::json;

    #[test]
    fn test_transform_clients_basic() {
        let rows = vec![
            json!({
                "ClientID": "C1",
                "ClientName": "Acme",
                "PriorityLevel": "3",
                "RequestedTaskIDs": "T1,T2,T1",
                "GroupTag": "GroupA",
                "AttributesJSON": "{\"tier\":\"gold\"}"
            }),
            json!({
                "client_id": "C2",
                "client_name": "Beta",
                "AttributesJSON": "vip customer"
            }),
        ];

        let outcome = transform_rows::<Client>(&rows);
        assert!(outcome.rejected.is_empty());
        assert_eq!(outcome.accepted.len(), 2);

        let first = &outcome.accepted[0].record;
        assert_eq!(first.priority_level, 3);
        assert_eq!(first.requested_task_ids, vec!["T1", "T2", "T1"]);
        assert_eq!(first.group_tag.as_deref(), Some("GroupA"));
        assert_eq!(first.attributes_json["tier"], json!("gold"));

        let second = &outcome.accepted[1].record;
        assert_eq!(second.priority_level, 1);
        assert_eq!(second.attributes_json["message"], json!("vip customer"));
        assert_eq!(outcome.accepted[1].row_key, "C2");
    }

    #[test]
    fn test_transform_workers_ranges() {
        let rows = vec![json!({
            "Worker ID": "W1",
            "Worker Name": "Ann",
            "Skills": "ml, etl",
            "Available Slots": "[1-3, 5]",
            "Max Load Per Ph": 2,
            "Qualification Level": 4.0
        })];

        let outcome = transform_rows::<Worker>(&rows);
        let worker = &outcome.accepted[0].record;
        assert_eq!(worker.skills, vec!["ml", "etl"]);
        assert_eq!(worker.available_slots, vec![1, 2, 3, 5]);
        assert_eq!(worker.qualification_level, 4);
    }

    #[test]
    fn test_transform_tasks_preferred_phase_sorted() {
        let rows = vec![json!({
            "TaskID": "T1",
            "TaskName": "Build",
            "Category": "ETL",
            "Duration": 2,
            "RequiredSkills": ["ml"],
            "PreferredPhase": "4, 1-2, 2",
            "MaxConcurrent": 1
        })];

        let outcome = transform_rows::<Task>(&rows);
        assert_eq!(outcome.accepted[0].record.preferred_phase, vec![1, 2, 4]);
    }

    #[test]
    fn test_transform_rejects_and_continues() {
        let rows = vec![
            json!({ "ClientName": "No id" }),
            json!("not a row"),
            json!({ "ClientID": "C3", "ClientName": "Ok", "PriorityLevel": 9 }),
            json!({ "ClientID": "C4", "ClientName": "Fine" }),
        ];

        let outcome = transform_rows::<Client>(&rows);
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].source_row, 3);

        let rejected: Vec<usize> = outcome.rejected.iter().map(|r| r.index).collect();
        assert_eq!(rejected, vec![0, 1, 2]);
        assert!(outcome.rejected[0].error.contains("Client ID is required"));
        assert!(outcome.rejected[1].error.contains("expected an object"));
        assert!(outcome.rejected[2].error.contains("Priority must be between 1-5"));
    }

    #[test]
    fn test_transform_zero_load_rejected() {
        let rows = vec![json!({
            "WorkerID": "W1",
            "WorkerName": "Ann",
            "MaxLoadPerPh": "0"
        })];

        let outcome = transform_rows::<Worker>(&rows);
        assert!(outcome.accepted.is_empty());
        assert!(outcome.rejected[0].error.contains("Max load must be at least 1"));
    }

    #[test]
    fn test_validate_and_clean_values() {
        let records = vec![
            json!({ "WorkerID": "W1", "WorkerName": "Ann", "AvailableSlots": [1, 2] }),
            json!({ "WorkerID": "", "WorkerName": "Bob" }),
            json!({ "WorkerID": "W3", "WorkerName": "Cy", "AvailableSlots": "1,2" }),
            json!({ "WorkerID": "W4", "WorkerName": "Di", "AvailableSlots": [1, "x"] }),
        ];

        let outcome = validate_and_clean(&records, EntityKind::Worker);
        assert_eq!(outcome.valid, vec![records[0].clone()]);
        assert_eq!(outcome.invalid.len(), 3);
        assert_eq!(outcome.invalid[0].error, "Missing required WorkerID or WorkerName");
        assert_eq!(outcome.invalid[1].error, "AvailableSlots must be an array");
        assert_eq!(
            outcome.invalid[2].error,
            "AvailableSlots must contain only valid numbers"
        );
    }

    #[test]
    fn test_validate_and_clean_attributes_json() {
        let records = vec![
            json!({ "ClientID": "C1", "ClientName": "A", "AttributesJSON": "{\"a\":1}" }),
            json!({ "ClientID": "C2", "ClientName": "B", "AttributesJSON": "{broken" }),
        ];

        let outcome = validate_and_clean(&records, EntityKind::Client);
        assert_eq!(outcome.valid.len(), 1);
        assert_eq!(outcome.invalid[0].index, 1);
        assert_eq!(outcome.invalid[0].error, "Invalid JSON format in AttributesJSON");
    }

    #[test]
    fn test_validate_and_clean_typed_records() {
        let task = Task {
            task_id: "T1".to_string(),
            task_name: "Build".to_string(),
            category: "ETL".to_string(),
            duration: 1,
            required_skills: vec![],
            preferred_phase: vec![1],
            max_concurrent: 1,
        };
        let unnamed = Task {
            task_name: String::new(),
            ..task.clone()
        };

        let outcome = validate_and_clean(&[task.clone(), unnamed], EntityKind::Task);
        assert_eq!(outcome.valid, vec![task]);
        assert_eq!(outcome.invalid[0].index, 1);
    }
}
