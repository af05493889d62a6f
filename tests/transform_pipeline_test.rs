// ==========================================
// 三表导入系统 - 行转换管道集成测试
// ==========================================
// 覆盖: 表头映射 → transform_rows → validate_all 全流程；随机行全函数性（proptest）
// ==========================================


use proptest::prelude::*;
use resource_ingest::importer::{accepted_spellings, EntitySchema, FieldMapper};
use resource_ingest::{
    remap_or_passthrough, transform_rows, validate_all, validate_and_clean, AliasHeaderMapper,
    Client, EntityKind, RowTransformer, Task, Worker,
};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use test_helpers::{raw_client_rows, raw_table, raw_task_rows, raw_worker_rows};

// ==========================================
// 辅助函数
// ==========================================

fn check_exactly_one_outcome<T>(
    rows: &[Value],
    outcome: &resource_ingest::TransformOutcome<T>,
) -> Result<(), TestCaseError> {
    let accepted: HashSet<usize> = outcome.accepted.iter().map(|a| a.source_row).collect();
    let rejected: HashSet<usize> = outcome.rejected.iter().map(|r| r.index).collect();

    prop_assert_eq!(accepted.len(), outcome.accepted.len(), "重复的 accepted 下标");
    prop_assert_eq!(rejected.len(), outcome.rejected.len(), "重复的 rejected 下标");
    prop_assert!(accepted.is_disjoint(&rejected));
    prop_assert_eq!(accepted.len() + rejected.len(), rows.len());
    prop_assert!(accepted.iter().chain(rejected.iter()).all(|i| *i < rows.len()));
    Ok(())
}

fn headers(kind: EntityKind) -> Vec<&'static str> {
    EntitySchema::for_kind(kind).field_names()
}

// ==========================================
// 测试: 样例数据全流程
// ==========================================

#[test]
fn test_sample_upload_end_to_end() {
    resource_ingest::logging::init_test();

    let clients = transform_rows::<Client>(&raw_client_rows());
    let workers = transform_rows::<Worker>(&raw_worker_rows());
    let tasks = transform_rows::<Task>(&raw_task_rows());

    assert!(clients.rejected.is_empty(), "{:?}", clients.rejected);
    assert!(workers.rejected.is_empty(), "{:?}", workers.rejected);
    assert!(tasks.rejected.is_empty(), "{:?}", tasks.rejected);

    let clients = clients.records();
    let workers = workers.records();
    let tasks = tasks.records();

    assert_eq!(clients[0].attributes_json["budget"], json!(100000));
    assert_eq!(clients[1].requested_task_ids, vec!["T2", "T3"]);
    assert_eq!(clients[1].attributes_json["message"], json!("prefers mornings"));
    assert_eq!(workers[0].available_slots, vec![1, 2, 3]);
    assert_eq!(workers[1].available_slots, vec![2, 3, 4, 5]);
    assert_eq!(workers[1].skills, vec!["analysis", "coding"]);
    assert_eq!(tasks[1].preferred_phase, vec![2, 3, 4]);
    assert_eq!(tasks[2].preferred_phase, vec![5]);

    // 阶段并集 {1..5} = 5；T2 需要 ml，仅 W1 具备
    let findings = validate_all(&clients, &workers, &tasks);
    assert!(findings.is_empty(), "unexpected findings: {:?}", findings);
}

#[test]
fn test_rows_are_independent() {
    let mut rows = raw_task_rows();
    rows.insert(1, json!({ "TaskID": "T9", "TaskName": "", "Category": "X" }));
    rows.push(json!(null));

    let outcome = transform_rows::<Task>(&rows);
    let ids: Vec<&str> = outcome.accepted.iter().map(|a| a.record.task_id.as_str()).collect();
    assert_eq!(ids, vec!["T1", "T2", "T3"]);

    let rejected: Vec<usize> = outcome.rejected.iter().map(|r| r.index).collect();
    assert_eq!(rejected, vec![1, 4]);
    assert!(outcome.rejected[0].error.starts_with("Row 2:"));
    assert!(outcome.rejected[0].error.contains("Task name is required"));
}

#[test]
fn test_every_spelling_resolves() {
    for kind in EntityKind::ALL {
        for field in headers(kind) {
            let spellings = accepted_spellings(field);
            assert!(spellings.len() >= 2, "{} 至少应有两种拼写", field);
            assert!(spellings.contains(&field.to_lowercase()));
        }
    }

    let row = json!({
        "task_id": "T1",
        "Task Name": "Build",
        "category": "ETL",
        "duration": 2,
        "Required Skills": "ml",
        "preferred_phase": "1-2",
        "max_concurrent": 1
    });
    let outcome = transform_rows::<Task>(&[row]);
    assert_eq!(outcome.accepted.len(), 1, "{:?}", outcome.rejected);
}

#[test]
fn test_synthetic_row_key_for_missing_id() {
    let outcome = transform_rows::<Worker>(&[json!({ "WorkerName": "Ann" })]);
    assert!(outcome.accepted.is_empty());
    assert_eq!(outcome.rejected[0].index, 0);

    let accepted = resource_ingest::AcceptedRecord::new(test_helpers::worker("", &[], &[], 1), 7);
    assert_eq!(accepted.row_key, "worker_7");
}

// ==========================================
// 测试: 表头映射协作者
// ==========================================

#[test]
fn test_alias_header_mapping_before_transform() {
    let mut aliases = HashMap::new();
    aliases.insert("Skills".to_string(), vec!["Competencies".to_string()]);
    aliases.insert("AvailableSlots".to_string(), vec!["Free Phases".to_string()]);

    let rows = vec![json!({
        "WORKER-ID": "W1",
        "Worker-Name": "Ann",
        "competencies": "ml",
        "FREE_PHASES": "1-4",
        "max load per ph": 2,
        "Qualification Level": 5
    })];

    let mapper = AliasHeaderMapper::with_aliases(aliases);
    let mapped = remap_or_passthrough(&mapper, &rows, EntityKind::Worker);
    let outcome = transform_rows::<Worker>(&mapped);

    let worker = &outcome.accepted[0].record;
    assert_eq!(worker.worker_id, "W1");
    assert_eq!(worker.skills, vec!["ml"]);
    assert_eq!(worker.available_slots, vec![1, 2, 3, 4]);
    assert_eq!(worker.max_load_per_ph, 2);
}

#[test]
fn test_header_mapping_agrees_with_direct_transform() {
    let base = json!({ "TaskName": "Build", "Category": "ETL", "Duration": 1, "MaxConcurrent": 1 });
    let with = |extra: Value| {
        let mut row = base.clone();
        if let (Some(row), Some(extra)) = (row.as_object_mut(), extra.as_object()) {
            row.extend(extra.clone());
        }
        row
    };
    let rows = vec![
        with(json!({ "TaskID": "T1", "Task ID": "" })),
        with(json!({ "TaskID": "T1", "Task ID": "T2" })),
        with(json!({ "TaskID": "", "Task ID": "T3" })),
    ];

    let direct = transform_rows::<Task>(&rows);
    let mapped = remap_or_passthrough(&AliasHeaderMapper::new(), &rows, EntityKind::Task);
    let remapped = transform_rows::<Task>(&mapped);

    assert!(remapped.rejected.is_empty(), "{:?}", remapped.rejected);
    let ids = |outcome: &resource_ingest::TransformOutcome<Task>| -> Vec<String> {
        outcome.accepted.iter().map(|a| a.record.task_id.clone()).collect()
    };
    assert_eq!(ids(&remapped), vec!["T1", "T1", "T3"]);
    assert_eq!(ids(&direct), ids(&remapped));
}

#[test]
fn test_field_mapper_aliases_without_header_mapper() {
    let mut aliases = HashMap::new();
    aliases.insert("ClientName".to_string(), vec!["Company".to_string()]);
    let transformer = RowTransformer::new(FieldMapper::with_aliases(aliases));

    let outcome =
        transformer.transform_rows::<Client>(&[json!({ "ClientID": "C1", "Company": "Acme" })]);
    assert_eq!(outcome.accepted[0].record.client_name, "Acme");
}

// ==========================================
// 性质测试: 随机行全函数性
// ==========================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_arbitrary_rows_exactly_one_outcome(
        client_rows in raw_table(EntityKind::Client, 25),
        worker_rows in raw_table(EntityKind::Worker, 25),
        task_rows in raw_table(EntityKind::Task, 25),
    ) {
        let clients = transform_rows::<Client>(&client_rows);
        let workers = transform_rows::<Worker>(&worker_rows);
        let tasks = transform_rows::<Task>(&task_rows);

        check_exactly_one_outcome(&client_rows, &clients)?;
        check_exactly_one_outcome(&worker_rows, &workers)?;
        check_exactly_one_outcome(&task_rows, &tasks)?;

        // 接受的记录必须满足规范约束
        for worker in workers.records() {
            prop_assert!(worker.max_load_per_ph >= 1);
            prop_assert!((1..=5).contains(&worker.qualification_level));
            prop_assert!(worker.available_slots.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(worker.skills.iter().collect::<HashSet<_>>().len() == worker.skills.len());
        }
        for task in tasks.records() {
            prop_assert!(task.duration >= 1 && task.max_concurrent >= 1);
            prop_assert!(!task.category.is_empty());
            prop_assert!(task.preferred_phase.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(task.required_skills.iter().all(|s| !s.trim().is_empty()));
        }

        // 校验器对任意规范快照同样全函数，且合并后每个单元格唯一
        let findings = validate_all(&clients.records(), &workers.records(), &tasks.records());
        let keys: HashSet<(EntityKind, usize, String)> = findings
            .iter()
            .map(|f| (f.entity, f.row_index, f.field.clone()))
            .collect();
        prop_assert_eq!(keys.len(), findings.len());
    }

    #[test]
    fn test_arbitrary_rows_validate_and_clean_partitions(rows in raw_table(EntityKind::Worker, 60)) {
        let outcome = validate_and_clean(&rows, EntityKind::Worker);
        prop_assert_eq!(outcome.valid.len() + outcome.invalid.len(), rows.len());
        for valid in &outcome.valid {
            prop_assert!(rows.contains(valid));
        }
    }

    #[test]
    fn test_header_mapping_never_loses_rows(rows in raw_table(EntityKind::Task, 20)) {
        let mapped = remap_or_passthrough(&AliasHeaderMapper::new(), &rows, EntityKind::Task);
        prop_assert_eq!(mapped.len(), rows.len());
        check_exactly_one_outcome(&mapped, &transform_rows::<Task>(&mapped))?;
    }
}
