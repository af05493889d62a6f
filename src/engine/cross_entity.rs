// ==========================================
// 三表导入系统 - 跨实体规则
// ==========================================
// 规则: 主键重复 / 任务引用 / 技能覆盖 / 槽位容量 / 阶段饱和 / 并发可行性
// 聚合统计每次调用重新计算（不缓存）
// 所有规则均为建议性发现，不修改记录
// ==========================================

use crate::domain::entity::{Client, EntityRecord, Task, Worker};
use crate::domain::validation::ValidationError;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap, HashSet};

// ==========================================
// ResourceAggregates - 跨表聚合统计
// ==========================================
#[derive(Debug, Default)]
pub struct ResourceAggregates<'a> {
    pub task_ids: HashSet<&'a str>,      // 全部任务 ID
    pub worker_skills: HashSet<&'a str>, // 全部工人技能并集
    pub offered_phases: BTreeSet<i64>,   // 全部工人可用阶段并集
}

impl<'a> ResourceAggregates<'a> {
    pub fn compute(workers: &'a [Worker], tasks: &'a [Task]) -> Self {
        Self {
            task_ids: tasks.iter().map(|t| t.task_id.as_str()).collect(),
            worker_skills: workers
                .iter()
                .flat_map(|w| w.skills.iter().map(String::as_str))
                .collect(),
            offered_phases: workers
                .iter()
                .flat_map(|w| w.available_slots.iter().copied())
                .collect(),
        }
    }
}

// ==========================================
// 规则 2: 主键重复（每次出现各报一条）
// ==========================================
pub fn check_duplicate_ids<T: EntityRecord>(records: &[T]) -> Vec<ValidationError> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.natural_id()).or_insert(0) += 1;
    }

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| counts.get(record.natural_id()).copied().unwrap_or(0) > 1)
        .map(|(index, record)| {
            let id = record.natural_id();
            ValidationError::new(
                T::KIND,
                index,
                T::KIND.id_field(),
                format!("Duplicate {} ID: {}", T::KIND.label(), id),
                Value::from(id),
            )
        })
        .collect()
}

// ==========================================
// 规则 3: 请求任务必须存在
// ==========================================
pub fn check_requested_tasks(
    clients: &[Client],
    aggregates: &ResourceAggregates<'_>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (index, client) in clients.iter().enumerate() {
        for task_id in &client.requested_task_ids {
            if !aggregates.task_ids.contains(task_id.as_str()) {
                errors.push(ValidationError::new(
                    Client::KIND,
                    index,
                    "RequestedTaskIDs",
                    format!("Requested task ID \"{}\" does not exist", task_id),
                    Value::from(task_id.as_str()),
                ));
            }
        }
    }

    errors
}

// ==========================================
// 规则 4: 所需技能必须被工人技能并集覆盖
// ==========================================
pub fn check_skill_coverage(
    tasks: &[Task],
    aggregates: &ResourceAggregates<'_>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (index, task) in tasks.iter().enumerate() {
        let mut reported = HashSet::new();
        for skill in &task.required_skills {
            if !aggregates.worker_skills.contains(skill.as_str())
                && reported.insert(skill.as_str())
            {
                errors.push(ValidationError::new(
                    Task::KIND,
                    index,
                    "RequiredSkills",
                    format!("Required skill \"{}\" is not available in any worker", skill),
                    Value::from(skill.as_str()),
                ));
            }
        }
    }

    errors
}

// ==========================================
// 规则 5: MaxLoadPerPh 不超过自身可用阶段数
// ==========================================
pub fn check_slot_capacity(workers: &[Worker]) -> Vec<ValidationError> {
    workers
        .iter()
        .enumerate()
        .filter_map(|(index, worker)| {
            let slots = worker.available_slots.iter().collect::<HashSet<_>>().len() as i64;
            (worker.max_load_per_ph > slots).then(|| {
                ValidationError::new(
                    Worker::KIND,
                    index,
                    "MaxLoadPerPh",
                    format!(
                        "Max load ({}) exceeds available slots ({})",
                        worker.max_load_per_ph, slots
                    ),
                    Value::from(worker.max_load_per_ph),
                )
            })
        })
        .collect()
}

// ==========================================
// 规则 6: Duration 不超过全体工人提供的不同阶段数
// ==========================================
pub fn check_phase_saturation(
    tasks: &[Task],
    aggregates: &ResourceAggregates<'_>,
) -> Vec<ValidationError> {
    let offered = aggregates.offered_phases.len() as i64;

    tasks
        .iter()
        .enumerate()
        .filter(|(_, task)| task.duration > offered)
        .map(|(index, task)| {
            ValidationError::new(
                Task::KIND,
                index,
                "Duration",
                format!(
                    "Duration ({}) exceeds total distinct phases offered by workers ({})",
                    task.duration, offered
                ),
                Value::from(task.duration),
            )
        })
        .collect()
}

// ==========================================
// 规则 7: MaxConcurrent 不超过合格工人数
// ==========================================
// 合格: 工人技能集合 ⊇ 任务所需技能集合
pub fn check_concurrency(tasks: &[Task], workers: &[Worker]) -> Vec<ValidationError> {
    let skill_sets: Vec<HashSet<&str>> = workers
        .iter()
        .map(|w| w.skills.iter().map(String::as_str).collect())
        .collect();

    tasks
        .iter()
        .enumerate()
        .filter_map(|(index, task)| {
            let qualified = qualified_worker_count(task, &skill_sets) as i64;
            (task.max_concurrent > qualified).then(|| {
                ValidationError::new(
                    Task::KIND,
                    index,
                    "MaxConcurrent",
                    format!(
                        "Max concurrent ({}) exceeds qualified workers ({})",
                        task.max_concurrent, qualified
                    ),
                    Value::from(task.max_concurrent),
                )
            })
        })
        .collect()
}

fn qualified_worker_count(task: &Task, skill_sets: &[HashSet<&str>]) -> usize {
    skill_sets
        .iter()
        .filter(|skills| {
            task.required_skills
                .iter()
                .all(|required| skills.contains(required.as_str()))
        })
        .count()
}
