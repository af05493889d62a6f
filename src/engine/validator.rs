// ==========================================
// 三表导入系统 - 资源校验引擎
// ==========================================
// 输入: 三张规范记录表（同一快照）
// 输出: 合并后的校验发现列表（建议性，不修改记录）
// 阶段（依次执行，互不短路）:
//   1. 规范形状复核
//   2. 主键重复
//   3. 请求任务存在性
//   4. 技能覆盖
//   5. 槽位容量
//   6. 阶段饱和
//   7. 并发可行性
// 后处理: 按 (entity, row_index, field) 合并
// ==========================================

use crate::domain::entity::{Client, EntityRecord, Task, Worker};
use crate::domain::validation::ValidationError;
use crate::engine::cross_entity::{
    check_concurrency, check_duplicate_ids, check_phase_saturation, check_requested_tasks,
    check_skill_coverage, check_slot_capacity, ResourceAggregates,
};
use crate::engine::edit::validate_entity;
use crate::engine::merge::merge_errors;
use tracing::{debug, info, instrument};

// ==========================================
// ResourceValidator - 资源校验引擎
// ==========================================
#[derive(Debug, Default)]
pub struct ResourceValidator {
    // 无状态引擎，聚合统计每次调用重新计算
}

impl ResourceValidator {
    pub fn new() -> Self {
        Self {}
    }

    /// 校验三张表
    ///
    /// # 参数
    /// - `clients` / `workers` / `tasks`: 规范记录表（行下标即 row_index）
    ///
    /// # 返回
    /// 合并后的校验发现（同一单元格只出现一次）
    #[instrument(skip_all, fields(
        clients = clients.len(),
        workers = workers.len(),
        tasks = tasks.len()
    ))]
    pub fn validate_all(
        &self,
        clients: &[Client],
        workers: &[Worker],
        tasks: &[Task],
    ) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // 1. 规范形状复核
        errors.extend(schema_pass(clients));
        errors.extend(schema_pass(workers));
        errors.extend(schema_pass(tasks));
        debug!(count = errors.len(), "规范形状复核完成");

        // 2. 主键重复
        errors.extend(check_duplicate_ids(clients));
        errors.extend(check_duplicate_ids(workers));
        errors.extend(check_duplicate_ids(tasks));

        // 3-7. 跨实体规则
        let aggregates = ResourceAggregates::compute(workers, tasks);
        debug!(
            task_ids = aggregates.task_ids.len(),
            worker_skills = aggregates.worker_skills.len(),
            offered_phases = aggregates.offered_phases.len(),
            "聚合统计完成"
        );
        errors.extend(check_requested_tasks(clients, &aggregates));
        errors.extend(check_skill_coverage(tasks, &aggregates));
        errors.extend(check_slot_capacity(workers));
        errors.extend(check_phase_saturation(tasks, &aggregates));
        errors.extend(check_concurrency(tasks, workers));

        let raw_count = errors.len();
        let merged = merge_errors(errors);

        info!(raw = raw_count, merged = merged.len(), "资源校验完成");
        merged
    }
}

fn schema_pass<T: EntityRecord>(records: &[T]) -> Vec<ValidationError> {
    records
        .iter()
        .enumerate()
        .flat_map(|(index, record)| validate_entity(record, index))
        .collect()
}

/// 使用默认校验引擎校验三张表
pub fn validate_all(clients: &[Client], workers: &[Worker], tasks: &[Task]) -> Vec<ValidationError> {
    ResourceValidator::new().validate_all(clients, workers, tasks)
}
