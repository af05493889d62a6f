// ==========================================
// 三表导入系统 - 导出包
// ==========================================
// 输出: clients.csv / workers.csv / tasks.csv / rules.json
// 说明: 校验发现为建议性，不阻断导出
// ==========================================

use crate::domain::entity::{Client, EntityRecord, Task, Worker};
use crate::domain::rules::{BusinessRule, GlobalSettings, PriorityWeights, RulesConfig, RulesMetadata};
use crate::domain::validation::ValidationError;
use crate::export::table::write_table_csv;
use crate::export::{ExportError, ExportResult};
use chrono::Utc;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

pub const RULES_FILE_NAME: &str = "rules.json";

/// rules.json 文档版本
pub const RULES_VERSION: &str = "1.0";

/// 依据当前快照生成 rules.json 文档
pub fn build_rules_config(
    clients: &[Client],
    workers: &[Worker],
    tasks: &[Task],
    findings: &[ValidationError],
    business_rules: Vec<BusinessRule>,
) -> RulesConfig {
    RulesConfig {
        metadata: RulesMetadata {
            version: RULES_VERSION.to_string(),
            generated_at: Utc::now(),
            client_count: clients.len(),
            worker_count: workers.len(),
            task_count: tasks.len(),
            validation_error_count: findings.len(),
        },
        business_rules,
        prioritization_weights: PriorityWeights::default(),
        global_settings: GlobalSettings::default(),
    }
}

/// 导出结果（写入的文件路径）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub files: Vec<PathBuf>,
}

/// 写出完整导出包
///
/// # 参数
/// - dir: 导出目录（不存在时创建）
/// - pretty: rules.json 是否缩进
#[instrument(skip(clients, workers, tasks, rules), fields(dir = %dir.display()))]
pub fn export_all(
    dir: &Path,
    clients: &[Client],
    workers: &[Worker],
    tasks: &[Task],
    rules: &RulesConfig,
    pretty: bool,
) -> ExportResult<ExportSummary> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let files = vec![
        write_table_file(dir, clients)?,
        write_table_file(dir, workers)?,
        write_table_file(dir, tasks)?,
        write_rules_file(dir, rules, pretty)?,
    ];

    info!(files = files.len(), "导出完成");
    Ok(ExportSummary { files })
}

fn write_table_file<T: EntityRecord>(dir: &Path, records: &[T]) -> ExportResult<PathBuf> {
    let path = dir.join(format!("{}.csv", T::KIND.table_name()));
    let file = create_file(&path)?;
    write_table_csv(records, BufWriter::new(file))?;
    Ok(path)
}

fn write_rules_file(dir: &Path, rules: &RulesConfig, pretty: bool) -> ExportResult<PathBuf> {
    let path = dir.join(RULES_FILE_NAME);
    let writer = BufWriter::new(create_file(&path)?);
    if pretty {
        serde_json::to_writer_pretty(writer, rules)?;
    } else {
        serde_json::to_writer(writer, rules)?;
    }
    Ok(path)
}

fn create_file(path: &Path) -> ExportResult<File> {
    File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::BusinessRuleType;

    #[test]
    fn test_build_rules_config_counts() {
        let rule = BusinessRule::with_default_config(BusinessRuleType::CoRun, "T1 与 T2 同跑");
        let config = build_rules_config(&[], &[], &[], &[], vec![rule]);

        assert_eq!(config.metadata.version, RULES_VERSION);
        assert_eq!(config.metadata.client_count, 0);
        assert_eq!(config.business_rules.len(), 1);
        assert_eq!(config.prioritization_weights, PriorityWeights::default());
    }

    #[test]
    fn test_export_all_writes_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested");
        let rules = build_rules_config(&[], &[], &[], &[], vec![]);

        let summary = export_all(&target, &[], &[], &[], &rules, false).unwrap();
        let names: Vec<String> = summary
            .files
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        assert_eq!(names, vec!["clients.csv", "workers.csv", "tasks.csv", "rules.json"]);

        let tasks_csv = fs::read_to_string(target.join("tasks.csv")).unwrap();
        assert_eq!(
            tasks_csv.trim_end(),
            "TaskID,TaskName,Category,Duration,RequiredSkills,PreferredPhase,MaxConcurrent"
        );

        let rules_json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(target.join("rules.json")).unwrap()).unwrap();
        assert_eq!(rules_json["globalSettings"]["optimizationGoal"], "balanced");
        assert_eq!(rules_json["metadata"]["validationErrorCount"], 0);
    }
}
