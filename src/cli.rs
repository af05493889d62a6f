// ==========================================
// 三表导入系统 - 命令行
// ==========================================
// 子命令: check（读取原始行 JSON → 表头映射 → 转换 → 校验 → 报告 / 导出）
// 输入文件: 表格解码协作者的输出，即原始行对象数组
// ==========================================

use crate::config::IngestConfig;
use crate::domain::entity::{Client, EntityRecord, Task, Worker};
use crate::domain::rules::BusinessRule;
use crate::domain::validation::{RowRejection, ValidationError};
use crate::engine::validate_all;
use crate::export::{build_rules_config, export_all, ExportError, ExportSummary};
use crate::importer::header_mapper::{remap_or_passthrough, AliasHeaderMapper};
use crate::importer::{FieldMapper, RowTransformer};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Normalize and cross-check client / worker / task spreadsheet rows
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Transform and validate raw rows, then print a report
    Check(CheckArgs),
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// JSON file with an array of raw client rows
    #[arg(long)]
    pub clients: Option<PathBuf>,

    /// JSON file with an array of raw worker rows
    #[arg(long)]
    pub workers: Option<PathBuf>,

    /// JSON file with an array of raw task rows
    #[arg(long)]
    pub tasks: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Write clients.csv / workers.csv / tasks.csv / rules.json into this directory
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// JSON file with an array of business rules to include in rules.json
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Exit with a failure status when any row is rejected or any finding is reported
    #[arg(long)]
    pub fail_on_findings: bool,
}

// ==========================================
// CliError - 命令行错误
// ==========================================
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} must contain a JSON array")]
    NotAnArray { path: PathBuf },

    #[error(transparent)]
    Export(#[from] ExportError),
}

// ==========================================
// CheckReport - 检查报告
// ==========================================
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReport {
    pub total_rows: usize,
    pub accepted: usize,
    pub rejected: Vec<RowRejection>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub clients: TableReport,
    pub workers: TableReport,
    pub tasks: TableReport,
    pub findings: Vec<ValidationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported: Option<Vec<PathBuf>>,
}

impl CheckReport {
    pub fn has_problems(&self) -> bool {
        !self.findings.is_empty()
            || [&self.clients, &self.workers, &self.tasks]
                .iter()
                .any(|t| !t.rejected.is_empty())
    }
}

/// 执行 check 子命令（不负责打印）
pub fn run_check(args: &CheckArgs, config: &IngestConfig) -> Result<CheckReport, CliError> {
    let mapper = AliasHeaderMapper::with_aliases(config.header_aliases.clone());
    let transformer = RowTransformer::new(FieldMapper::with_aliases(config.header_aliases.clone()));

    let (clients, clients_report) = load_table::<Client>(args.clients.as_deref(), &mapper, &transformer)?;
    let (workers, workers_report) = load_table::<Worker>(args.workers.as_deref(), &mapper, &transformer)?;
    let (tasks, tasks_report) = load_table::<Task>(args.tasks.as_deref(), &mapper, &transformer)?;

    let findings = validate_all(&clients, &workers, &tasks);

    let exported = match &args.export {
        Some(dir) => {
            let business_rules: Vec<BusinessRule> = match &args.rules {
                Some(path) => read_json(path)?,
                None => Vec::new(),
            };
            let rules = build_rules_config(&clients, &workers, &tasks, &findings, business_rules);
            let ExportSummary { files } =
                export_all(dir, &clients, &workers, &tasks, &rules, config.pretty_output)?;
            Some(files)
        }
        None => None,
    };

    info!(findings = findings.len(), "检查完成");

    Ok(CheckReport {
        clients: clients_report,
        workers: workers_report,
        tasks: tasks_report,
        findings,
        exported,
    })
}

fn load_table<T: EntityRecord>(
    path: Option<&Path>,
    mapper: &AliasHeaderMapper,
    transformer: &RowTransformer,
) -> Result<(Vec<T>, TableReport), CliError> {
    let rows = match path {
        Some(path) => read_rows(path)?,
        None => Vec::new(),
    };

    let rows = remap_or_passthrough(mapper, &rows, T::KIND);
    let outcome = transformer.transform_rows::<T>(&rows);
    let report = TableReport {
        total_rows: outcome.total_rows(),
        accepted: outcome.accepted.len(),
        rejected: outcome.rejected.clone(),
    };

    Ok((outcome.accepted.into_iter().map(|a| a.record).collect(), report))
}

fn read_rows(path: &Path) -> Result<Vec<Value>, CliError> {
    match read_json::<Value>(path)? {
        Value::Array(rows) => Ok(rows),
        _ => Err(CliError::NotAnArray {
            path: path.to_path_buf(),
        }),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ==========================================
// 报告渲染
// ==========================================

pub fn render_text(report: &CheckReport) -> String {
    let mut out = String::new();

    for (label, table) in [
        ("clients", &report.clients),
        ("workers", &report.workers),
        ("tasks", &report.tasks),
    ] {
        let _ = writeln!(
            out,
            "{}: {} rows, {} accepted, {} rejected",
            label,
            table.total_rows,
            table.accepted,
            table.rejected.len()
        );
        for rejection in &table.rejected {
            let _ = writeln!(out, "  row {}: {}", rejection.index, rejection.error);
        }
    }

    if report.findings.is_empty() {
        let _ = writeln!(out, "no validation findings");
    } else {
        let _ = writeln!(out, "{} validation findings:", report.findings.len());
        for finding in &report.findings {
            let _ = writeln!(
                out,
                "  {} row {} {}: {}",
                finding.entity, finding.row_index, finding.field, finding.message
            );
        }
    }

    if let Some(files) = &report.exported {
        for file in files {
            let _ = writeln!(out, "wrote {}", file.display());
        }
    }

    out
}

pub fn render_json(report: &CheckReport, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
}
