// ==========================================
// 三表导入系统 - 导出层
// ==========================================
// 职责: 规范记录 → CSV；业务规则 → rules.json
// ==========================================

pub mod bundle;
pub mod table;

use std::path::PathBuf;
use thiserror::Error;

pub use bundle::{build_rules_config, export_all, ExportSummary};
pub use table::write_table_csv;

/// 导出错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<std::io::Error> for ExportError {
    fn from(source: std::io::Error) -> Self {
        ExportError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

pub type ExportResult<T> = Result<T, ExportError>;
