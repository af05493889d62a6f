// ==========================================
// 三表导入系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 行号为 1 起（与表格行一致），RowRejection.index 为 0 起
// ==========================================

use crate::domain::validation::FieldIssue;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 行结构错误（transform_rows）=====
    #[error("Row {row}: expected an object, received {received}")]
    RowNotObject { row: usize, received: String },

    #[error("Row {row}: {}", join_issues(.issues))]
    InputShape { row: usize, issues: Vec<FieldIssue> },

    #[error("Row {row}: canonical check failed: {}", join_issues(.issues))]
    CanonicalShape { row: usize, issues: Vec<FieldIssue> },

    #[error("Row {row}: record decoding failed: {message}")]
    RecordDecode { row: usize, message: String },

    // ===== 粗粒度校验错误（validate_and_clean）=====
    #[error("Missing required {id_field} or {name_field}")]
    MissingIdentity {
        id_field: &'static str,
        name_field: &'static str,
    },

    #[error("Invalid JSON format in {field}")]
    InvalidJson { field: &'static str },

    #[error("{field} must be an array")]
    NotAnArray { field: &'static str },

    #[error("{field} must contain only valid numbers")]
    InvalidNumbers { field: &'static str },

    // ===== 通用错误 =====
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 字段问题拼接为可读文本（"字段: 描述; 字段: 描述"）
pub fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|issue| {
            if issue.path.is_empty() {
                issue.message.clone()
            } else {
                format!("{}: {}", issue.path, issue.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_shape_message() {
        let err = ImportError::InputShape {
            row: 3,
            issues: vec![
                FieldIssue::new("ClientID", "Client ID is required"),
                FieldIssue::new("PriorityLevel", "Priority must be between 1-5"),
            ],
        };

        assert_eq!(
            err.to_string(),
            "Row 3: ClientID: Client ID is required; PriorityLevel: Priority must be between 1-5"
        );
    }

    #[test]
    fn test_missing_identity_message() {
        let err = ImportError::MissingIdentity {
            id_field: "ClientID",
            name_field: "ClientName",
        };
        assert_eq!(err.to_string(), "Missing required ClientID or ClientName");
    }
}
