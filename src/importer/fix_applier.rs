// ==========================================
// 三表导入系统 - 修复建议应用
// ==========================================
// 流程: 记录 → 原始行 → FixSuggester → transform_rows 复核 → 新记录
// 红线: 原记录不被修改；复核失败或协作者失败均返回 None
// ==========================================

use crate::domain::entity::EntityRecord;
use crate::domain::validation::ValidationError;
use crate::importer::collaborator_trait::FixSuggester;
use crate::importer::transformer::RowTransformer;
use serde_json::Value;
use tracing::{debug, info, warn};

/// 请求修复建议并复核
///
/// # 返回
/// - Some(T): 建议行通过完整转换管道后的规范记录
/// - None: 协作者失败 / 建议行被拒绝
pub fn apply_suggested_fix<T: EntityRecord>(
    suggester: &dyn FixSuggester,
    error: &ValidationError,
    record: &T,
) -> Option<T> {
    let row = match serde_json::to_value(record) {
        Ok(Value::Object(row)) => row,
        Ok(_) => return None,
        Err(e) => {
            warn!(error = %e, "记录序列化失败，跳过修复建议");
            return None;
        }
    };

    let suggested = match suggester.suggest_fix(error, &row, T::KIND) {
        Ok(suggested) => suggested,
        Err(e) => {
            warn!(
                entity = %T::KIND,
                row_index = error.row_index,
                field = %error.field,
                error = %e,
                "修复建议获取失败"
            );
            return None;
        }
    };

    let mut outcome = RowTransformer::default().transform_rows::<T>(&[Value::Object(suggested)]);
    match outcome.accepted.pop() {
        Some(accepted) => {
            info!(
                entity = %T::KIND,
                row_index = error.row_index,
                field = %error.field,
                "修复建议已通过复核"
            );
            Some(accepted.record)
        }
        None => {
            debug!(
                rejections = ?outcome.rejected,
                "修复建议未通过复核，已丢弃"
            );
            None
        }
    }
}
