// ==========================================
// 三表导入系统 - 表头映射
// ==========================================
// 内置实现: 折叠拼写匹配（忽略大小写 / 空格 / 下划线 / 连字符）+ 配置别名
// 降级: 映射器失败时原样透传行
// ==========================================

use crate::domain::types::EntityKind;
use crate::importer::collaborator_trait::{CollaboratorResult, HeaderMapper, HeaderMapping};
use crate::importer::field_mapper::{accepted_spellings, is_blank};
use crate::importer::schema::EntitySchema;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, instrument, warn};

// ==========================================
// AliasHeaderMapper - 别名表头映射器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct AliasHeaderMapper {
    // 逻辑字段 → 额外别名
    aliases: HashMap<String, Vec<String>>,
}

impl AliasHeaderMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aliases(aliases: HashMap<String, Vec<String>>) -> Self {
        Self { aliases }
    }

    fn matches(&self, folded_header: &str, expected: &str) -> bool {
        if fold(expected) == folded_header {
            return true;
        }
        self.aliases
            .get(expected)
            .is_some_and(|aliases| aliases.iter().any(|a| fold(a) == folded_header))
    }
}

impl HeaderMapper for AliasHeaderMapper {
    fn map_headers(
        &self,
        raw_headers: &[String],
        expected_headers: &[&str],
    ) -> CollaboratorResult<HeaderMapping> {
        let mut mapping = HeaderMapping::new();

        for raw in raw_headers {
            let folded = fold(raw);
            let target = expected_headers
                .iter()
                .find(|expected| self.matches(&folded, expected))
                .map(|expected| expected.to_string());
            mapping.insert(raw.clone(), target);
        }

        Ok(mapping)
    }
}

/// 折叠拼写: 小写，去掉空白 / 下划线 / 连字符
fn fold(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

// ==========================================
// 映射应用
// ==========================================

/// 按映射重命名行内列名
///
/// - 未映射 / 映射为 None 的列保留原名
/// - 多列映射到同一字段时，按 (非空优先, 拼写优先级, 列序) 选出一列占用该字段；
///   与字段同名的列拼写优先级最高，其余列保留原名
/// - 非对象行原样保留（由 transform_rows 拒绝）
pub fn apply_header_mapping(rows: &[Value], mapping: &HeaderMapping) -> Vec<Value> {
    rows.iter()
        .map(|row| match row {
            Value::Object(obj) => Value::Object(rename_keys(obj, mapping)),
            other => other.clone(),
        })
        .collect()
}

/// 排序键: 空白单元格排后，其次按可接受拼写位置（别名 / 非标准拼写最后），最后按列序
type CandidateRank = (bool, usize, usize);

fn rename_keys(row: &Map<String, Value>, mapping: &HeaderMapping) -> Map<String, Value> {
    let mut winners: BTreeMap<&str, (&str, CandidateRank)> = BTreeMap::new();

    for (index, (key, value)) in row.iter().enumerate() {
        let Some(Some(target)) = mapping.get(key) else {
            continue;
        };
        let rank = (is_blank(value), spelling_rank(key, target), index);
        let better = winners
            .get(target.as_str())
            .map_or(true, |(_, best)| rank < *best);
        if better {
            winners.insert(target.as_str(), (key.as_str(), rank));
        }
    }

    let mut out = Map::new();
    for (target, (key, _)) in &winners {
        if let Some(value) = row.get(*key) {
            out.insert(target.to_string(), value.clone());
        }
    }

    // 落选列保留原名；与已占用字段同名的落选列只可能是空白单元格
    for (key, value) in row {
        let won = match mapping.get(key) {
            Some(Some(target)) => winners
                .get(target.as_str())
                .is_some_and(|(winner, _)| *winner == key.as_str()),
            _ => false,
        };
        if !won && !out.contains_key(key) {
            out.insert(key.clone(), value.clone());
        }
    }

    out
}

fn spelling_rank(raw: &str, target: &str) -> usize {
    if raw == target {
        return 0;
    }
    accepted_spellings(target)
        .iter()
        .position(|spelling| spelling == raw.trim())
        .unwrap_or(usize::MAX)
}

/// 所有对象行的表头（首次出现顺序）
pub fn collect_headers(rows: &[Value]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(Value::as_object)
        .flat_map(|obj| obj.keys())
        .filter(|key| seen.insert(key.as_str()))
        .cloned()
        .collect()
}

/// 调用映射器并应用映射；映射器失败时原样透传
#[instrument(skip(mapper, rows), fields(entity = %kind, rows = rows.len()))]
pub fn remap_or_passthrough(
    mapper: &dyn HeaderMapper,
    rows: &[Value],
    kind: EntityKind,
) -> Vec<Value> {
    let headers = collect_headers(rows);
    let expected = EntitySchema::for_kind(kind).field_names();

    match mapper.map_headers(&headers, &expected) {
        Ok(mapping) => {
            let mapped = mapping.values().filter(|t| t.is_some()).count();
            debug!(headers = headers.len(), mapped, "表头映射完成");
            apply_header_mapping(rows, &mapping)
        }
        Err(e) => {
            warn!(error = %e, "表头映射失败，行数据原样透传");
            rows.to_vec()
        }
    }
}
