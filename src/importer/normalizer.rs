// ==========================================
// 三表导入系统 - 单元格规范化器
// ==========================================
// 职责: 原始单元格值 → 规范类型（字符串列表 / 阶段列表 / JSON 对象 / 整数）
// 红线: 全函数,不 panic,不返回"空"之外的失败
// ==========================================

use serde_json::{Map, Value};
use std::collections::HashSet;

/// 单个区间 token 允许展开的最大整数个数（超出则整体丢弃）
pub const MAX_RANGE_SPAN: i64 = 10_000;

/// 数值标量缺失/无法解析时的默认值
pub const DEFAULT_INTEGER: i64 = 1;

// ==========================================
// 逗号分隔字符串列表
// ==========================================

/// 规范化为字符串列表
///
/// - 数组: 逐项 TRIM，丢弃空项（数字/布尔转字符串，null/嵌套值丢弃）
/// - 字符串: 按逗号拆分，TRIM，丢弃空项
/// - 其他: 空列表
pub fn normalize_delimited_string_list(raw: &Value) -> Vec<String> {
    match raw {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => split_comma_list(s),
        _ => Vec::new(),
    }
}

/// 集合字段去重，保留首次出现顺序
pub fn dedup_first_seen(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn split_comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

// ==========================================
// 阶段列表（支持区间展开）
// ==========================================

/// 规范化为去重升序的整数列表
///
/// # 支持的输入
/// - 数字: 单元素列表（仅整数值）
/// - 数组: 逐项递归后拼接
/// - 字符串: `"1-3,5"` / `"[2-4]"` / `"2, 3"`
/// - `{ "message": ... }`: 上游解析失败的兜底文本，递归处理 message
/// - 其他: 空列表
pub fn normalize_numeric_range_list(raw: &Value) -> Vec<i64> {
    let mut phases = collect_phases(raw);
    phases.sort_unstable();
    phases.dedup();
    phases
}

fn collect_phases(raw: &Value) -> Vec<i64> {
    match raw {
        Value::Number(_) => integral_number(raw).into_iter().collect(),
        Value::Array(items) => items.iter().flat_map(collect_phases).collect(),
        Value::String(s) => expand_range_text(s),
        Value::Object(obj) => match obj.get("message") {
            Some(message) => collect_phases(message),
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// JSON 数字 → i64（非整数值/越界返回 None）
pub(crate) fn integral_number(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn expand_range_text(value: &str) -> Vec<i64> {
    let mut text = value.trim();
    if text.len() >= 2 && text.starts_with('[') && text.ends_with(']') {
        text = text[1..text.len() - 1].trim();
    }

    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .flat_map(expand_token)
        .collect()
}

/// 单个 token: `<int>-<int>` 展开为闭区间，否则严格按整数解析
fn expand_token(token: &str) -> Vec<i64> {
    if let Some((start, end)) = parse_range(token) {
        if start <= end {
            if end - start >= MAX_RANGE_SPAN {
                return Vec::new();
            }
            return (start..=end).collect();
        }
    }

    token.parse::<i64>().map(|n| vec![n]).unwrap_or_default()
}

/// 匹配 `^\d+\s*-\s*\d+$`
fn parse_range(token: &str) -> Option<(i64, i64)> {
    let (left, right) = token.split_once('-')?;
    let (left, right) = (left.trim(), right.trim());
    if !is_digits(left) || !is_digits(right) {
        return None;
    }
    Some((left.parse().ok()?, right.parse().ok()?))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

// ==========================================
// JSON 对象
// ==========================================

/// 规范化为 JSON 对象
///
/// - 对象: 原样返回
/// - 字符串: 严格 JSON 解析；失败或非对象时保留原文 `{ "message": raw }`
/// - 其他: `{ "message": <文本形式> }`
pub fn normalize_json_object(raw: &Value) -> Map<String, Value> {
    match raw {
        Value::Object(obj) => obj.clone(),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(obj)) => obj,
            _ => message_object(s.clone()),
        },
        Value::Null => message_object("null".to_string()),
        Value::Bool(b) => message_object(b.to_string()),
        Value::Number(n) => message_object(n.to_string()),
        Value::Array(_) => message_object(raw.to_string()),
    }
}

fn message_object(message: String) -> Map<String, Value> {
    let mut obj = Map::new();
    obj.insert("message".to_string(), Value::String(message));
    obj
}

// ==========================================
// 数值标量
// ==========================================

/// 整数解析（前导整数语义：`"3 phases"` → 3，`2.7` → 2），失败时返回默认值
pub fn normalize_integer_or(raw: &Value, default: i64) -> i64 {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                    .map(|f| f.trunc() as i64)
            })
            .unwrap_or(default),
        Value::String(s) => parse_leading_integer(s).unwrap_or(default),
        _ => default,
    }
}

fn parse_leading_integer(value: &str) -> Option<i64> {
    let text = value.trim();
    let (sign, digits) = match text.as_bytes().first() {
        Some(b'-') => (-1, &text[1..]),
        Some(b'+') => (1, &text[1..]),
        _ => (1, text),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    digits[..end].parse::<i64>().ok().map(|n| n * sign)
}
