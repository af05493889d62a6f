// ==========================================
// 三表导入系统 - 规则配置文档
// ==========================================
// 职责: 导出用 rules.json 文档结构
// 结构: {metadata, businessRules, prioritizationWeights, globalSettings}
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use uuid::Uuid;

// ==========================================
// BusinessRuleType - 业务规则类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BusinessRuleType {
    CoRun,           // 任务同跑
    SlotRestriction, // 分组最少公共阶段
    LoadLimit,       // 分组负载上限
    PhaseWindow,     // 任务阶段窗口
    PatternMatch,    // 正则模板规则
}

impl BusinessRuleType {
    /// 新建规则时的默认配置
    pub fn default_config(&self) -> Value {
        match self {
            BusinessRuleType::CoRun => json!({ "tasks": [] }),
            BusinessRuleType::SlotRestriction => json!({ "group": "", "minSlots": 1 }),
            BusinessRuleType::LoadLimit => json!({ "group": "", "maxLoad": 1 }),
            BusinessRuleType::PhaseWindow => json!({ "task": "", "allowedPhases": [] }),
            BusinessRuleType::PatternMatch => json!({ "regex": "", "template": "" }),
        }
    }
}

impl fmt::Display for BusinessRuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusinessRuleType::CoRun => write!(f, "coRun"),
            BusinessRuleType::SlotRestriction => write!(f, "slotRestriction"),
            BusinessRuleType::LoadLimit => write!(f, "loadLimit"),
            BusinessRuleType::PhaseWindow => write!(f, "phaseWindow"),
            BusinessRuleType::PatternMatch => write!(f, "patternMatch"),
        }
    }
}

// ==========================================
// BusinessRule - 业务规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRule {
    pub id: String,
    #[serde(rename = "type")]
    pub rule_type: BusinessRuleType,
    pub description: String,
    pub config: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl BusinessRule {
    /// 创建规则（id 为 UUID v4）
    pub fn new(rule_type: BusinessRuleType, description: impl Into<String>, config: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            rule_type,
            description: description.into(),
            config,
            priority: None,
        }
    }

    /// 以类型默认配置创建规则
    pub fn with_default_config(rule_type: BusinessRuleType, description: impl Into<String>) -> Self {
        Self::new(rule_type, description, rule_type.default_config())
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }
}

// ==========================================
// PriorityWeights - 优先级权重
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityWeights {
    pub client_priority: f64,
    pub worker_fairness: f64,
    pub task_urgency: f64,
    pub resource_utilization: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            client_priority: 1.0,
            worker_fairness: 1.0,
            task_urgency: 1.0,
            resource_utilization: 1.0,
        }
    }
}

// ==========================================
// GlobalSettings - 全局设置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    pub allow_overrides: bool,
    pub strict_validation: bool,
    pub optimization_goal: String, // balanced / speed / fairness 等
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            allow_overrides: true,
            strict_validation: true,
            optimization_goal: "balanced".to_string(),
        }
    }
}

// ==========================================
// RulesMetadata - 文档元信息
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesMetadata {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub client_count: usize,
    pub worker_count: usize,
    pub task_count: usize,
    pub validation_error_count: usize,
}

// ==========================================
// RulesConfig - rules.json 文档
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesConfig {
    pub metadata: RulesMetadata,
    #[serde(default)]
    pub business_rules: Vec<BusinessRule>,
    #[serde(default)]
    pub prioritization_weights: PriorityWeights,
    #[serde(default)]
    pub global_settings: GlobalSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_rule_type_serde() {
        let json = serde_json::to_string(&BusinessRuleType::SlotRestriction).unwrap();
        assert_eq!(json, "\"slotRestriction\"");
        assert_eq!(BusinessRuleType::CoRun.to_string(), "coRun");
    }

    #[test]
    fn test_business_rule_default_config() {
        let rule = BusinessRule::with_default_config(BusinessRuleType::PhaseWindow, "T1 早期执行")
            .with_priority(2);

        assert!(Uuid::parse_str(&rule.id).is_ok());
        assert_eq!(rule.config["allowedPhases"], json!([]));

        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(value["type"], json!("phaseWindow"));
        assert_eq!(value["priority"], json!(2));
    }

    #[test]
    fn test_global_settings_default() {
        let settings = GlobalSettings::default();
        assert!(settings.allow_overrides);
        assert_eq!(settings.optimization_goal, "balanced");
    }
}
