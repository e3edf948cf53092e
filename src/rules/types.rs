use serde::{Deserialize, Serialize};
use serde_json::Value;

// Rule entity types

/// A routing rule as stored in the tabular store.
///
/// Rules have no surrogate key: two rules are the same rule iff all four
/// fields are equal, which is what removal matches on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub action: String,
    pub case_type: String,
    pub case_rating: String,
    pub case_state: String,
}

impl Rule {
    pub fn new(
        action: impl Into<String>,
        case_type: impl Into<String>,
        case_rating: impl Into<String>,
        case_state: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            case_type: case_type.into(),
            case_rating: case_rating.into(),
            case_state: case_state.into(),
        }
    }

    pub fn condition(&self) -> Condition {
        Condition {
            case_type: self.case_type.clone(),
            case_rating: self.case_rating.clone(),
            case_state: self.case_state.clone(),
        }
    }
}

/// Condition half of a rule, as nested in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub case_type: String,
    pub case_rating: String,
    pub case_state: String,
}

/// One entry of a state's rule list in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub action: String,
    pub condition: Condition,
}

impl RuleEntry {
    pub fn to_rule(&self) -> Rule {
        Rule {
            action: self.action.clone(),
            case_type: self.condition.case_type.clone(),
            case_rating: self.condition.case_rating.clone(),
            case_state: self.condition.case_state.clone(),
        }
    }
}

impl From<&Rule> for RuleEntry {
    fn from(rule: &Rule) -> Self {
        RuleEntry {
            action: rule.action.clone(),
            condition: rule.condition(),
        }
    }
}

/// A rule as submitted by a client, before validation.
///
/// `case_rating` is kept as raw JSON so that non-string ratings reach the
/// validator and get rejected there instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSubmission {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub case_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_rating: Option<Value>,
    #[serde(default)]
    pub case_state: String,
}

impl RuleSubmission {
    /// The rule this submission describes, if its rating is a string.
    pub fn to_rule(&self) -> Option<Rule> {
        match &self.case_rating {
            Some(Value::String(rating)) => Some(Rule {
                action: self.action.clone(),
                case_type: self.case_type.clone(),
                case_rating: rating.clone(),
                case_state: self.case_state.clone(),
            }),
            _ => None,
        }
    }
}

impl From<Rule> for RuleSubmission {
    fn from(rule: Rule) -> Self {
        RuleSubmission {
            action: rule.action,
            case_type: rule.case_type,
            case_rating: Some(Value::String(rule.case_rating)),
            case_state: rule.case_state,
        }
    }
}

// Rule operation parameters and results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListStatesParam {}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListStatesResult {
    pub states: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRulesParam {
    pub state: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetRulesResult {
    pub rules: Vec<Rule>,
    /// Token to pass back to `update_rules` for this edit.
    pub session_id: String,
    /// Number of rules from other states held aside for re-insertion.
    pub held_aside: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRuleParam {
    pub new_rule: RuleSubmission,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddRuleResult {
    pub accepted: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveRuleParam {
    pub rule_to_remove: Rule,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveRuleResult {
    pub removed: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRulesParam {
    pub session_id: String,
    pub updated_rules: Vec<RuleSubmission>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateRulesResult {
    pub message: String,
    /// States named in the message, in first-seen order.
    pub states: Vec<String>,
    pub rules_written: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResyncParam {}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResyncResult {
    pub rules_written: usize,
    pub states: usize,
}
