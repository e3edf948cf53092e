use crate::rules::types::*;
use rmcp::model::{CallToolResult, Content};

pub struct ResponseFormatter;

impl ResponseFormatter {
    /// Create a formatted response with both JSON data and human-readable text
    pub fn create_formatted_response<T>(
        result: &T,
        summary: String,
    ) -> Result<CallToolResult, Box<dyn std::error::Error + Send + Sync>>
    where
        T: serde::Serialize,
    {
        let json_value = serde_json::to_value(result)?;

        let contents = vec![Content::text(summary), Content::json(json_value)?];

        Ok(CallToolResult::success(contents))
    }

    pub fn format_list_states_result(result: &ListStatesResult) -> String {
        if result.states.is_empty() {
            return "No case states found. The rule table is empty or missing.".to_string();
        }
        format!(
            "{} case states: {}",
            result.states.len(),
            result.states.join(", ")
        )
    }

    pub fn format_get_rules_result(state: &str, result: &GetRulesResult) -> String {
        let mut summary = format!(
            "{} rules for case state {state} ({} rules from other states held aside)\nEdit session: {}\n",
            result.rules.len(),
            result.held_aside,
            result.session_id
        );
        for (index, rule) in result.rules.iter().enumerate() {
            summary.push_str(&format!(
                "{}. [{} | rating {}] {}\n",
                index + 1,
                rule.case_type,
                rule.case_rating,
                rule.action
            ));
        }
        summary
    }

    pub fn format_add_rule_result(result: &AddRuleResult) -> String {
        result.message.clone()
    }

    pub fn format_remove_rule_result(result: &RemoveRuleResult) -> String {
        match result.removed {
            0 => format!("{} (no matching rule was stored)", result.message),
            1 => result.message.clone(),
            n => format!("{} ({n} identical rows removed)", result.message),
        }
    }

    pub fn format_update_rules_result(result: &UpdateRulesResult) -> String {
        result.message.clone()
    }

    pub fn format_resync_result(result: &ResyncResult) -> String {
        format!(
            "Rule table regenerated from the document: {} rules across {} states",
            result.rules_written, result.states
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_summary_mentions_missing_rule() {
        let result = RemoveRuleResult {
            removed: 0,
            message: "Rule removed successfully!".to_string(),
        };
        assert_eq!(
            ResponseFormatter::format_remove_rule_result(&result),
            "Rule removed successfully! (no matching rule was stored)"
        );
    }

    #[test]
    fn get_rules_summary_lists_rules_in_order() {
        let result = GetRulesResult {
            rules: vec![
                Rule::new("1001", "Auto", "1-3", "CA"),
                Rule::new("'Acme'", "Home", "4", "CA"),
            ],
            session_id: "abc".to_string(),
            held_aside: 5,
        };
        let summary = ResponseFormatter::format_get_rules_result("CA", &result);
        assert!(summary.starts_with("2 rules for case state CA (5 rules from other states held aside)"));
        assert!(summary.contains("1. [Auto | rating 1-3] 1001"));
        assert!(summary.contains("2. [Home | rating 4] 'Acme'"));
    }
}
