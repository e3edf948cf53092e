//! # Translator
//!
//! Converts between the flat row list and the state-grouped document. These
//! two functions are what keeps the stores derivable from one another.

use super::document::{RuleDocument, RuleIndex};
use super::types::{Condition, Rule, RuleEntry};

/// Flatten the document: states in key order, rules in list order.
pub fn document_to_rows(document: &RuleDocument) -> Vec<Rule> {
    document
        .rules
        .iter()
        .flat_map(|(_, entries)| entries.iter().map(RuleEntry::to_rule))
        .collect()
}

/// Group rows by `case_state` in first-seen order.
pub fn rows_to_document(rows: &[Rule]) -> RuleDocument {
    let mut index = RuleIndex::new();
    for row in rows {
        let entry = RuleEntry {
            action: row.action.clone(),
            condition: Condition {
                case_type: row.case_type.clone(),
                case_rating: rating_value(&row.case_rating).to_string(),
                case_state: row.case_state.clone(),
            },
        };
        index.push(&row.case_state, entry);
    }
    RuleDocument::new(index)
}

/// Last whitespace-separated token of a rating column, e.g. `"Rating 2-4"` -> `"2-4"`.
///
/// Blank text has no token and is returned unchanged.
pub fn rating_value(text: &str) -> &str {
    text.split_whitespace().next_back().unwrap_or(text)
}
