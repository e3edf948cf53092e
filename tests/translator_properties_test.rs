//! Properties of the validators and the document/row translator

use firm_rules_mcp::rules::{
    RuleDocument, RuleIndex, document_to_rows, rows_to_document, validate_case_rating,
    validate_case_rating_format,
};
use firm_rules_mcp::{Rule, RuleEntry};
use serde_json::json;

fn build_document(rules: &[(&str, &str, &str, &str)]) -> RuleDocument {
    let mut index = RuleIndex::new();
    for (action, case_type, rating, state) in rules {
        index.push_rule(&Rule::new(*action, *case_type, *rating, *state));
    }
    RuleDocument::new(index)
}

#[test]
fn test_round_trip_over_varied_documents() {
    let documents = vec![
        build_document(&[]),
        build_document(&[("1001", "Auto", "1-3", "CA")]),
        build_document(&[
            ("1", "Auto", "1", "NY"),
            ("2", "Home", "2-5", "CA"),
            ("3", "Life", "3", "NY"),
            ("Assign handling firm 'Acme' west", "Auto", "4", "WA"),
            ("4", "Auto", "5", "CA"),
        ]),
    ];

    for document in documents {
        let rows = document_to_rows(&document);
        assert_eq!(rows.len(), document.rules.rule_count());
        assert_eq!(rows_to_document(&rows), document);
    }
}

#[test]
fn test_every_entry_sits_under_its_own_state() {
    let rows = vec![
        Rule::new("1", "Auto", "1", "NY"),
        Rule::new("2", "Auto", "2", "CA"),
        Rule::new("3", "Auto", "3", "NY"),
    ];
    let document = rows_to_document(&rows);
    for (state, entries) in document.rules.iter() {
        assert!(entries.iter().all(|e: &RuleEntry| e.condition.case_state == state));
    }
}

#[test]
fn test_validators_agree_except_on_leading_zero_singles() {
    let candidates = [
        "1", "2", "3", "4", "5", "0", "6", "01", "05", "1-5", "2-2", "5-1", "0-3", "1-05", "--1",
        "1--2", "a-2", "1-2-3", "", "-", "1-", "-1", "x",
    ];
    for text in candidates {
        let strict = validate_case_rating(&json!(text));
        let bulk = validate_case_rating_format(Some(&json!(text)));
        if text.starts_with('0') && !text.contains('-') && text != "0" {
            assert!(!strict && bulk, "{text}: strict={strict} bulk={bulk}");
        } else {
            assert_eq!(strict, bulk, "{text}");
        }
    }
}
