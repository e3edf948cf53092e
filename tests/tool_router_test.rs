//! Tool calls routed through the MCP layer

use firm_rules_mcp::config::ServiceConfig;
use firm_rules_mcp::firm_rules_service::FirmRulesService;
use firm_rules_mcp::tool_router::ToolRouter;
use rmcp::model::{CallToolRequestParam, ErrorCode};
use serde_json::{Map, Value, json};
use std::fs;
use tempfile::TempDir;

fn setup_service(temp_dir: &TempDir) -> FirmRulesService {
    let config = ServiceConfig::in_directory(temp_dir.path());
    fs::write(
        config.document_path(),
        r#"{"rules": {"CA": [{"action": "1001", "condition": {"case_type": "Auto", "case_rating": "1-3", "case_state": "CA"}}]}}"#,
    )
    .unwrap();
    let service = FirmRulesService::with_config(config).unwrap();
    service.rule_service().ensure_stores().unwrap();
    service
}

fn request(name: &'static str, arguments: Value) -> CallToolRequestParam {
    let arguments: Map<String, Value> = match arguments {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    CallToolRequestParam {
        name: name.into(),
        arguments: Some(arguments),
    }
}

#[tokio::test]
async fn test_list_states_tool() {
    let temp_dir = TempDir::new().unwrap();
    let service = setup_service(&temp_dir);

    let result = ToolRouter::route_tool_call(&service, request("list_states", json!({})))
        .await
        .unwrap();
    assert_eq!(result.content.len(), 2);
    assert_ne!(result.is_error, Some(true));
}

#[tokio::test]
async fn test_add_rule_tool_reports_invalid_rating_without_error() {
    let temp_dir = TempDir::new().unwrap();
    let service = setup_service(&temp_dir);

    let result = ToolRouter::route_tool_call(
        &service,
        request(
            "add_rule",
            json!({ "new_rule": { "action": "1002", "case_type": "Auto", "case_rating": "0", "case_state": "CA" } }),
        ),
    )
    .await
    .unwrap();
    assert_ne!(result.is_error, Some(true));

    let rows = service.rule_service().tabular().read_rows().unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_add_rule_tool_accepts_numeric_rating_text() {
    let temp_dir = TempDir::new().unwrap();
    let service = setup_service(&temp_dir);

    ToolRouter::route_tool_call(
        &service,
        request(
            "add_rule",
            json!({ "new_rule": { "action": "1002", "case_type": "Home", "case_rating": "4", "case_state": "NY" } }),
        ),
    )
    .await
    .unwrap();

    let rows = service.rule_service().tabular().read_rows().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].case_state, "NY");
}

#[tokio::test]
async fn test_update_rules_tool_maps_invalid_rating_to_invalid_params() {
    let temp_dir = TempDir::new().unwrap();
    let service = setup_service(&temp_dir);

    let fetched = service
        .rule_service()
        .get_rules(firm_rules_mcp::GetRulesParam {
            state: "NY".to_string(),
        })
        .await
        .unwrap();

    let err = ToolRouter::route_tool_call(
        &service,
        request(
            "update_rules",
            json!({
                "session_id": fetched.session_id,
                "updated_rules": [
                    { "action": "2002", "case_type": "Home", "case_rating": "6", "case_state": "NY" }
                ]
            }),
        ),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
}

#[tokio::test]
async fn test_storage_failure_maps_to_internal_error_with_body() {
    let temp_dir = TempDir::new().unwrap();
    let service = setup_service(&temp_dir);
    fs::remove_file(service.rule_service().document().path()).unwrap();

    let err = ToolRouter::route_tool_call(
        &service,
        request(
            "add_rule",
            json!({ "new_rule": { "action": "1002", "case_type": "Home", "case_rating": "4", "case_state": "NY" } }),
        ),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    assert_eq!(
        err.data,
        Some(json!({ "error": "An error occurred while adding a new rule. Please try again later." }))
    );
}

#[tokio::test]
async fn test_remove_rule_tool_requires_full_rule() {
    let temp_dir = TempDir::new().unwrap();
    let service = setup_service(&temp_dir);

    let err = ToolRouter::route_tool_call(
        &service,
        request("remove_rule", json!({ "rule_to_remove": { "action": "1001" } })),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

    ToolRouter::route_tool_call(
        &service,
        request(
            "remove_rule",
            json!({ "rule_to_remove": { "action": "1001", "case_type": "Auto", "case_rating": "1-3", "case_state": "CA" } }),
        ),
    )
    .await
    .unwrap();
    assert!(service.rule_service().tabular().read_rows().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_tool_is_method_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let service = setup_service(&temp_dir);

    let err = ToolRouter::route_tool_call(&service, request("search", json!({})))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::METHOD_NOT_FOUND);
}
