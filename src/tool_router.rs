//! # Tool Router Module
//!
//! Handles routing of MCP tool calls to the rule service, one tool per
//! rule-base operation.

use crate::firm_rules_service::FirmRulesService;
use crate::response_formatter::ResponseFormatter;
use crate::rules::*;

use rmcp::model::{CallToolRequestParam, CallToolResult, ErrorData};
use serde::de::DeserializeOwned;
use std::borrow::Cow;

/// Routes tool calls to appropriate service methods
pub struct ToolRouter;

impl ToolRouter {
    /// Helper function to parse request parameters
    fn parse_params<T: DeserializeOwned>(request: &CallToolRequestParam) -> Result<T, ErrorData> {
        serde_json::from_value(serde_json::Value::Object(
            request.arguments.clone().unwrap_or_default(),
        ))
        .map_err(|e| ErrorData::invalid_params(Cow::Owned(e.to_string()), None))
    }

    /// Helper function to create formatted response
    fn create_formatted_response<T: serde::Serialize>(
        result: &T,
        summary: String,
    ) -> Result<CallToolResult, ErrorData> {
        ResponseFormatter::create_formatted_response(result, summary)
            .map_err(|e| ErrorData::internal_error(Cow::Owned(e.to_string()), None))
    }

    /// Route a tool call to the appropriate service method
    pub async fn route_tool_call(
        service: &FirmRulesService,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ErrorData> {
        match request.name.as_ref() {
            "list_states" => Self::handle_list_states(service).await,
            "get_rules" => Self::handle_get_rules(service, request).await,
            "add_rule" => Self::handle_add_rule(service, request).await,
            "remove_rule" => Self::handle_remove_rule(service, request).await,
            "update_rules" => Self::handle_update_rules(service, request).await,
            "resync" => Self::handle_resync(service).await,

            _ => Err(ErrorData::method_not_found::<
                rmcp::model::CallToolRequestMethod,
            >()),
        }
    }

    async fn handle_list_states(service: &FirmRulesService) -> Result<CallToolResult, ErrorData> {
        let result = service
            .rule_service()
            .list_states()
            .await
            .map_err(ErrorData::from)?;
        let summary = ResponseFormatter::format_list_states_result(&result);
        Self::create_formatted_response(&result, summary)
    }

    async fn handle_get_rules(
        service: &FirmRulesService,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ErrorData> {
        let param: GetRulesParam = Self::parse_params(&request)?;
        let state = param.state.clone();
        let result = service
            .rule_service()
            .get_rules(param)
            .await
            .map_err(ErrorData::from)?;
        let summary = ResponseFormatter::format_get_rules_result(&state, &result);
        Self::create_formatted_response(&result, summary)
    }

    async fn handle_add_rule(
        service: &FirmRulesService,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ErrorData> {
        let param: AddRuleParam = Self::parse_params(&request)?;
        // A rejected rating is still a successful call carrying the rejection text.
        let result = service
            .rule_service()
            .add_rule(param)
            .await
            .map_err(ErrorData::from)?;
        let summary = ResponseFormatter::format_add_rule_result(&result);
        Self::create_formatted_response(&result, summary)
    }

    async fn handle_remove_rule(
        service: &FirmRulesService,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ErrorData> {
        let param: RemoveRuleParam = Self::parse_params(&request)?;
        let result = service
            .rule_service()
            .remove_rule(param)
            .await
            .map_err(ErrorData::from)?;
        let summary = ResponseFormatter::format_remove_rule_result(&result);
        Self::create_formatted_response(&result, summary)
    }

    async fn handle_update_rules(
        service: &FirmRulesService,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ErrorData> {
        let param: UpdateRulesParam = Self::parse_params(&request)?;
        let result = service
            .rule_service()
            .update_rules(param)
            .await
            .map_err(ErrorData::from)?;
        let summary = ResponseFormatter::format_update_rules_result(&result);
        Self::create_formatted_response(&result, summary)
    }

    async fn handle_resync(service: &FirmRulesService) -> Result<CallToolResult, ErrorData> {
        let result = service
            .rule_service()
            .resync()
            .await
            .map_err(ErrorData::from)?;
        let summary = ResponseFormatter::format_resync_result(&result);
        Self::create_formatted_response(&result, summary)
    }
}
