use crate::config::ServiceConfig;
use crate::errors::ServiceError;
use crate::rules::RuleService;
use crate::tool_router::ToolRouter;

use rmcp::{
    ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, ErrorData, Implementation, JsonObject,
        ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
        Tool,
    },
    service::{RequestContext, RoleServer},
};
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Clone)]
pub struct FirmRulesService {
    config: ServiceConfig,
    rule_service: RuleService,
}

impl FirmRulesService {
    pub fn with_config(config: ServiceConfig) -> Result<Self, ServiceError> {
        let rule_service = RuleService::new(config.clone())?;
        Ok(Self {
            config,
            rule_service,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn rule_service(&self) -> &RuleService {
        &self.rule_service
    }

    /// Tool definitions advertised to clients.
    pub fn tools() -> Vec<Tool> {
        let rule_schema = json!({
            "type": "object",
            "properties": {
                "action": { "type": "string", "description": "Numeric action code, or \"Assign handling firm '<name>' <detail>\"" },
                "case_type": { "type": "string" },
                "case_rating": { "type": "string", "description": "A rating 1-5, or an inclusive range such as 2-4" },
                "case_state": { "type": "string" }
            },
            "required": ["action", "case_type", "case_rating", "case_state"]
        });

        vec![
            Tool::new(
                "list_states",
                "List the distinct case states that have rules, sorted alphabetically.",
                schema(json!({ "type": "object", "properties": {} })),
            ),
            Tool::new(
                "get_rules",
                "Fetch the rules for one case state. Opens an edit session that holds the other states' rules aside; pass its session_id to update_rules.",
                schema(json!({
                    "type": "object",
                    "properties": {
                        "state": { "type": "string", "description": "Case state to fetch" }
                    },
                    "required": ["state"]
                })),
            ),
            Tool::new(
                "add_rule",
                "Add a rule to both rule stores. An invalid case rating is rejected with an explanatory message and nothing is stored.",
                schema(json!({
                    "type": "object",
                    "properties": { "new_rule": rule_schema.clone() },
                    "required": ["new_rule"]
                })),
            ),
            Tool::new(
                "remove_rule",
                "Remove every stored rule exactly equal to the given rule. Succeeds even when no rule matches.",
                schema(json!({
                    "type": "object",
                    "properties": { "rule_to_remove": rule_schema.clone() },
                    "required": ["rule_to_remove"]
                })),
            ),
            Tool::new(
                "update_rules",
                "Replace the rules of the state fetched in an edit session. The edited rules are recombined with the rules held aside by the session. Any invalid rating rejects the whole batch.",
                schema(json!({
                    "type": "object",
                    "properties": {
                        "session_id": { "type": "string", "description": "session_id returned by get_rules" },
                        "updated_rules": { "type": "array", "items": rule_schema }
                    },
                    "required": ["session_id", "updated_rules"]
                })),
            ),
            Tool::new(
                "resync",
                "Regenerate the CSV rule table from the JSON rule document.",
                schema(json!({ "type": "object", "properties": {} })),
            ),
        ]
    }
}

fn schema(value: Value) -> Arc<JsonObject> {
    match value {
        Value::Object(map) => Arc::new(map),
        _ => Arc::new(JsonObject::new()),
    }
}

impl ServerHandler for FirmRulesService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some("This MCP server manages the firm-routing rule base. Use list_states to see states, get_rules to open an edit session for one state, then update_rules with that session_id. add_rule and remove_rule work on single rules.".into()),
        }
    }

    #[tracing::instrument(skip(self, _request, _context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: Self::tools(),
            next_cursor: None,
        })
    }

    #[tracing::instrument(skip(self, request, _context), fields(tool_name = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        ToolRouter::route_tool_call(self, request).await
    }
}
