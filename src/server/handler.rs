//! MCP request handler implementation.

use crate::error::ProtocolResult;
use crate::protocol::{
    CallToolParams, CallToolResult, Handler, InitializeParams, InitializeResult, ListToolsResult,
    MCP_VERSION, ServerCapabilities, ServerInfo, ToolsCapability,
};
use crate::server::state::ServerState;
use crate::tools::descriptions;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info};

/// MCP request handler that processes protocol messages.
pub struct McpHandler {
    state: Arc<ServerState>,
}

impl McpHandler {
    pub fn new(state: Arc<ServerState>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &Arc<ServerState> {
        &self.state
    }
}

#[async_trait]
impl Handler for McpHandler {
    async fn initialize(&self, params: InitializeParams) -> ProtocolResult<InitializeResult> {
        info!(
            "Initialize request from {} v{}",
            params.client_info.name, params.client_info.version
        );
        debug!("Client capabilities: {:?}", params.capabilities);

        self.state.set_initialized(params.client_info);

        let capabilities = ServerCapabilities {
            tools: Some(ToolsCapability {
                list_changed: Some(false),
            }),
        };

        let instructions =
            descriptions::server_instructions(&self.state.metadata(), self.state.is_configured());

        Ok(InitializeResult {
            protocol_version: MCP_VERSION.into(),
            capabilities,
            server_info: ServerInfo {
                name: self.state.config.name.to_string(),
                version: self.state.config.version.to_string(),
            },
            instructions: Some(instructions),
        })
    }

    async fn initialized(&self) -> ProtocolResult<()> {
        info!("Server initialized successfully");
        Ok(())
    }

    async fn shutdown(&self) -> ProtocolResult<()> {
        info!("Shutdown request received");
        Ok(())
    }

    async fn list_tools(&self) -> ProtocolResult<ListToolsResult> {
        let tools = self.state.tools.list();
        debug!("Listing {} tools", tools.len());

        Ok(ListToolsResult {
            tools,
            next_cursor: None,
        })
    }

    async fn call_tool(&self, params: CallToolParams) -> ProtocolResult<CallToolResult> {
        let request_id = self.state.next_request_id();
        debug!(request_id, "Tool call: {}", params.name);

        match self.state.tools.execute(params).await {
            Ok(result) => Ok(result),
            Err(e) => {
                error!("Tool execution error: {}", e);
                Ok(CallToolResult::error(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::protocol::{Dispatcher, JsonRpcRequest};
    use crate::server::ServerStateBuilder;
    use crate::warehouse::memory::MemoryWarehouse;
    use crate::warehouse::{RemoteObject, WarehouseClient, WarehouseHandle};
    use serde_json::{Value, json};

    fn setup() -> (Arc<MemoryWarehouse>, Arc<ServerState>, Dispatcher<McpHandler>) {
        let warehouse = Arc::new(MemoryWarehouse::new());
        let handle = WarehouseHandle::with_client(Arc::clone(&warehouse) as Arc<dyn WarehouseClient>);
        let state = Arc::new(
            ServerStateBuilder::new()
                .config(ServerConfig::default())
                .warehouse(handle)
                .build()
                .unwrap(),
        );
        let dispatcher = Dispatcher::new(Arc::new(McpHandler::new(Arc::clone(&state))));
        (warehouse, state, dispatcher)
    }

    fn call(id: i64, name: &str, arguments: Value) -> JsonRpcRequest {
        JsonRpcRequest::new("tools/call")
            .with_id(id)
            .with_params(json!({"name": name, "arguments": arguments}))
    }

    fn tool_body(result: &Value) -> Value {
        serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_initialize_reports_tools_capability() {
        let (_, state, dispatcher) = setup();
        let request = JsonRpcRequest::new("initialize").with_id(1).with_params(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "inspector", "version": "0.9"}
        }));

        let result = dispatcher.dispatch(request).await.result.unwrap();
        assert_eq!(result["protocolVersion"], MCP_VERSION);
        assert_eq!(result["serverInfo"]["name"], "snowflake-object-mcp");
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
        assert!(
            result["instructions"]
                .as_str()
                .unwrap()
                .contains("create_object, list_objects, describe_object, drop_object")
        );
        assert!(state.is_initialized());
    }

    #[tokio::test]
    async fn test_tools_list_is_sorted() {
        let (_, _, dispatcher) = setup();
        let result = dispatcher
            .dispatch(JsonRpcRequest::new("tools/list").with_id(1))
            .await
            .result
            .unwrap();

        let names: Vec<&str> = result["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|tool| tool["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["create_object", "describe_object", "drop_object", "list_objects"]);
    }

    #[tokio::test]
    async fn test_create_then_describe_then_drop() {
        let (warehouse, _, dispatcher) = setup();

        let created = dispatcher
            .dispatch(call(1, "create_object", json!({"object_type": "database", "name": "ANALYTICS"})))
            .await
            .result
            .unwrap();
        assert!(created.get("isError").is_none());
        assert_eq!(tool_body(&created)["name"], "ANALYTICS");

        let described = dispatcher
            .dispatch(call(2, "describe_object", json!({"object_type": "database", "name": "ANALYTICS"})))
            .await
            .result
            .unwrap();
        assert_eq!(tool_body(&described)["name"], "ANALYTICS");

        let dropped = dispatcher
            .dispatch(call(3, "drop_object", json!({"object_type": "database", "name": "ANALYTICS"})))
            .await
            .result
            .unwrap();
        assert_eq!(tool_body(&dropped)["success"], true);
        assert!(warehouse.calls().len() >= 3);
    }

    #[tokio::test]
    async fn test_tool_failure_is_a_result_not_a_protocol_error() {
        let (warehouse, _, dispatcher) = setup();
        warehouse.seed("databases", RemoteObject::named("SNOWFLAKE"));

        let response = dispatcher
            .dispatch(call(1, "drop_object", json!({"object_type": "database", "name": "SNOWFLAKE"})))
            .await;
        assert!(response.error.is_none());

        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        let body = tool_body(&result);
        assert_eq!(body["tool"], "drop_object");
        assert_eq!(body["status_code"], 403);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let (_, _, dispatcher) = setup();
        let result = dispatcher
            .dispatch(call(1, "create_stage", json!({})))
            .await
            .result
            .unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"].as_str().unwrap().contains("create_stage"));
    }
}
