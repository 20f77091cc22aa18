//! MCP server with lifecycle management.

use crate::error::{McpError, ProtocolError, Result};
use crate::protocol::handler::{Dispatcher, Handler};
use crate::protocol::transport::{StdioTransport, Transport};
use crate::protocol::types::*;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Where the server is in the MCP session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Server created but not initialized.
    Created,
    /// Initialize request received, awaiting initialized notification.
    Initializing,
    /// Server is fully operational.
    Running,
    /// Shutdown requested.
    ShuttingDown,
    /// Server has stopped.
    Stopped,
}

impl Lifecycle {
    /// State after processing `method`.
    fn after(self, method: &str) -> Self {
        match (self, method) {
            (Self::Created, "initialize") => Self::Initializing,
            (Self::Initializing, "notifications/initialized" | "initialized") => Self::Running,
            (_, "shutdown") => Self::ShuttingDown,
            (state, _) => state,
        }
    }
}

/// MCP Server.
pub struct McpServer<H: Handler> {
    info: ServerInfo,
    handler: Arc<H>,
    lifecycle: RwLock<Lifecycle>,
}

impl<H: Handler> McpServer<H> {
    pub fn new(handler: H, info: ServerInfo) -> Self {
        Self {
            info,
            handler: Arc::new(handler),
            lifecycle: RwLock::new(Lifecycle::Created),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.read()
    }

    /// Run the server over stdin/stdout.
    #[instrument(skip(self), fields(server = %self.info.name))]
    pub async fn run(&self) -> Result<()> {
        self.run_with_transport(&StdioTransport::stdio()).await
    }

    /// Serve requests until end of input or `shutdown`.
    pub async fn run_with_transport<T: Transport>(&self, transport: &T) -> Result<()> {
        info!("Starting MCP server: {} v{}", self.info.name, self.info.version);
        let dispatcher = Dispatcher::new(Arc::clone(&self.handler));

        loop {
            let message = match transport.read_message().await {
                Ok(Some(message)) => message,
                Ok(None) => {
                    debug!("EOF received, shutting down");
                    break;
                }
                Err(McpError::Protocol(ProtocolError::ParseError)) => {
                    let response = JsonRpcResponse::error(None, JsonRpcError::parse_error());
                    if let Err(e) = transport.write_response(&response).await {
                        error!("Failed to send error response: {}", e);
                    }
                    continue;
                }
                Err(e) => {
                    error!("Transport error: {}", e);
                    break;
                }
            };

            let request = match message {
                Message::Request(request) => request,
                Message::Response(response) => {
                    warn!("Unexpected response received: {:?}", response.id);
                    continue;
                }
            };

            let is_notification = request.is_notification();
            let method = request.method.clone();
            self.advance(&method);

            let response = dispatcher.dispatch(request).await;
            if !is_notification && let Err(e) = transport.write_response(&response).await {
                error!("Failed to send response: {}", e);
            }

            if method == "shutdown" {
                info!("Shutdown request received");
                break;
            }
        }

        *self.lifecycle.write() = Lifecycle::Stopped;
        info!("Server stopped");
        Ok(())
    }

    fn advance(&self, method: &str) {
        let mut lifecycle = self.lifecycle.write();
        let next = lifecycle.after(method);
        if next != *lifecycle {
            debug!("Lifecycle {:?} -> {:?}", *lifecycle, next);
            if next == Lifecycle::Running {
                info!("Server initialized and running");
            }
            *lifecycle = next;
        }
    }
}

/// Builder for MCP Server.
pub struct McpServerBuilder<H: Handler> {
    handler: Option<H>,
    name: String,
    version: String,
}

impl<H: Handler> McpServerBuilder<H> {
    pub fn new() -> Self {
        Self {
            handler: None,
            name: env!("CARGO_PKG_NAME").into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }

    pub fn handler(mut self, handler: H) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn build(self) -> Result<McpServer<H>> {
        let handler = self.handler.ok_or_else(|| McpError::Internal {
            message: "Handler is required".into(),
        })?;

        Ok(McpServer::new(
            handler,
            ServerInfo {
                name: self.name,
                version: self.version,
            },
        ))
    }
}

impl<H: Handler> Default for McpServerBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolResult;
    use crate::protocol::transport::LineTransport;
    use async_trait::async_trait;

    struct EchoHandler;

    #[async_trait]
    impl Handler for EchoHandler {
        async fn initialize(&self, _params: InitializeParams) -> ProtocolResult<InitializeResult> {
            Ok(InitializeResult {
                protocol_version: MCP_VERSION.into(),
                capabilities: ServerCapabilities::default(),
                server_info: ServerInfo {
                    name: "test".into(),
                    version: "1.0".into(),
                },
                instructions: None,
            })
        }

        async fn initialized(&self) -> ProtocolResult<()> {
            Ok(())
        }

        async fn shutdown(&self) -> ProtocolResult<()> {
            Ok(())
        }

        async fn list_tools(&self) -> ProtocolResult<ListToolsResult> {
            Ok(ListToolsResult {
                tools: vec![],
                next_cursor: None,
            })
        }

        async fn call_tool(&self, params: CallToolParams) -> ProtocolResult<CallToolResult> {
            Ok(CallToolResult::text(params.name))
        }
    }

    fn responses(written: Vec<u8>) -> Vec<serde_json::Value> {
        String::from_utf8(written)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_server_builder() {
        let server = McpServerBuilder::new()
            .handler(EchoHandler)
            .name("test-server")
            .version("0.1.0")
            .build()
            .unwrap();

        assert_eq!(server.info.name, "test-server");
        assert_eq!(server.info.version, "0.1.0");
        assert_eq!(server.lifecycle(), Lifecycle::Created);
    }

    #[test]
    fn test_lifecycle_transitions() {
        let state = Lifecycle::Created.after("tools/list");
        assert_eq!(state, Lifecycle::Created);
        let state = state.after("initialize");
        assert_eq!(state, Lifecycle::Initializing);
        let state = state.after("notifications/initialized");
        assert_eq!(state, Lifecycle::Running);
        assert_eq!(state.after("shutdown"), Lifecycle::ShuttingDown);
    }

    #[tokio::test]
    async fn test_session_over_lines() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"c","version":"1"}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            "garbage\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"list_objects","arguments":{}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"shutdown"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":4,"method":"ping"}"#,
            "\n",
        );
        let transport = LineTransport::new(input.as_bytes(), Vec::new());
        let server = McpServerBuilder::new().handler(EchoHandler).build().unwrap();

        server.run_with_transport(&transport).await.unwrap();
        assert_eq!(server.lifecycle(), Lifecycle::Stopped);

        let (_, written) = transport.into_inner();
        let responses = responses(written);
        // initialize, parse error, tools/call, shutdown; nothing after shutdown.
        assert_eq!(responses.len(), 4);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["error"]["code"], -32700);
        assert_eq!(responses[2]["result"]["content"][0]["text"], "list_objects");
        assert_eq!(responses[3]["id"], 3);
    }
}
