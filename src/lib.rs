//! MCP server for managing Snowflake account objects.
//!
//! Exposes four tools (`create_object`, `list_objects`, `describe_object`,
//! `drop_object`) that work across every registered object type: databases,
//! schemas, warehouses, roles, database roles, tables, views, functions and
//! procedures. Calls go to the Snowflake REST API through a lazily built
//! client.
//!
//! # Example
//!
//! ```no_run
//! use snowflake_object_mcp::{
//!     config::{ServerConfig, SnowflakeConfigBuilder},
//!     protocol::McpServerBuilder,
//!     server::{McpHandler, ServerStateBuilder},
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let snowflake = SnowflakeConfigBuilder::new().from_env()?.build()?;
//!     let config = ServerConfig::builder().snowflake(snowflake).build();
//!
//!     let state = Arc::new(
//!         ServerStateBuilder::new()
//!             .config(config)
//!             .build()
//!             .map_err(|e| anyhow::anyhow!(e))?,
//!     );
//!
//!     let server = McpServerBuilder::new()
//!         .handler(McpHandler::new(state))
//!         .build()?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod objects;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod sql;
pub mod tools;
pub mod warehouse;

pub use config::{ServerConfig, SnowflakeConfig, SnowflakeConfigBuilder, TokenType};
pub use error::{ErrorKind, McpError, ObjectError, Result};
pub use objects::{ManagerCache, ObjectManager};
pub use protocol::{McpServer, McpServerBuilder};
pub use server::{McpHandler, ServerState, ServerStateBuilder};
pub use warehouse::{RestWarehouseClient, WarehouseClient, WarehouseHandle};
