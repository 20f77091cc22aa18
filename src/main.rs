//! MCP server binary entry point.

use anyhow::Result;
use snowflake_object_mcp::{
    config::{ServerConfig, SnowflakeConfig, SnowflakeConfigBuilder},
    protocol::McpServerBuilder,
    server::{McpHandler, ServerStateBuilder},
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let mut config = ServerConfig::builder();
    if let Some(snowflake) = snowflake_from_env() {
        info!("Using Snowflake account at {}", snowflake.host);
        config = config.snowflake(snowflake);
    }

    let state = Arc::new(
        ServerStateBuilder::new()
            .config(config.build())
            .build()
            .map_err(|e| anyhow::anyhow!(e))?,
    );

    info!("Server state initialized with {} tools", state.tools.len());

    let server = McpServerBuilder::new()
        .handler(McpHandler::new(state))
        .name(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .build()?;

    info!("MCP server ready, waiting for requests...");

    server.run().await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Missing or invalid credentials are not fatal; tool calls report them.
fn snowflake_from_env() -> Option<SnowflakeConfig> {
    let has_config =
        std::env::var("SNOWFLAKE_ACCOUNT").is_ok() || std::env::var("SNOWFLAKE_HOST").is_ok();
    if !has_config {
        warn!("SNOWFLAKE_ACCOUNT is not set; tools will fail until it is configured");
        return None;
    }

    match SnowflakeConfigBuilder::new().from_env().and_then(|b| b.build()) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Invalid Snowflake configuration: {}", e);
            None
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("snowflake_object_mcp=info,warn"));

    // stdout carries the protocol, so logs go to stderr.
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .json()
        .init();
}
