//! `list_objects`: filtered listing of any registered type.

use crate::error::{ObjectResult, Result};
use crate::objects::{ListRequest, ManagerCache, ObjectSummary};
use crate::protocol::{CallToolResult, Tool};
use crate::registry;
use crate::tools::args;
use crate::tools::descriptions::{self, LIST_OBJECTS};
use crate::tools::registry::{ToolHandler, object_result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

fn default_limit() -> i64 {
    ListRequest::DEFAULT_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct ListObjectsArgs {
    pub object_type: String,
    #[serde(default)]
    pub like: Option<String>,
    #[serde(default)]
    pub starts_with: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
}

pub struct ListObjectsTool {
    managers: Arc<ManagerCache>,
}

impl ListObjectsTool {
    pub fn new(managers: Arc<ManagerCache>) -> Self {
        Self { managers }
    }

    async fn list(&self, arguments: Value) -> ObjectResult<Vec<ObjectSummary>> {
        let args: ListObjectsArgs = args::parse(LIST_OBJECTS, arguments)?;
        let manager = self
            .managers
            .get(&args.object_type)
            .map_err(|e| e.with_tool(LIST_OBJECTS))?;
        let descriptor = manager.descriptor();

        let mut request = ListRequest {
            like: args.like,
            starts_with: args.starts_with,
            limit: args.limit,
            ..ListRequest::default()
        };
        // Filter problems are reported before missing parents.
        request.pattern(LIST_OBJECTS)?;

        request.parents = args::required_parents(
            LIST_OBJECTS,
            descriptor,
            args.database.as_deref(),
            args.schema.as_deref(),
            &format!("listing {}s", descriptor.object_type),
        )?;

        info!(
            "Listing {}s with filters: like={:?}, starts_with={:?}, limit={}",
            descriptor.object_type, request.like, request.starts_with, request.limit
        );
        manager.list(request).await.map_err(|e| e.with_tool(LIST_OBJECTS))
    }
}

#[async_trait]
impl ToolHandler for ListObjectsTool {
    fn definition(&self) -> Tool {
        let object_types = registry::object_types();
        crate::define_tool! {
            name: LIST_OBJECTS,
            description: descriptions::list_objects(&object_types),
            schema: {
                "type": "object",
                "properties": {
                    "object_type": {
                        "type": "string",
                        "enum": object_types,
                        "description": "Type of object to list"
                    },
                    "like": {
                        "type": "string",
                        "description": "SQL LIKE pattern, e.g. 'SALES%'"
                    },
                    "starts_with": {
                        "type": "string",
                        "description": "Name prefix; cannot be combined with 'like'"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of objects to return (default: 100)",
                        "minimum": 1,
                        "maximum": 10000
                    },
                    "database": {
                        "type": "string",
                        "description": "Database name (required for schemas, database roles and schema objects)"
                    },
                    "schema": {
                        "type": "string",
                        "description": "Schema name (required for tables, views, functions and procedures)"
                    }
                },
                "required": ["object_type"]
            }
        }
    }

    #[instrument(skip(self, arguments), fields(tool = "list_objects"))]
    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        Ok(object_result(self.list(arguments).await))
    }
}
